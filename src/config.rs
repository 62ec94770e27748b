//! Configuration management for the tallying backend
//!
//! Loads configuration from environment variables with validation.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Admission and recompute configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionConfig {
    /// Recompute the affected scope key inline after every admitted vote.
    /// Disabled for bulk loads, where a single `reconcile_all()` afterwards
    /// is far cheaper than a recompute per ballot.
    pub recompute_on_cast: bool,

    /// Upper bound on wards returned by a single null/void report query
    pub max_report_wards: usize,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            recompute_on_cast: true,
            max_report_wards: 5000,
        }
    }
}

impl AdmissionConfig {
    /// Load admission configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let recompute_on_cast = std::env::var("TALLY_RECOMPUTE_ON_CAST")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .map_err(|_| Error::internal("Invalid TALLY_RECOMPUTE_ON_CAST"))?;

        let max_report_wards = std::env::var("TALLY_MAX_REPORT_WARDS")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .map_err(|_| Error::internal("Invalid TALLY_MAX_REPORT_WARDS"))?;

        if max_report_wards == 0 {
            return Err(Error::internal("TALLY_MAX_REPORT_WARDS must be positive"));
        }

        Ok(Self {
            recompute_on_cast,
            max_report_wards,
        })
    }

    /// Create configuration for testing
    pub fn for_testing() -> Self {
        Self {
            recompute_on_cast: true,
            max_report_wards: 100, // Reduced for testing
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub admission: AdmissionConfig,
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load configuration from environment
    pub fn from_env() -> Result<Self> {
        let admission = AdmissionConfig::from_env()?;

        let logging = LoggingConfig {
            level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string()),
        };

        Ok(Self { admission, logging })
    }

    /// Create configuration for testing
    pub fn for_testing() -> Self {
        Self {
            admission: AdmissionConfig::for_testing(),
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admission_config_defaults() {
        let config = AdmissionConfig::default();
        assert!(config.recompute_on_cast);
        assert!(config.max_report_wards > 0);
    }

    #[test]
    fn test_testing_config() {
        let config = Config::for_testing();
        assert!(config.admission.recompute_on_cast);
        assert_eq!(config.admission.max_report_wards, 100);
        assert_eq!(config.logging.level, "debug");
    }
}
