//! Election Tallying Backend
//!
//! Ballot ledger, vote admission, scoped tally aggregation and winner
//! resolution for an election-management system.

pub mod config;
pub mod errors;
pub mod tally;
pub mod types;

// Re-export commonly used types
pub use errors::{AdmissionError, Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tallying backend with proper logging
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tally=info".into()),
        )
        .init();

    tracing::info!("🗳️  Tallying backend v{} initialized", VERSION);
    Ok(())
}
