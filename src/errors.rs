//! Error handling for the tallying backend

use uuid::Uuid;

/// Result type alias for the tallying backend
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the tallying backend
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Malformed request data
    #[error("Validation failed: {field}")]
    Validation { field: String },

    /// Vote rejected at admission time
    #[error("Vote rejected: {0}")]
    Admission(#[from] AdmissionError),

    /// Derived state failed to recompute after a durable ledger write.
    /// Recoverable via `reconcile_all()`, never surfaced to the voter.
    #[error("Consistency error: {message}")]
    Consistency { message: String },

    /// Unknown position, candidate or voter
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Reasons a vote can be rejected by the admission guard.
///
/// These are synchronous, voter-facing rejections. They explain why the
/// cast failed without exposing any other voter's choices. A tie in
/// winner resolution is NOT an error and never appears here.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AdmissionError {
    /// A valid ballot for this (voter, position) already exists
    #[error("voter {voter_id} has already voted for position {position_id}")]
    AlreadyVoted { voter_id: Uuid, position_id: Uuid },

    /// Candidate is unknown or registered for a different position
    #[error("candidate '{candidate_id}' is not standing for position {position_id}")]
    InvalidCandidateForPosition {
        candidate_id: String,
        position_id: Uuid,
    },

    /// Candidate's registered scope does not match the voter's scope
    #[error("candidate '{candidate_id}' is outside the voter's {scope_kind} scope")]
    ScopeMismatch {
        candidate_id: String,
        scope_kind: &'static str,
    },
}

impl Error {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
        }
    }

    /// Create a new consistency error
    pub fn consistency(message: impl Into<String>) -> Self {
        Self::Consistency {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Convenience macros for creating specific error types
#[macro_export]
macro_rules! consistency_error {
    ($msg:expr) => {
        $crate::Error::consistency($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::consistency(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! internal_error {
    ($msg:expr) => {
        $crate::Error::internal($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::internal(format!($fmt, $($arg)*))
    };
}
