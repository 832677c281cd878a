//! Audit error types.

use thiserror::Error;

use crate::audit::types::MIN_JUSTIFICATION_LEN;

/// Errors that can occur while recording an override.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Justification is missing or too short.
    #[error("Override justification must be at least {MIN_JUSTIFICATION_LEN} characters")]
    JustificationTooShort,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl AuditError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::JustificationTooShort => "OVERRIDE_JUSTIFICATION_TOO_SHORT",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::JustificationTooShort => 400,
            Self::Database(_) => 500,
        }
    }
}
