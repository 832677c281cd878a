//! Settlement error types.

use ledgerguard_shared::types::SettlementId;
use thiserror::Error;

use crate::settlement::types::SettlementStatus;

/// Errors that can occur during settlement operations.
#[derive(Debug, Error)]
pub enum SettlementError {
    /// Requested transition is not in the transition table.
    #[error("Invalid settlement transition from {from} to {to}; valid next states: {valid_next:?}")]
    InvalidTransition {
        /// Current status.
        from: SettlementStatus,
        /// Requested status.
        to: SettlementStatus,
        /// Statuses that would have been valid from `from`.
        valid_next: Vec<SettlementStatus>,
    },

    /// Retry budget is exhausted.
    #[error("Settlement retry exhausted: {retry_count} of {max_retries} retries used")]
    RetryExhausted {
        /// Retries consumed.
        retry_count: u32,
        /// Configured maximum.
        max_retries: u32,
    },

    /// Bank confirmation requires a UTR number.
    #[error("UTR number is required to confirm a settlement")]
    UtrRequired,

    /// Failure must carry a reason.
    #[error("Failure reason is required to mark a settlement failed")]
    FailureReasonRequired,

    /// Settlement not found.
    #[error("Settlement not found: {0}")]
    NotFound(SettlementId),

    /// Concurrent modification detected.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl SettlementError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "SETTLEMENT_INVALID_TRANSITION",
            Self::RetryExhausted { .. } => "SETTLEMENT_RETRY_EXHAUSTED",
            Self::UtrRequired => "SETTLEMENT_UTR_REQUIRED",
            Self::FailureReasonRequired => "SETTLEMENT_FAILURE_REASON_REQUIRED",
            Self::NotFound(_) => "SETTLEMENT_NOT_FOUND",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidTransition { .. }
            | Self::RetryExhausted { .. }
            | Self::UtrRequired
            | Self::FailureReasonRequired => 400,
            Self::NotFound(_) => 404,
            Self::ConcurrentModification => 409,
            Self::Database(_) => 500,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification)
    }
}
