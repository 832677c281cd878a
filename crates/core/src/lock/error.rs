//! Lock error types.

use ledgerguard_shared::types::LockId;
use thiserror::Error;

use crate::lock::types::LockType;

/// Errors that can occur during ledger lock operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Lock start date is after its end date.
    #[error("Lock start date must not be after end date")]
    InvalidDateRange,

    /// Candidate lock overlaps an existing active lock.
    #[error("Lock range overlaps active {existing_type} {existing_id}")]
    Overlap {
        /// The overlapping active lock.
        existing_id: LockId,
        /// Kind of the overlapping lock.
        existing_type: LockType,
    },

    /// Period locks cannot be created through the public apply path.
    #[error("Period locks are created only by hard-closing a period")]
    PeriodLockNotDirect,

    /// Period locks cannot be released independently of their period.
    #[error("Period lock {0} cannot be released; it is owned by its period")]
    PeriodLockNotReleasable(LockId),

    /// Lock is already released.
    #[error("Lock {0} is already released")]
    AlreadyReleased(LockId),

    /// Lock reason is required but not provided.
    #[error("Lock reason is required")]
    ReasonRequired,

    /// Lock not found.
    #[error("Ledger lock not found: {0}")]
    NotFound(LockId),

    /// Concurrent modification detected.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LockError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange => "INVALID_DATE_RANGE",
            Self::Overlap { .. } => "LOCK_OVERLAP",
            Self::PeriodLockNotDirect => "PERIOD_LOCK_NOT_DIRECT",
            Self::PeriodLockNotReleasable(_) => "PERIOD_LOCK_NOT_RELEASABLE",
            Self::AlreadyReleased(_) => "LOCK_ALREADY_RELEASED",
            Self::ReasonRequired => "LOCK_REASON_REQUIRED",
            Self::NotFound(_) => "LOCK_NOT_FOUND",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidDateRange
            | Self::Overlap { .. }
            | Self::PeriodLockNotDirect
            | Self::PeriodLockNotReleasable(_)
            | Self::AlreadyReleased(_)
            | Self::ReasonRequired => 400,
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
