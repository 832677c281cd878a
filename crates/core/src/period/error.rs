//! Period error types.

use chrono::NaiveDate;
use ledgerguard_shared::types::{LockId, PeriodId};
use thiserror::Error;

use crate::period::types::PeriodStatus;

/// Errors that can occur during accounting period operations.
///
/// These encode policy violations, not transient faults; none of them are
/// retryable except `ConcurrentModification`.
#[derive(Debug, Error)]
pub enum PeriodError {
    /// Period start date is after its end date.
    #[error("Period start date must not be after end date")]
    InvalidDateRange,

    /// Candidate period overlaps an existing period of the same type.
    #[error("Period overlaps existing period {existing_id}")]
    Overlap {
        /// The existing period that overlaps the candidate range.
        existing_id: PeriodId,
    },

    /// Candidate period does not start where the previous period ended.
    #[error("Period must start on {expected_start}, got {actual_start}")]
    Gap {
        /// The day after the most recent period's end date.
        expected_start: NaiveDate,
        /// The candidate's start date.
        actual_start: NaiveDate,
    },

    /// An open period of this type already exists for the tenant.
    #[error("An open period of this type already exists: {existing_id}")]
    DuplicateOpenPeriod {
        /// The currently open period.
        existing_id: PeriodId,
    },

    /// No period covers the transaction date.
    #[error("No accounting period found for date {0}")]
    NotFound(NaiveDate),

    /// Period not found by id.
    #[error("Accounting period not found: {0}")]
    NotFoundById(PeriodId),

    /// Period is hard-closed and immutable; no posting or transition is possible.
    #[error("Period {period_id} is hard-closed and immutable")]
    Closed {
        /// The hard-closed period.
        period_id: PeriodId,
    },

    /// Attempted an invalid status transition.
    #[error("Invalid period transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: PeriodStatus,
        /// Attempted target status.
        to: PeriodStatus,
    },

    /// An active lock overlaps the period range, blocking the period lock a
    /// hard close must create.
    #[error("Active ledger lock {lock_id} overlaps the period range")]
    LockConflict {
        /// The conflicting active lock.
        lock_id: LockId,
    },

    /// Concurrent modification detected.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl PeriodError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange => "INVALID_DATE_RANGE",
            Self::Overlap { .. } => "PERIOD_OVERLAP",
            Self::Gap { .. } => "PERIOD_GAP",
            Self::DuplicateOpenPeriod { .. } => "DUPLICATE_OPEN_PERIOD",
            Self::NotFound(_) => "PERIOD_NOT_FOUND",
            Self::NotFoundById(_) => "PERIOD_NOT_FOUND",
            Self::Closed { .. } => "PERIOD_CLOSED",
            Self::LockConflict { .. } => "PERIOD_LOCK_CONFLICT",
            Self::InvalidTransition { .. } => "INVALID_PERIOD_TRANSITION",
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
            | Self::Gap { .. }
            | Self::DuplicateOpenPeriod { .. }
            | Self::Closed { .. }
            | Self::InvalidTransition { .. } => 400,
            Self::NotFound(_) | Self::NotFoundById(_) => 404,
            Self::LockConflict { .. } | Self::ConcurrentModification => 409,
            Self::Database(_) => 500,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification)
    }
}
