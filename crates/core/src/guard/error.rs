//! Posting guard error types.

use chrono::{DateTime, NaiveDate, Utc};
use ledgerguard_shared::types::{LockId, UserId};
use thiserror::Error;

use crate::audit::error::AuditError;
use crate::audit::types::UserRole;
use crate::lock::types::LockType;

/// Errors denying a posting authorization.
#[derive(Debug, Error)]
pub enum GuardError {
    /// An active ledger lock covers the transaction date. Never overridable.
    ///
    /// Carries who applied the lock and when, so audit trails reconstruct
    /// from the error alone without re-querying the lock.
    #[error("Ledger is locked for {date} by {lock_type} {lock_id} (applied by {locked_by} at {locked_at}): {reason}")]
    LedgerLocked {
        /// The blocking lock.
        lock_id: LockId,
        /// Kind of the blocking lock.
        lock_type: LockType,
        /// Who applied the lock.
        locked_by: UserId,
        /// When the lock was applied.
        locked_at: DateTime<Utc>,
        /// The transaction date that was checked.
        date: NaiveDate,
        /// Why the lock was applied.
        reason: String,
    },

    /// No accounting period covers the transaction date.
    #[error("No accounting period covers {0}")]
    PeriodNotFound(NaiveDate),

    /// The covering period is hard-closed; no override exists.
    #[error("Accounting period covering {0} is hard-closed and immutable")]
    PeriodClosed(NaiveDate),

    /// The covering period is soft-closed and no override was supplied.
    #[error("Admin override required to post into a soft-closed period")]
    OverrideRequired,

    /// The supplied override came from a role without override privileges.
    #[error("Role {0} cannot authorize overrides; finance admin required")]
    InsufficientOverrideRole(UserRole),

    /// The override's audit record was invalid.
    #[error(transparent)]
    Audit(#[from] AuditError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl GuardError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::LedgerLocked { .. } => "LEDGER_LOCKED",
            Self::PeriodNotFound(_) => "PERIOD_NOT_FOUND",
            Self::PeriodClosed(_) => "PERIOD_CLOSED",
            Self::OverrideRequired => "ADMIN_OVERRIDE_REQUIRED",
            Self::InsufficientOverrideRole(_) => "INSUFFICIENT_OVERRIDE_PRIVILEGES",
            Self::Audit(err) => err.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::LedgerLocked { .. } | Self::PeriodClosed(_) => 423,
            Self::PeriodNotFound(_) => 404,
            Self::OverrideRequired | Self::InsufficientOverrideRole(_) => 403,
            Self::Audit(err) => err.http_status_code(),
            Self::Database(_) => 500,
        }
    }
}
