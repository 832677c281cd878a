//! Lock policy rules: application validation, release validation, and the
//! date lock check.
//!
//! The repository layer reads the tenant's active locks and delegates all
//! policy decisions here.

use chrono::NaiveDate;

use crate::lock::error::LockError;
use crate::lock::types::{LedgerLock, LockCheck, LockStatus, LockType};
use crate::period::service::date_ranges_overlap;

/// Stateless service for ledger lock policy decisions.
pub struct LockService;

impl LockService {
    /// Validates applying a new lock over `[start, end]`.
    ///
    /// Period locks cannot be applied through this path; they exist only as a
    /// side effect of hard-closing a period. Overlap is tested against every
    /// active lock for the tenant regardless of type, with inclusive
    /// boundaries.
    ///
    /// # Errors
    /// * `LockError::PeriodLockNotDirect` for `LockType::PeriodLock`
    /// * `LockError::InvalidDateRange` if `start > end`
    /// * `LockError::ReasonRequired` if the reason is blank
    /// * `LockError::Overlap` if any active lock intersects the range
    pub fn validate_apply(
        active_locks: &[LedgerLock],
        lock_type: LockType,
        start: NaiveDate,
        end: NaiveDate,
        reason: &str,
    ) -> Result<(), LockError> {
        if lock_type == LockType::PeriodLock {
            return Err(LockError::PeriodLockNotDirect);
        }
        Self::validate_range(active_locks, start, end, reason)
    }

    /// Validates the internal creation of a period lock when a period reaches
    /// hard close. Same range rules as `validate_apply`, without the
    /// operator-path restriction.
    pub fn validate_period_lock(
        active_locks: &[LedgerLock],
        start: NaiveDate,
        end: NaiveDate,
        reason: &str,
    ) -> Result<(), LockError> {
        Self::validate_range(active_locks, start, end, reason)
    }

    fn validate_range(
        active_locks: &[LedgerLock],
        start: NaiveDate,
        end: NaiveDate,
        reason: &str,
    ) -> Result<(), LockError> {
        if start > end {
            return Err(LockError::InvalidDateRange);
        }
        if reason.trim().is_empty() {
            return Err(LockError::ReasonRequired);
        }

        if let Some(existing) = active_locks
            .iter()
            .filter(|l| l.is_active())
            .find(|l| date_ranges_overlap(start, end, l.lock_start_date, l.lock_end_date))
        {
            return Err(LockError::Overlap {
                existing_id: existing.id,
                existing_type: existing.lock_type,
            });
        }

        Ok(())
    }

    /// Validates releasing a lock.
    ///
    /// # Errors
    /// * `LockError::PeriodLockNotReleasable` for period locks; releasing one
    ///   would require reopening the owning period, which has no supported path
    /// * `LockError::AlreadyReleased` if the lock is not active
    pub fn validate_release(lock: &LedgerLock) -> Result<(), LockError> {
        if lock.lock_type == LockType::PeriodLock {
            return Err(LockError::PeriodLockNotReleasable(lock.id));
        }
        if lock.lock_status == LockStatus::Released {
            return Err(LockError::AlreadyReleased(lock.id));
        }
        Ok(())
    }

    /// Returns the first active lock covering `transaction_date`, if any.
    ///
    /// Callers only need one blocking lock to deny a posting.
    #[must_use]
    pub fn find_blocking(
        active_locks: &[LedgerLock],
        transaction_date: NaiveDate,
    ) -> Option<&LedgerLock> {
        active_locks
            .iter()
            .filter(|l| l.is_active())
            .find(|l| l.contains_date(transaction_date))
    }

    /// Checks whether any active lock covers `transaction_date`.
    #[must_use]
    pub fn check(active_locks: &[LedgerLock], transaction_date: NaiveDate) -> LockCheck {
        Self::find_blocking(active_locks, transaction_date).map_or_else(
            LockCheck::default,
            |lock| LockCheck {
                is_locked: true,
                lock_id: Some(lock.id),
                lock_type: Some(lock.lock_type),
                locked_by: Some(lock.locked_by),
                locked_at: Some(lock.locked_at),
                reason: Some(lock.reason.clone()),
            },
        )
    }
}
