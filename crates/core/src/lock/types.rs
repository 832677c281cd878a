//! Ledger lock domain types.

use chrono::{DateTime, NaiveDate, Utc};
use ledgerguard_shared::types::{LockId, PeriodId, TenantId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of ledger lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockType {
    /// Derived from a hard-closed accounting period; owned by that period.
    PeriodLock,
    /// Applied by an operator for the duration of an audit.
    AuditLock,
    /// Applied by an operator while a reconciliation window is open.
    ReconciliationLock,
}

impl LockType {
    /// Returns the string representation of the lock type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PeriodLock => "period_lock",
            Self::AuditLock => "audit_lock",
            Self::ReconciliationLock => "reconciliation_lock",
        }
    }

    /// Parses a lock type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "period_lock" => Some(Self::PeriodLock),
            "audit_lock" => Some(Self::AuditLock),
            "reconciliation_lock" => Some(Self::ReconciliationLock),
            _ => None,
        }
    }

    /// Returns true if operators may apply and release this lock type directly.
    ///
    /// Period locks are created only as a side effect of hard-closing a
    /// period and cannot be released on their own.
    #[must_use]
    pub fn is_operator_managed(&self) -> bool {
        matches!(self, Self::AuditLock | Self::ReconciliationLock)
    }
}

impl fmt::Display for LockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a ledger lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockStatus {
    /// Lock is in force.
    Active,
    /// Lock has been released.
    Released,
}

impl LockStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Released => "released",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "released" => Some(Self::Released),
            _ => None,
        }
    }
}

impl fmt::Display for LockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A date-range lock on a tenant's ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerLock {
    /// Unique identifier.
    pub id: LockId,
    /// Tenant this lock belongs to.
    pub tenant_id: TenantId,
    /// Kind of lock.
    pub lock_type: LockType,
    /// First locked date (inclusive).
    pub lock_start_date: NaiveDate,
    /// Last locked date (inclusive).
    pub lock_end_date: NaiveDate,
    /// Current status.
    pub lock_status: LockStatus,
    /// Why the lock was applied.
    pub reason: String,
    /// External reference (audit engagement number, reconciliation batch, ...).
    pub reference_number: Option<String>,
    /// Owning period, for period locks.
    pub accounting_period_id: Option<PeriodId>,
    /// Who applied the lock.
    pub locked_by: UserId,
    /// When the lock was applied.
    pub locked_at: DateTime<Utc>,
    /// Who released the lock, if released.
    pub released_by: Option<UserId>,
    /// When the lock was released, if released.
    pub released_at: Option<DateTime<Utc>>,
}

impl LedgerLock {
    /// Returns true if the lock is in force.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.lock_status == LockStatus::Active
    }

    /// Returns true if the given date falls within the locked range.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.lock_start_date && date <= self.lock_end_date
    }
}

/// Result of checking whether a transaction date is locked.
///
/// Read access is always permitted regardless of lock state; only posting
/// and reversal operations consult this.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LockCheck {
    /// Whether any active lock covers the date.
    pub is_locked: bool,
    /// The blocking lock, if any.
    pub lock_id: Option<LockId>,
    /// Kind of the blocking lock.
    pub lock_type: Option<LockType>,
    /// Who applied the blocking lock.
    pub locked_by: Option<UserId>,
    /// When the blocking lock was applied.
    pub locked_at: Option<DateTime<Utc>>,
    /// Why the blocking lock was applied.
    pub reason: Option<String>,
}
