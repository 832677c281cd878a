//! Accounting period domain types.

use chrono::{DateTime, NaiveDate, Utc};
use ledgerguard_shared::types::{PeriodId, TenantId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Granularity of an accounting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    /// One period per calendar day.
    Daily,
    /// One period per calendar month.
    Monthly,
}

impl PeriodType {
    /// Returns the string representation of the period type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
        }
    }

    /// Parses a period type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of an accounting period.
///
/// Transitions are monotonic and one-directional:
/// Open -> SoftClosed -> HardClosed. HardClosed is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    /// Period is open for postings.
    Open,
    /// Period is provisionally closed; postings require an admin override.
    SoftClosed,
    /// Period is permanently closed and immutable; no postings, ever.
    HardClosed,
}

impl PeriodStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::SoftClosed => "soft_closed",
            Self::HardClosed => "hard_closed",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "open" => Some(Self::Open),
            "soft_closed" => Some(Self::SoftClosed),
            "hard_closed" => Some(Self::HardClosed),
            _ => None,
        }
    }

    /// Returns true if postings are allowed without an override.
    #[must_use]
    pub fn allows_posting(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns true if postings require an admin override.
    #[must_use]
    pub fn requires_override(&self) -> bool {
        matches!(self, Self::SoftClosed)
    }

    /// Returns true if the period can never be modified again.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::HardClosed)
    }

    /// Ranks statuses by how strongly they restrict posting. When periods of
    /// different granularities cover the same date, the highest rank governs.
    #[must_use]
    pub fn restrictiveness(&self) -> u8 {
        match self {
            Self::Open => 0,
            Self::SoftClosed => 1,
            Self::HardClosed => 2,
        }
    }
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An accounting period for a tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountingPeriod {
    /// Unique identifier.
    pub id: PeriodId,
    /// Tenant this period belongs to.
    pub tenant_id: TenantId,
    /// Period granularity.
    pub period_type: PeriodType,
    /// First date of the period (inclusive).
    pub period_start: NaiveDate,
    /// Last date of the period (inclusive).
    pub period_end: NaiveDate,
    /// Current status.
    pub status: PeriodStatus,
    /// Who closed the period, if closed.
    pub closed_by: Option<UserId>,
    /// When the period was last closed.
    pub closed_at: Option<DateTime<Utc>>,
    /// Free-text notes recorded at closure.
    pub closure_notes: Option<String>,
    /// Who created the period.
    pub created_by: UserId,
    /// When the period was created.
    pub created_at: DateTime<Utc>,
    /// When the period was last updated.
    pub updated_at: DateTime<Utc>,
}

impl AccountingPeriod {
    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.period_start && date <= self.period_end
    }

    /// Returns true if postings to this period are allowed without an override.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == PeriodStatus::Open
    }
}

/// Result of checking whether a posting date is acceptable.
///
/// This is the period half of the posting decision; lock checks and override
/// validation are layered on top by the posting guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostingCheck {
    /// The period covering the transaction date, if any.
    pub period_id: Option<PeriodId>,
    /// Status of the covering period, if any.
    pub status: Option<PeriodStatus>,
    /// Whether the posting is allowed as-is.
    pub posting_allowed: bool,
    /// Whether an admin override would make the posting allowed.
    pub override_required: bool,
    /// Human-readable explanation when the posting is not allowed.
    pub error_message: Option<String>,
}
