//! Settlement domain types.

use chrono::{DateTime, Utc};
use ledgerguard_shared::types::{SettlementId, TenantId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Settlement status in the payout lifecycle.
///
/// The valid transitions are:
/// - Created → FundsReserved | Failed
/// - FundsReserved → SentToBank | Failed
/// - SentToBank → BankConfirmed | Failed
/// - BankConfirmed → Settled
/// - Settled → (terminal)
/// - Failed → Retried
/// - Retried → FundsReserved | Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    /// Settlement record created by a batch job.
    Created,
    /// Payout funds reserved from the merchant balance.
    FundsReserved,
    /// Payout instruction sent to the bank.
    SentToBank,
    /// Bank confirmed the transfer; finality point.
    BankConfirmed,
    /// Reconciled and settled (immutable).
    Settled,
    /// A processing step failed.
    Failed,
    /// Scheduled for another attempt.
    Retried,
}

impl SettlementStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::FundsReserved => "funds_reserved",
            Self::SentToBank => "sent_to_bank",
            Self::BankConfirmed => "bank_confirmed",
            Self::Settled => "settled",
            Self::Failed => "failed",
            Self::Retried => "retried",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "created" => Some(Self::Created),
            "funds_reserved" => Some(Self::FundsReserved),
            "sent_to_bank" => Some(Self::SentToBank),
            "bank_confirmed" => Some(Self::BankConfirmed),
            "settled" => Some(Self::Settled),
            "failed" => Some(Self::Failed),
            "retried" => Some(Self::Retried),
            _ => None,
        }
    }

    /// Returns the complete list of statuses reachable from this one.
    ///
    /// This is the transition table's source of truth; transition errors
    /// report it so callers can see what would have been valid.
    #[must_use]
    pub fn valid_next_states(&self) -> &'static [Self] {
        match self {
            Self::Created | Self::Retried => &[Self::FundsReserved, Self::Failed],
            Self::FundsReserved => &[Self::SentToBank, Self::Failed],
            Self::SentToBank => &[Self::BankConfirmed, Self::Failed],
            Self::BankConfirmed => &[Self::Settled],
            Self::Settled => &[],
            Self::Failed => &[Self::Retried],
        }
    }

    /// Returns true if no further transition is ever possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Settled)
    }
}

impl fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A payout batch settlement record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    /// Unique identifier.
    pub id: SettlementId,
    /// Tenant this settlement belongs to.
    pub tenant_id: TenantId,
    /// External settlement reference.
    pub settlement_ref: String,
    /// Merchant being paid out.
    pub merchant_id: Uuid,
    /// Net payout amount.
    pub net_amount: Decimal,
    /// Current status.
    pub status: SettlementStatus,
    /// Number of retries consumed so far.
    pub retry_count: u32,
    /// Maximum automatic retries before terminal failure.
    pub max_retries: u32,
    /// When the next retry becomes due, while in Retried.
    pub next_retry_at: Option<DateTime<Utc>>,
    /// When the last retry was scheduled.
    pub last_retry_at: Option<DateTime<Utc>>,
    /// Why the settlement last failed.
    pub failure_reason: Option<String>,
    /// Bank-issued unique transaction reference; set at BankConfirmed.
    pub utr_number: Option<String>,
    /// Additional bank-side reference, if provided.
    pub bank_reference_number: Option<String>,
    /// When the settlement was created.
    pub created_at: DateTime<Utc>,
    /// When the settlement was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Settlement {
    /// Returns true if the settlement is in Failed with no retries left.
    ///
    /// This is the terminal failure state: further retry calls must fail and
    /// only manual intervention (a replacement settlement) can proceed.
    #[must_use]
    pub fn is_retry_exhausted(&self) -> bool {
        self.status == SettlementStatus::Failed && self.retry_count >= self.max_retries
    }
}

/// One recorded step in a settlement's state history.
///
/// Transitions are append-only and ordered; together they form a complete
/// walk of the transition table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    /// Status before the transition.
    pub from: SettlementStatus,
    /// Status after the transition.
    pub to: SettlementStatus,
    /// When the transition happened.
    pub at: DateTime<Utc>,
    /// Who drove the transition.
    pub by: UserId,
}

/// A validated settlement state transition with its audit data.
///
/// Each variant captures the resulting status plus the fields the
/// repository must persist alongside the status change.
#[derive(Debug, Clone)]
pub enum SettlementAction {
    /// Reserve payout funds.
    ReserveFunds {
        /// The new status (FundsReserved).
        new_status: SettlementStatus,
        /// Who drove the transition.
        actor: UserId,
        /// When the transition happened.
        at: DateTime<Utc>,
    },
    /// Send the payout instruction to the bank.
    SendToBank {
        /// The new status (SentToBank).
        new_status: SettlementStatus,
        /// Who drove the transition.
        actor: UserId,
        /// When the transition happened.
        at: DateTime<Utc>,
    },
    /// Record bank confirmation; the finality gate.
    ConfirmByBank {
        /// The new status (BankConfirmed).
        new_status: SettlementStatus,
        /// Who drove the transition.
        actor: UserId,
        /// When the transition happened.
        at: DateTime<Utc>,
        /// Bank-issued unique transaction reference.
        utr_number: String,
        /// Additional bank-side reference, if provided.
        bank_reference_number: Option<String>,
    },
    /// Mark the settlement reconciled and settled.
    MarkSettled {
        /// The new status (Settled).
        new_status: SettlementStatus,
        /// Who drove the transition.
        actor: UserId,
        /// When the transition happened.
        at: DateTime<Utc>,
    },
    /// Record a processing failure.
    MarkFailed {
        /// The new status (Failed).
        new_status: SettlementStatus,
        /// Who drove the transition.
        actor: UserId,
        /// When the transition happened.
        at: DateTime<Utc>,
        /// Why the settlement failed.
        failure_reason: String,
    },
    /// Schedule another attempt.
    Retry {
        /// The new status (Retried).
        new_status: SettlementStatus,
        /// Who drove the transition.
        actor: UserId,
        /// When the transition happened.
        at: DateTime<Utc>,
        /// Retry count after this attempt is consumed.
        retry_count: u32,
        /// When the retry becomes due.
        next_retry_at: DateTime<Utc>,
    },
}

impl SettlementAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub fn new_status(&self) -> SettlementStatus {
        match self {
            Self::ReserveFunds { new_status, .. }
            | Self::SendToBank { new_status, .. }
            | Self::ConfirmByBank { new_status, .. }
            | Self::MarkSettled { new_status, .. }
            | Self::MarkFailed { new_status, .. }
            | Self::Retry { new_status, .. } => *new_status,
        }
    }

    /// Builds the transition record this action appends to the history.
    #[must_use]
    pub fn transition(&self, from: SettlementStatus) -> StateTransition {
        let (actor, at) = match self {
            Self::ReserveFunds { actor, at, .. }
            | Self::SendToBank { actor, at, .. }
            | Self::ConfirmByBank { actor, at, .. }
            | Self::MarkSettled { actor, at, .. }
            | Self::MarkFailed { actor, at, .. }
            | Self::Retry { actor, at, .. } => (*actor, *at),
        };
        StateTransition {
            from,
            to: self.new_status(),
            at,
            by: actor,
        }
    }
}
