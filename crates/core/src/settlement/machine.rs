//! Settlement state machine.
//!
//! Pure transition validation: each operation checks the current status
//! against the transition table and returns a `SettlementAction` describing
//! the persisted outcome, or an error. The repository layer applies the
//! action under a compare-and-set on the expected status.

use chrono::{DateTime, Utc};
use ledgerguard_shared::types::UserId;

use crate::settlement::error::SettlementError;
use crate::settlement::retry::RetryPolicy;
use crate::settlement::types::{Settlement, SettlementAction, SettlementStatus};

/// Stateless service validating settlement transitions.
pub struct SettlementMachine;

impl SettlementMachine {
    /// Returns true if `from → to` appears in the transition table.
    #[must_use]
    pub fn is_valid_transition(from: SettlementStatus, to: SettlementStatus) -> bool {
        from.valid_next_states().contains(&to)
    }

    fn require_transition(
        settlement: &Settlement,
        to: SettlementStatus,
    ) -> Result<(), SettlementError> {
        if Self::is_valid_transition(settlement.status, to) {
            Ok(())
        } else {
            Err(SettlementError::InvalidTransition {
                from: settlement.status,
                to,
                valid_next: settlement.status.valid_next_states().to_vec(),
            })
        }
    }

    /// Reserves payout funds. Valid from Created or Retried.
    ///
    /// # Errors
    /// * `SettlementError::InvalidTransition` from any other status
    pub fn reserve_funds(
        settlement: &Settlement,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<SettlementAction, SettlementError> {
        Self::require_transition(settlement, SettlementStatus::FundsReserved)?;
        Ok(SettlementAction::ReserveFunds {
            new_status: SettlementStatus::FundsReserved,
            actor,
            at: now,
        })
    }

    /// Sends the payout instruction to the bank. Valid from FundsReserved.
    ///
    /// # Errors
    /// * `SettlementError::InvalidTransition` from any other status
    pub fn send_to_bank(
        settlement: &Settlement,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<SettlementAction, SettlementError> {
        Self::require_transition(settlement, SettlementStatus::SentToBank)?;
        Ok(SettlementAction::SendToBank {
            new_status: SettlementStatus::SentToBank,
            actor,
            at: now,
        })
    }

    /// Records bank confirmation with its UTR number. Valid from SentToBank.
    ///
    /// This is the finality gate: once applied, the settlement can no longer
    /// fail or retry.
    ///
    /// # Errors
    /// * `SettlementError::InvalidTransition` from any other status
    /// * `SettlementError::UtrRequired` if the UTR number is blank
    pub fn confirm_by_bank(
        settlement: &Settlement,
        actor: UserId,
        now: DateTime<Utc>,
        utr_number: &str,
        bank_reference_number: Option<String>,
    ) -> Result<SettlementAction, SettlementError> {
        Self::require_transition(settlement, SettlementStatus::BankConfirmed)?;
        if utr_number.trim().is_empty() {
            return Err(SettlementError::UtrRequired);
        }
        Ok(SettlementAction::ConfirmByBank {
            new_status: SettlementStatus::BankConfirmed,
            actor,
            at: now,
            utr_number: utr_number.trim().to_string(),
            bank_reference_number,
        })
    }

    /// Marks the settlement reconciled and settled. Valid from BankConfirmed.
    ///
    /// # Errors
    /// * `SettlementError::InvalidTransition` from any other status
    pub fn mark_settled(
        settlement: &Settlement,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<SettlementAction, SettlementError> {
        Self::require_transition(settlement, SettlementStatus::Settled)?;
        Ok(SettlementAction::MarkSettled {
            new_status: SettlementStatus::Settled,
            actor,
            at: now,
        })
    }

    /// Records a processing failure with its reason. Valid from Created,
    /// FundsReserved, SentToBank, or Retried.
    ///
    /// # Errors
    /// * `SettlementError::InvalidTransition` from any other status
    /// * `SettlementError::FailureReasonRequired` if the reason is blank
    pub fn mark_failed(
        settlement: &Settlement,
        actor: UserId,
        now: DateTime<Utc>,
        failure_reason: &str,
    ) -> Result<SettlementAction, SettlementError> {
        Self::require_transition(settlement, SettlementStatus::Failed)?;
        if failure_reason.trim().is_empty() {
            return Err(SettlementError::FailureReasonRequired);
        }
        Ok(SettlementAction::MarkFailed {
            new_status: SettlementStatus::Failed,
            actor,
            at: now,
            failure_reason: failure_reason.trim().to_string(),
        })
    }

    /// Schedules another attempt. Valid from Failed while retries remain.
    ///
    /// The backoff delay is chosen by the retry count before increment: the
    /// first retry waits the first schedule entry, and so on. The returned
    /// action carries the incremented count.
    ///
    /// # Errors
    /// * `SettlementError::InvalidTransition` from any status other than Failed
    /// * `SettlementError::RetryExhausted` once `retry_count >= max_retries`
    pub fn retry(
        settlement: &Settlement,
        policy: &RetryPolicy,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<SettlementAction, SettlementError> {
        Self::require_transition(settlement, SettlementStatus::Retried)?;
        if settlement.retry_count >= settlement.max_retries {
            return Err(SettlementError::RetryExhausted {
                retry_count: settlement.retry_count,
                max_retries: settlement.max_retries,
            });
        }
        Ok(SettlementAction::Retry {
            new_status: SettlementStatus::Retried,
            actor,
            at: now,
            retry_count: settlement.retry_count + 1,
            next_retry_at: policy.next_retry_at(now, settlement.retry_count),
        })
    }
}
