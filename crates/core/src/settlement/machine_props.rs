//! Property-based tests for the settlement state machine.

use chrono::Utc;
use ledgerguard_shared::types::{SettlementId, TenantId, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::settlement::error::SettlementError;
use crate::settlement::machine::SettlementMachine;
use crate::settlement::retry::RetryPolicy;
use crate::settlement::types::{Settlement, SettlementAction, SettlementStatus};

const ALL_STATUSES: [SettlementStatus; 7] = [
    SettlementStatus::Created,
    SettlementStatus::FundsReserved,
    SettlementStatus::SentToBank,
    SettlementStatus::BankConfirmed,
    SettlementStatus::Settled,
    SettlementStatus::Failed,
    SettlementStatus::Retried,
];

fn status_strategy() -> impl Strategy<Value = SettlementStatus> {
    prop::sample::select(ALL_STATUSES.to_vec())
}

fn make_settlement(status: SettlementStatus, retry_count: u32, max_retries: u32) -> Settlement {
    Settlement {
        id: SettlementId::new(),
        tenant_id: TenantId::new(),
        settlement_ref: "SETT-PROP".to_string(),
        merchant_id: Uuid::new_v4(),
        net_amount: Decimal::new(100_000, 2),
        status,
        retry_count,
        max_retries,
        next_retry_at: None,
        last_retry_at: None,
        failure_reason: None,
        utr_number: None,
        bank_reference_number: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn apply(
    settlement: &Settlement,
    to: SettlementStatus,
    policy: &RetryPolicy,
) -> Result<SettlementAction, SettlementError> {
    let actor = UserId::new();
    let now = Utc::now();
    match to {
        SettlementStatus::Created => Err(SettlementError::InvalidTransition {
            from: settlement.status,
            to,
            valid_next: settlement.status.valid_next_states().to_vec(),
        }),
        SettlementStatus::FundsReserved => SettlementMachine::reserve_funds(settlement, actor, now),
        SettlementStatus::SentToBank => SettlementMachine::send_to_bank(settlement, actor, now),
        SettlementStatus::BankConfirmed => {
            SettlementMachine::confirm_by_bank(settlement, actor, now, "UTR-PROP", None)
        }
        SettlementStatus::Settled => SettlementMachine::mark_settled(settlement, actor, now),
        SettlementStatus::Failed => {
            SettlementMachine::mark_failed(settlement, actor, now, "induced failure")
        }
        SettlementStatus::Retried => SettlementMachine::retry(settlement, policy, actor, now),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every operation agrees exactly with the transition table: a requested
    /// status succeeds when and only when it is a valid next state (modulo
    /// retry exhaustion, which fails separately).
    #[test]
    fn prop_operations_match_transition_table(
        from in status_strategy(),
        to in status_strategy(),
        retry_count in 0u32..=5,
    ) {
        let settlement = make_settlement(from, retry_count, 3);
        let policy = RetryPolicy::default();
        let result = apply(&settlement, to, &policy);

        let table_allows = from.valid_next_states().contains(&to);
        let exhausted = to == SettlementStatus::Retried && retry_count >= 3;

        if table_allows && !exhausted {
            prop_assert!(result.is_ok(), "expected {from} -> {to} to succeed");
            prop_assert_eq!(result.unwrap().new_status(), to);
        } else if table_allows && exhausted {
            prop_assert!(
                matches!(result, Err(SettlementError::RetryExhausted { .. })),
                "expected retry exhaustion for {from} -> {to}"
            );
        } else {
            prop_assert!(
                matches!(result, Err(SettlementError::InvalidTransition { .. })),
                "expected {from} -> {to} to be rejected"
            );
        }
    }

    /// Settled accepts no operation whatsoever.
    #[test]
    fn prop_settled_is_terminal(to in status_strategy()) {
        let settlement = make_settlement(SettlementStatus::Settled, 0, 3);
        let result = apply(&settlement, to, &RetryPolicy::default());
        prop_assert!(result.is_err());
    }

    /// Once bank-confirmed, a settlement can never move to Failed or Retried.
    #[test]
    fn prop_no_failure_after_bank_confirmation(retry_count in 0u32..=3) {
        for status in [SettlementStatus::BankConfirmed, SettlementStatus::Settled] {
            let settlement = make_settlement(status, retry_count, 3);
            let policy = RetryPolicy::default();
            prop_assert!(apply(&settlement, SettlementStatus::Failed, &policy).is_err());
            prop_assert!(apply(&settlement, SettlementStatus::Retried, &policy).is_err());
        }
    }

    /// Retry counts grow by exactly one per scheduled retry, and the total
    /// number of successful retries never exceeds the configured maximum.
    #[test]
    fn prop_retry_budget_is_bounded(max_retries in 1u32..=6) {
        let policy = RetryPolicy { max_retries, ..RetryPolicy::default() };
        let mut settlement = make_settlement(SettlementStatus::Failed, 0, max_retries);
        let mut successful_retries = 0u32;

        // Drive the failure loop until exhaustion.
        loop {
            match SettlementMachine::retry(&settlement, &policy, UserId::new(), Utc::now()) {
                Ok(SettlementAction::Retry { retry_count, .. }) => {
                    prop_assert_eq!(retry_count, settlement.retry_count + 1);
                    settlement.retry_count = retry_count;
                    settlement.status = SettlementStatus::Failed;
                    successful_retries += 1;
                }
                Ok(other) => prop_assert!(false, "unexpected action {:?}", other),
                Err(SettlementError::RetryExhausted { retry_count, .. }) => {
                    prop_assert_eq!(retry_count, max_retries);
                    break;
                }
                Err(other) => prop_assert!(false, "unexpected error {:?}", other),
            }
        }

        prop_assert_eq!(successful_retries, max_retries);
    }

    /// Backoff delays never shrink as attempts accumulate.
    #[test]
    fn prop_backoff_is_monotonic(attempt in 0u32..=10) {
        let policy = RetryPolicy::default();
        prop_assert!(policy.delay(attempt + 1) >= policy.delay(attempt));
    }
}
