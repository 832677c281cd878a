//! Property-based tests for ledger lock rules.

use chrono::{NaiveDate, Utc};
use ledgerguard_shared::types::{LockId, TenantId, UserId};
use proptest::prelude::*;

use crate::lock::error::LockError;
use crate::lock::service::LockService;
use crate::lock::types::{LedgerLock, LockStatus, LockType};

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2020i32..=2030, 1u32..=12, 1u32..=28)
        .prop_map(|(year, month, day)| NaiveDate::from_ymd_opt(year, month, day).unwrap())
}

fn valid_range() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
    date_strategy().prop_flat_map(|start| {
        (Just(start), 0i64..=180)
            .prop_map(move |(s, days)| (s, s + chrono::Duration::days(days)))
    })
}

fn operator_lock_type() -> impl Strategy<Value = LockType> {
    prop_oneof![Just(LockType::AuditLock), Just(LockType::ReconciliationLock)]
}

fn make_active_lock(lock_type: LockType, start: NaiveDate, end: NaiveDate) -> LedgerLock {
    LedgerLock {
        id: LockId::new(),
        tenant_id: TenantId::new(),
        lock_type,
        lock_start_date: start,
        lock_end_date: end,
        lock_status: LockStatus::Active,
        reason: "Audit window".to_string(),
        reference_number: None,
        accounting_period_id: None,
        locked_by: UserId::new(),
        locked_at: Utc::now(),
        released_by: None,
        released_at: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any candidate range intersecting an active lock is rejected, and any
    /// disjoint range is accepted. Lock types do not partition the space:
    /// overlap is checked across all types.
    #[test]
    fn prop_no_two_active_locks_overlap(
        (a_start, a_end) in valid_range(),
        offset in -200i64..=200,
        len in 0i64..=60,
        existing_type in operator_lock_type(),
        candidate_type in operator_lock_type(),
    ) {
        let existing = vec![make_active_lock(existing_type, a_start, a_end)];
        let b_start = a_start + chrono::Duration::days(offset);
        let b_end = b_start + chrono::Duration::days(len);

        let result =
            LockService::validate_apply(&existing, candidate_type, b_start, b_end, "recheck");
        let intersects = b_start <= a_end && b_end >= a_start;

        if intersects {
            prop_assert!(
                matches!(result, Err(LockError::Overlap { .. })),
                "expected overlap rejection for [{b_start}, {b_end}]"
            );
        } else {
            prop_assert!(result.is_ok());
        }
    }

    /// The lock check agrees with range containment for every active lock.
    #[test]
    fn prop_check_matches_containment(
        (start, end) in valid_range(),
        probe_offset in -30i64..=210,
    ) {
        let locks = vec![make_active_lock(LockType::AuditLock, start, end)];
        let probe = start + chrono::Duration::days(probe_offset);
        let check = LockService::check(&locks, probe);
        prop_assert_eq!(check.is_locked, probe >= start && probe <= end);
    }

    /// Released locks never block and never prevent a new application.
    #[test]
    fn prop_released_locks_are_inert((start, end) in valid_range()) {
        let mut lock = make_active_lock(LockType::ReconciliationLock, start, end);
        lock.lock_status = LockStatus::Released;
        let locks = vec![lock];

        prop_assert!(!LockService::check(&locks, start).is_locked);
        prop_assert!(
            LockService::validate_apply(&locks, LockType::AuditLock, start, end, "again").is_ok()
        );
    }
}
