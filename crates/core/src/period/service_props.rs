//! Property-based tests for period lifecycle rules.

use chrono::{NaiveDate, Utc};
use ledgerguard_shared::types::{PeriodId, TenantId, UserId};
use proptest::prelude::*;

use crate::period::error::PeriodError;
use crate::period::service::{PeriodService, date_ranges_overlap};
use crate::period::types::{AccountingPeriod, PeriodStatus, PeriodType};

/// Strategy to generate valid dates within a reasonable range.
fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2020i32..=2030, 1u32..=12, 1u32..=28)
        .prop_map(|(year, month, day)| NaiveDate::from_ymd_opt(year, month, day).unwrap())
}

/// Strategy to generate a valid inclusive range (start <= end).
fn valid_range() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
    date_strategy().prop_flat_map(|start| {
        (Just(start), 0i64..=365)
            .prop_map(move |(s, days)| (s, s + chrono::Duration::days(days)))
    })
}

fn status_strategy() -> impl Strategy<Value = PeriodStatus> {
    prop_oneof![
        Just(PeriodStatus::Open),
        Just(PeriodStatus::SoftClosed),
        Just(PeriodStatus::HardClosed),
    ]
}

fn make_period(start: NaiveDate, end: NaiveDate, status: PeriodStatus) -> AccountingPeriod {
    AccountingPeriod {
        id: PeriodId::new(),
        tenant_id: TenantId::new(),
        period_type: PeriodType::Monthly,
        period_start: start,
        period_end: end,
        status,
        closed_by: None,
        closed_at: None,
        closure_notes: None,
        created_by: UserId::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Overlap detection is symmetric.
    #[test]
    fn prop_overlap_is_symmetric(
        (a_start, a_end) in valid_range(),
        (b_start, b_end) in valid_range(),
    ) {
        let ab = date_ranges_overlap(a_start, a_end, b_start, b_end);
        let ba = date_ranges_overlap(b_start, b_end, a_start, a_end);
        prop_assert_eq!(ab, ba);
    }

    /// Adjacent ranges (B starting the day after A ends) never overlap.
    #[test]
    fn prop_adjacent_ranges_do_not_overlap((a_start, a_end) in valid_range()) {
        let b_start = a_end + chrono::Duration::days(1);
        let b_end = b_start + chrono::Duration::days(30);
        prop_assert!(!date_ranges_overlap(a_start, a_end, b_start, b_end));
    }

    /// The contiguous successor of any closed period is always accepted, and
    /// any other start date is rejected with a gap or overlap error.
    #[test]
    fn prop_contiguity_is_exact(
        (start, end) in valid_range(),
        offset in -30i64..=30,
        len in 0i64..=60,
    ) {
        let existing = vec![make_period(start, end, PeriodStatus::HardClosed)];
        let expected_start = PeriodService::next_period_start(end);
        let candidate_start = expected_start + chrono::Duration::days(offset);
        let candidate_end = candidate_start + chrono::Duration::days(len);

        let result = PeriodService::validate_new_period(
            &existing,
            PeriodType::Monthly,
            candidate_start,
            candidate_end,
        );

        if offset == 0 {
            prop_assert!(result.is_ok(), "Contiguous successor should be accepted");
        } else {
            prop_assert!(
                matches!(result, Err(PeriodError::Gap { .. } | PeriodError::Overlap { .. })),
                "Non-contiguous start should be rejected, got {result:?}"
            );
        }
    }

    /// No transition escapes the forward-only lifecycle: the only valid moves
    /// are Open -> SoftClosed and SoftClosed -> HardClosed.
    #[test]
    fn prop_lifecycle_is_forward_only(from in status_strategy(), to in status_strategy()) {
        let valid = matches!(
            (from, to),
            (PeriodStatus::Open, PeriodStatus::SoftClosed)
                | (PeriodStatus::SoftClosed, PeriodStatus::HardClosed)
        );
        let result = PeriodService::validate_close_transition(from, to);
        prop_assert_eq!(result.is_ok(), valid);
    }

    /// A hard-closed period rejects posting for every date it covers.
    #[test]
    fn prop_hard_closed_always_rejects((start, end) in valid_range(), offset in 0i64..=365) {
        let period = make_period(start, end, PeriodStatus::HardClosed);
        let date = start + chrono::Duration::days(offset);
        if period.contains_date(date) {
            let check = PeriodService::check_for_posting(Some(&period), date);
            prop_assert!(!check.posting_allowed);
            prop_assert!(!check.override_required);
        }
    }

    /// Posting decision flags are mutually consistent for every status.
    #[test]
    fn prop_posting_check_consistent((start, end) in valid_range(), status in status_strategy()) {
        let period = make_period(start, end, status);
        let check = PeriodService::check_for_posting(Some(&period), start);

        match status {
            PeriodStatus::Open => {
                prop_assert!(check.posting_allowed);
                prop_assert!(!check.override_required);
                prop_assert!(check.error_message.is_none());
            }
            PeriodStatus::SoftClosed => {
                prop_assert!(!check.posting_allowed);
                prop_assert!(check.override_required);
            }
            PeriodStatus::HardClosed => {
                prop_assert!(!check.posting_allowed);
                prop_assert!(!check.override_required);
            }
        }
    }
}
