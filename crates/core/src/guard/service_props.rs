//! Property-based tests for posting authorization.

use chrono::{Datelike, NaiveDate, Utc};
use ledgerguard_shared::types::{LockId, PeriodId, TenantId, UserId};
use proptest::prelude::*;

use crate::audit::types::UserRole;
use crate::guard::error::GuardError;
use crate::guard::service::PostingGuard;
use crate::guard::types::OverrideRequest;
use crate::lock::types::{LedgerLock, LockStatus, LockType};
use crate::period::types::{AccountingPeriod, PeriodStatus, PeriodType};

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2024i32..=2025, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn status_strategy() -> impl Strategy<Value = PeriodStatus> {
    prop_oneof![
        Just(PeriodStatus::Open),
        Just(PeriodStatus::SoftClosed),
        Just(PeriodStatus::HardClosed),
    ]
}

fn role_strategy() -> impl Strategy<Value = UserRole> {
    prop_oneof![
        Just(UserRole::Viewer),
        Just(UserRole::Operator),
        Just(UserRole::FinanceAdmin),
    ]
}

fn month_period(tenant_id: TenantId, date: NaiveDate, status: PeriodStatus) -> AccountingPeriod {
    let start = date.with_day(1).unwrap();
    let end = if start.month() == 12 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
    }
    .unwrap()
        - chrono::Duration::days(1);
    AccountingPeriod {
        id: PeriodId::new(),
        tenant_id,
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

fn day_period(tenant_id: TenantId, date: NaiveDate, status: PeriodStatus) -> AccountingPeriod {
    AccountingPeriod {
        id: PeriodId::new(),
        tenant_id,
        period_type: PeriodType::Daily,
        period_start: date,
        period_end: date,
        status,
        closed_by: None,
        closed_at: None,
        closure_notes: None,
        created_by: UserId::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn covering_lock(tenant_id: TenantId, date: NaiveDate) -> LedgerLock {
    LedgerLock {
        id: LockId::new(),
        tenant_id,
        lock_type: LockType::ReconciliationLock,
        lock_start_date: date,
        lock_end_date: date,
        lock_status: LockStatus::Active,
        reason: "Bank reconciliation in progress".to_string(),
        reference_number: None,
        accounting_period_id: None,
        locked_by: UserId::new(),
        locked_at: Utc::now(),
        released_by: None,
        released_at: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(150))]

    /// A covering active lock denies the posting regardless of period status,
    /// role, or justification.
    #[test]
    fn prop_locks_are_never_overridable(
        date in date_strategy(),
        status in status_strategy(),
        role in role_strategy(),
    ) {
        let tenant_id = TenantId::new();
        let periods = vec![month_period(tenant_id, date, status)];
        let locks = vec![covering_lock(tenant_id, date)];
        let request = OverrideRequest {
            justification: "A perfectly valid long justification".to_string(),
            role,
            approved_by: None,
        };
        let result = PostingGuard::authorize(
            tenant_id, &periods, &locks, date, UserId::new(), Some(&request), Utc::now(),
        );
        prop_assert!(
            matches!(result, Err(GuardError::LedgerLocked { .. })),
            "expected the lock to deny posting on {date}"
        );
    }

    /// Without locks, the outcome is a pure function of period status and the
    /// override request, and an audit entry exists exactly when the posting
    /// went through a soft-closed period.
    #[test]
    fn prop_decision_table_without_locks(
        date in date_strategy(),
        status in status_strategy(),
        with_override in any::<bool>(),
        role in role_strategy(),
    ) {
        let tenant_id = TenantId::new();
        let periods = vec![month_period(tenant_id, date, status)];
        let request = OverrideRequest {
            justification: "Late invoice needs to land in this period".to_string(),
            role,
            approved_by: None,
        };
        let override_request = with_override.then_some(&request);
        let result = PostingGuard::authorize(
            tenant_id, &periods, &[], date, UserId::new(), override_request, Utc::now(),
        );

        match status {
            PeriodStatus::Open => {
                let auth = result.unwrap();
                prop_assert!(!auth.used_override());
            }
            PeriodStatus::HardClosed => {
                prop_assert!(matches!(result, Err(GuardError::PeriodClosed(_))));
            }
            PeriodStatus::SoftClosed => match (with_override, role.can_override()) {
                (false, _) => {
                    prop_assert!(matches!(result, Err(GuardError::OverrideRequired)));
                }
                (true, false) => {
                    prop_assert!(matches!(
                        result,
                        Err(GuardError::InsufficientOverrideRole(_))
                    ));
                }
                (true, true) => {
                    let auth = result.unwrap();
                    prop_assert!(auth.used_override());
                }
            },
        }
    }

    /// When daily and monthly periods both cover the date, the decision is
    /// the same whichever order the rows were loaded in, and the most
    /// restrictive status governs.
    #[test]
    fn prop_decision_ignores_period_load_order(
        date in date_strategy(),
        daily_status in status_strategy(),
        monthly_status in status_strategy(),
    ) {
        let tenant_id = TenantId::new();
        let daily = day_period(tenant_id, date, daily_status);
        let monthly = month_period(tenant_id, date, monthly_status);

        let outcome = |periods: &[AccountingPeriod]| {
            match PostingGuard::authorize(
                tenant_id, periods, &[], date, UserId::new(), None, Utc::now(),
            ) {
                Ok(auth) => format!("allowed override={}", auth.used_override()),
                Err(err) => err.error_code().to_string(),
            }
        };
        let forward = outcome(&[daily.clone(), monthly.clone()]);
        let reverse = outcome(&[monthly, daily]);
        prop_assert_eq!(&forward, &reverse);

        let worst = daily_status
            .restrictiveness()
            .max(monthly_status.restrictiveness());
        let expected = match worst {
            0 => "allowed override=false",
            1 => "ADMIN_OVERRIDE_REQUIRED",
            _ => "PERIOD_CLOSED",
        };
        prop_assert_eq!(forward, expected);
    }

    /// A date no period covers is always denied.
    #[test]
    fn prop_uncovered_date_denied(date in date_strategy()) {
        let tenant_id = TenantId::new();
        let result = PostingGuard::authorize(
            tenant_id, &[], &[], date, UserId::new(), None, Utc::now(),
        );
        prop_assert!(matches!(result, Err(GuardError::PeriodNotFound(_))));
    }
}
