//! Period lifecycle rules: creation validation, close transitions, and the
//! posting decision table.
//!
//! This service contains pure business logic with no database dependencies.
//! The repository layer reads the tenant's existing periods and delegates all
//! policy decisions here.

use chrono::{Days, NaiveDate};
use std::cmp::Reverse;

use crate::period::error::PeriodError;
use crate::period::types::{AccountingPeriod, PeriodStatus, PeriodType, PostingCheck};

/// Checks if two inclusive date ranges overlap.
///
/// Two ranges `[a_start, a_end]` and `[b_start, b_end]` overlap if:
/// `a_start <= b_end AND a_end >= b_start`.
#[must_use]
pub fn date_ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// Stateless service for accounting period policy decisions.
pub struct PeriodService;

impl PeriodService {
    /// Returns the required start date for the next period after `latest_end`.
    ///
    /// Consecutive periods of the same type must be contiguous: the next
    /// period starts exactly one day after the previous one ends.
    #[must_use]
    pub fn next_period_start(latest_end: NaiveDate) -> NaiveDate {
        latest_end
            .checked_add_days(Days::new(1))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Validates a candidate period against the tenant's existing periods of
    /// the same type.
    ///
    /// # Arguments
    /// * `existing` - All existing periods for the tenant and period type
    /// * `period_type` - The candidate's period type
    /// * `start` / `end` - The candidate's inclusive date range
    ///
    /// # Errors
    /// * `PeriodError::InvalidDateRange` if `start > end`
    /// * `PeriodError::DuplicateOpenPeriod` if an open period of this type exists
    /// * `PeriodError::Overlap` if the range intersects an existing period
    /// * `PeriodError::Gap` if the range does not begin exactly where the most
    ///   recent period ended
    pub fn validate_new_period(
        existing: &[AccountingPeriod],
        period_type: PeriodType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(), PeriodError> {
        if start > end {
            return Err(PeriodError::InvalidDateRange);
        }

        let same_type: Vec<&AccountingPeriod> = existing
            .iter()
            .filter(|p| p.period_type == period_type)
            .collect();

        // At most one open period per (tenant, period type).
        if let Some(open) = same_type.iter().find(|p| p.status == PeriodStatus::Open) {
            return Err(PeriodError::DuplicateOpenPeriod {
                existing_id: open.id,
            });
        }

        if let Some(overlapping) = same_type
            .iter()
            .find(|p| date_ranges_overlap(start, end, p.period_start, p.period_end))
        {
            return Err(PeriodError::Overlap {
                existing_id: overlapping.id,
            });
        }

        // Second and subsequent periods must be contiguous with the latest.
        if let Some(latest) = same_type.iter().max_by_key(|p| p.period_end) {
            let expected_start = Self::next_period_start(latest.period_end);
            if start != expected_start {
                return Err(PeriodError::Gap {
                    expected_start,
                    actual_start: start,
                });
            }
        }

        Ok(())
    }

    /// Validates a close transition.
    ///
    /// Only the two forward steps are permitted:
    /// Open -> SoftClosed and SoftClosed -> HardClosed. Skipping straight from
    /// Open to HardClosed is rejected, HardClosed is terminal, and there is no
    /// reopen path.
    pub fn validate_close_transition(
        from: PeriodStatus,
        to: PeriodStatus,
    ) -> Result<(), PeriodError> {
        match (from, to) {
            (PeriodStatus::Open, PeriodStatus::SoftClosed)
            | (PeriodStatus::SoftClosed, PeriodStatus::HardClosed) => Ok(()),
            _ => Err(PeriodError::InvalidTransition { from, to }),
        }
    }

    /// Picks the period that governs a posting date.
    ///
    /// Daily and monthly periods can cover the same date with different
    /// statuses. Posting rules must not depend on which row loaded first, so
    /// the most restrictive status governs; among equally restrictive
    /// covering periods the narrower range wins as the more specific scope.
    #[must_use]
    pub fn governing_period_for_date(
        periods: &[AccountingPeriod],
        date: NaiveDate,
    ) -> Option<&AccountingPeriod> {
        periods
            .iter()
            .filter(|p| p.contains_date(date))
            .max_by_key(|p| {
                (
                    p.status.restrictiveness(),
                    Reverse(p.period_end - p.period_start),
                )
            })
    }

    /// Checks whether a posting dated inside `period` is acceptable.
    ///
    /// Decision table:
    /// - no covering period -> not allowed, period not found
    /// - Open -> allowed, no override
    /// - SoftClosed -> not allowed without override; override can allow it
    /// - HardClosed -> never allowed, override irrelevant
    #[must_use]
    pub fn check_for_posting(
        period: Option<&AccountingPeriod>,
        transaction_date: NaiveDate,
    ) -> PostingCheck {
        let Some(period) = period else {
            return PostingCheck {
                period_id: None,
                status: None,
                posting_allowed: false,
                override_required: false,
                error_message: Some(format!(
                    "No accounting period found for date {transaction_date}"
                )),
            };
        };

        match period.status {
            PeriodStatus::Open => PostingCheck {
                period_id: Some(period.id),
                status: Some(PeriodStatus::Open),
                posting_allowed: true,
                override_required: false,
                error_message: None,
            },
            PeriodStatus::SoftClosed => PostingCheck {
                period_id: Some(period.id),
                status: Some(PeriodStatus::SoftClosed),
                posting_allowed: false,
                override_required: true,
                error_message: Some(
                    "Period is soft-closed; posting requires an admin override".to_string(),
                ),
            },
            PeriodStatus::HardClosed => PostingCheck {
                period_id: Some(period.id),
                status: Some(PeriodStatus::HardClosed),
                posting_allowed: false,
                override_required: false,
                error_message: Some(
                    "Period is hard-closed and immutable; no posting is possible".to_string(),
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ledgerguard_shared::types::{PeriodId, TenantId, UserId};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_period(
        period_type: PeriodType,
        start: NaiveDate,
        end: NaiveDate,
        status: PeriodStatus,
    ) -> AccountingPeriod {
        AccountingPeriod {
            id: PeriodId::new(),
            tenant_id: TenantId::new(),
            period_type,
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

    #[test]
    fn test_first_period_has_no_contiguity_requirement() {
        let result = PeriodService::validate_new_period(
            &[],
            PeriodType::Monthly,
            ymd(2024, 3, 1),
            ymd(2024, 3, 31),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_date_range_rejected() {
        let result = PeriodService::validate_new_period(
            &[],
            PeriodType::Daily,
            ymd(2024, 1, 2),
            ymd(2024, 1, 1),
        );
        assert!(matches!(result, Err(PeriodError::InvalidDateRange)));
    }

    #[test]
    fn test_duplicate_open_period_rejected() {
        let existing = vec![make_period(
            PeriodType::Monthly,
            ymd(2024, 1, 1),
            ymd(2024, 1, 31),
            PeriodStatus::Open,
        )];
        let result = PeriodService::validate_new_period(
            &existing,
            PeriodType::Monthly,
            ymd(2024, 2, 1),
            ymd(2024, 2, 29),
        );
        assert!(matches!(
            result,
            Err(PeriodError::DuplicateOpenPeriod { .. })
        ));
    }

    #[test]
    fn test_open_period_of_other_type_is_ignored() {
        let existing = vec![make_period(
            PeriodType::Daily,
            ymd(2024, 1, 1),
            ymd(2024, 1, 1),
            PeriodStatus::Open,
        )];
        let result = PeriodService::validate_new_period(
            &existing,
            PeriodType::Monthly,
            ymd(2024, 1, 1),
            ymd(2024, 1, 31),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_overlap_rejected() {
        let existing = vec![make_period(
            PeriodType::Monthly,
            ymd(2024, 1, 1),
            ymd(2024, 1, 31),
            PeriodStatus::HardClosed,
        )];
        let result = PeriodService::validate_new_period(
            &existing,
            PeriodType::Monthly,
            ymd(2024, 1, 15),
            ymd(2024, 2, 14),
        );
        assert!(matches!(result, Err(PeriodError::Overlap { .. })));
    }

    #[test]
    fn test_gap_rejected() {
        let existing = vec![make_period(
            PeriodType::Monthly,
            ymd(2024, 1, 1),
            ymd(2024, 1, 31),
            PeriodStatus::HardClosed,
        )];
        // Starts 2024-02-02, leaving 2024-02-01 uncovered.
        let result = PeriodService::validate_new_period(
            &existing,
            PeriodType::Monthly,
            ymd(2024, 2, 2),
            ymd(2024, 2, 29),
        );
        assert!(matches!(
            result,
            Err(PeriodError::Gap {
                expected_start,
                actual_start,
            }) if expected_start == ymd(2024, 2, 1) && actual_start == ymd(2024, 2, 2)
        ));
    }

    #[test]
    fn test_contiguous_period_accepted() {
        let existing = vec![make_period(
            PeriodType::Monthly,
            ymd(2024, 1, 1),
            ymd(2024, 1, 31),
            PeriodStatus::SoftClosed,
        )];
        let result = PeriodService::validate_new_period(
            &existing,
            PeriodType::Monthly,
            ymd(2024, 2, 1),
            ymd(2024, 2, 29),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_close_transitions_forward_only() {
        assert!(
            PeriodService::validate_close_transition(
                PeriodStatus::Open,
                PeriodStatus::SoftClosed
            )
            .is_ok()
        );
        assert!(
            PeriodService::validate_close_transition(
                PeriodStatus::SoftClosed,
                PeriodStatus::HardClosed
            )
            .is_ok()
        );

        // Skipping straight to hard close is disallowed.
        assert!(matches!(
            PeriodService::validate_close_transition(
                PeriodStatus::Open,
                PeriodStatus::HardClosed
            ),
            Err(PeriodError::InvalidTransition { .. })
        ));
        // No reopen path.
        assert!(
            PeriodService::validate_close_transition(
                PeriodStatus::SoftClosed,
                PeriodStatus::Open
            )
            .is_err()
        );
        assert!(
            PeriodService::validate_close_transition(
                PeriodStatus::HardClosed,
                PeriodStatus::Open
            )
            .is_err()
        );
        assert!(
            PeriodService::validate_close_transition(
                PeriodStatus::HardClosed,
                PeriodStatus::SoftClosed
            )
            .is_err()
        );
        // Same-status close calls are caller bugs, not no-ops.
        assert!(
            PeriodService::validate_close_transition(PeriodStatus::Open, PeriodStatus::Open)
                .is_err()
        );
    }

    #[test]
    fn test_check_for_posting_no_period() {
        let check = PeriodService::check_for_posting(None, ymd(2024, 1, 1));
        assert!(!check.posting_allowed);
        assert!(!check.override_required);
        assert!(check.period_id.is_none());
        assert!(check.error_message.unwrap().contains("2024-01-01"));
    }

    #[test]
    fn test_check_for_posting_open() {
        let period = make_period(
            PeriodType::Daily,
            ymd(2024, 1, 1),
            ymd(2024, 1, 1),
            PeriodStatus::Open,
        );
        let check = PeriodService::check_for_posting(Some(&period), ymd(2024, 1, 1));
        assert!(check.posting_allowed);
        assert!(!check.override_required);
        assert_eq!(check.period_id, Some(period.id));
    }

    #[test]
    fn test_check_for_posting_soft_closed() {
        let period = make_period(
            PeriodType::Daily,
            ymd(2024, 1, 1),
            ymd(2024, 1, 1),
            PeriodStatus::SoftClosed,
        );
        let check = PeriodService::check_for_posting(Some(&period), ymd(2024, 1, 1));
        assert!(!check.posting_allowed);
        assert!(check.override_required);
    }

    #[test]
    fn test_check_for_posting_hard_closed() {
        let period = make_period(
            PeriodType::Daily,
            ymd(2024, 1, 1),
            ymd(2024, 1, 1),
            PeriodStatus::HardClosed,
        );
        let check = PeriodService::check_for_posting(Some(&period), ymd(2024, 1, 1));
        assert!(!check.posting_allowed);
        // Override cannot help here.
        assert!(!check.override_required);
        assert!(check.error_message.unwrap().contains("immutable"));
    }

    #[test]
    fn test_governing_period_prefers_most_restrictive() {
        let daily_open = make_period(
            PeriodType::Daily,
            ymd(2024, 1, 15),
            ymd(2024, 1, 15),
            PeriodStatus::Open,
        );
        let monthly_soft = make_period(
            PeriodType::Monthly,
            ymd(2024, 1, 1),
            ymd(2024, 1, 31),
            PeriodStatus::SoftClosed,
        );

        // Same answer whichever way the rows were loaded.
        let forward = vec![daily_open.clone(), monthly_soft.clone()];
        let reverse = vec![monthly_soft.clone(), daily_open.clone()];
        let picked = PeriodService::governing_period_for_date(&forward, ymd(2024, 1, 15)).unwrap();
        assert_eq!(picked.id, monthly_soft.id);
        let picked = PeriodService::governing_period_for_date(&reverse, ymd(2024, 1, 15)).unwrap();
        assert_eq!(picked.id, monthly_soft.id);
    }

    #[test]
    fn test_governing_period_hard_closed_beats_soft_closed() {
        let daily_soft = make_period(
            PeriodType::Daily,
            ymd(2024, 1, 15),
            ymd(2024, 1, 15),
            PeriodStatus::SoftClosed,
        );
        let monthly_hard = make_period(
            PeriodType::Monthly,
            ymd(2024, 1, 1),
            ymd(2024, 1, 31),
            PeriodStatus::HardClosed,
        );
        let periods = vec![daily_soft, monthly_hard.clone()];
        let picked = PeriodService::governing_period_for_date(&periods, ymd(2024, 1, 15)).unwrap();
        assert_eq!(picked.id, monthly_hard.id);
    }

    #[test]
    fn test_governing_period_equal_status_picks_narrower() {
        let daily = make_period(
            PeriodType::Daily,
            ymd(2024, 1, 15),
            ymd(2024, 1, 15),
            PeriodStatus::Open,
        );
        let monthly = make_period(
            PeriodType::Monthly,
            ymd(2024, 1, 1),
            ymd(2024, 1, 31),
            PeriodStatus::Open,
        );
        let periods = vec![monthly, daily.clone()];
        let picked = PeriodService::governing_period_for_date(&periods, ymd(2024, 1, 15)).unwrap();
        assert_eq!(picked.id, daily.id);
    }

    #[test]
    fn test_governing_period_none_when_uncovered() {
        let periods = vec![make_period(
            PeriodType::Monthly,
            ymd(2024, 1, 1),
            ymd(2024, 1, 31),
            PeriodStatus::Open,
        )];
        assert!(PeriodService::governing_period_for_date(&periods, ymd(2024, 2, 1)).is_none());
    }

    #[test]
    fn test_next_period_start() {
        assert_eq!(
            PeriodService::next_period_start(ymd(2024, 1, 31)),
            ymd(2024, 2, 1)
        );
        assert_eq!(
            PeriodService::next_period_start(ymd(2024, 12, 31)),
            ymd(2025, 1, 1)
        );
    }
}
