//! Posting authorization logic.
//!
//! Checks run in a fixed order: locks first, then period existence, then
//! period status. Locks win over everything because they exist precisely to
//! freeze ranges that period rules would otherwise allow.

use chrono::{DateTime, NaiveDate, Utc};
use ledgerguard_shared::types::{TenantId, UserId};

use crate::audit::types::{OverrideLogEntry, OverrideType};
use crate::guard::error::GuardError;
use crate::guard::types::{OverrideRequest, PostingAuthorization};
use crate::lock::service::LockService;
use crate::lock::types::LedgerLock;
use crate::period::service::PeriodService;
use crate::period::types::{AccountingPeriod, PeriodStatus};

/// Stateless posting authorization service.
pub struct PostingGuard;

impl PostingGuard {
    /// Authorizes posting a journal entry dated `transaction_date`.
    ///
    /// `periods` and `active_locks` are the tenant's periods and locks as
    /// loaded by the repository; the decision itself is pure.
    ///
    /// Order of checks:
    /// 1. Active locks. A covering lock denies the posting and no override
    ///    exists for locks.
    /// 2. Period existence for the date. When daily and monthly periods both
    ///    cover it, the most restrictive status governs regardless of slice
    ///    order.
    /// 3. Period status: Open posts freely, HardClosed always denies,
    ///    SoftClosed requires a finance-admin override with a valid
    ///    justification and yields an audit entry the caller must co-commit.
    ///
    /// # Errors
    /// * `GuardError::LedgerLocked` if an active lock covers the date
    /// * `GuardError::PeriodNotFound` if no period covers the date
    /// * `GuardError::PeriodClosed` for a hard-closed period
    /// * `GuardError::OverrideRequired` for soft-closed without an override
    /// * `GuardError::InsufficientOverrideRole` if the override's role cannot
    ///   authorize it
    /// * `GuardError::Audit` if the override justification is too short
    #[allow(clippy::too_many_arguments)]
    pub fn authorize(
        tenant_id: TenantId,
        periods: &[AccountingPeriod],
        active_locks: &[LedgerLock],
        transaction_date: NaiveDate,
        actor: UserId,
        override_request: Option<&OverrideRequest>,
        now: DateTime<Utc>,
    ) -> Result<PostingAuthorization, GuardError> {
        if let Some(lock) = LockService::find_blocking(active_locks, transaction_date) {
            return Err(GuardError::LedgerLocked {
                lock_id: lock.id,
                lock_type: lock.lock_type,
                locked_by: lock.locked_by,
                locked_at: lock.locked_at,
                date: transaction_date,
                reason: lock.reason.clone(),
            });
        }

        let period = PeriodService::governing_period_for_date(periods, transaction_date)
            .ok_or(GuardError::PeriodNotFound(transaction_date))?;

        match period.status {
            PeriodStatus::Open => Ok(PostingAuthorization {
                period_id: period.id,
                override_entry: None,
            }),
            PeriodStatus::HardClosed => Err(GuardError::PeriodClosed(transaction_date)),
            PeriodStatus::SoftClosed => {
                let request = override_request.ok_or(GuardError::OverrideRequired)?;
                if !request.role.can_override() {
                    return Err(GuardError::InsufficientOverrideRole(request.role));
                }
                let entry = OverrideLogEntry::new(
                    tenant_id,
                    OverrideType::SoftClosedPosting,
                    &request.justification,
                    "accounting_period",
                    period.id.into_inner(),
                    actor,
                    request.role,
                    request.approved_by,
                    now,
                )?;
                Ok(PostingAuthorization {
                    period_id: period.id,
                    override_entry: Some(entry),
                })
            }
        }
    }
}
