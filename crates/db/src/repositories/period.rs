//! Accounting period repository.
//!
//! Period creation enforces the overlap, gap, and one-open-period rules; the
//! close path walks the lifecycle forward only and creates the period lock
//! when a period reaches hard close.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use ledgerguard_core::lock::LockService;
use ledgerguard_core::lock::error::LockError;
use ledgerguard_core::period::{
    AccountingPeriod, PeriodError, PeriodService, PeriodStatus, PeriodType, PostingCheck,
};
use ledgerguard_shared::types::{PeriodId, TenantId, UserId};

use crate::entities::{accounting_periods, ledger_locks, sea_orm_active_enums};
use crate::repositories::lock::{active_locks_on, lock_from_model};
use crate::rls::RlsConnection;

/// Input for creating an accounting period.
#[derive(Debug, Clone)]
pub struct CreatePeriodInput {
    /// Tenant the period belongs to.
    pub tenant_id: TenantId,
    /// Period granularity.
    pub period_type: PeriodType,
    /// First day of the period.
    pub period_start: NaiveDate,
    /// Last day of the period (inclusive).
    pub period_end: NaiveDate,
    /// Who creates the period.
    pub created_by: UserId,
}

/// Accounting period repository.
#[derive(Debug, Clone)]
pub struct PeriodRepository {
    db: DatabaseConnection,
}

impl PeriodRepository {
    /// Creates a new period repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an accounting period after validating it against the tenant's
    /// existing periods of the same type.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is invalid, overlaps or leaves a gap
    /// against existing periods, an open period of this type already exists,
    /// or the database operation fails.
    pub async fn create_period(
        &self,
        input: CreatePeriodInput,
    ) -> Result<AccountingPeriod, PeriodError> {
        let rls = RlsConnection::new(&self.db, input.tenant_id)
            .await
            .map_err(db_err)?;

        let existing = accounting_periods::Entity::find()
            .filter(accounting_periods::Column::TenantId.eq(input.tenant_id.into_inner()))
            .all(rls.transaction())
            .await
            .map_err(db_err)?
            .into_iter()
            .map(period_from_model)
            .collect::<Vec<_>>();

        PeriodService::validate_new_period(
            &existing,
            input.period_type,
            input.period_start,
            input.period_end,
        )?;

        let now = Utc::now();
        let model = accounting_periods::ActiveModel {
            id: Set(PeriodId::new().into_inner()),
            tenant_id: Set(input.tenant_id.into_inner()),
            period_type: Set(input.period_type.into()),
            period_start: Set(input.period_start),
            period_end: Set(input.period_end),
            status: Set(sea_orm_active_enums::PeriodStatus::Open),
            closed_by: Set(None),
            closed_at: Set(None),
            closure_notes: Set(None),
            created_by: Set(input.created_by.into_inner()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let inserted = model.insert(rls.transaction()).await.map_err(db_err)?;
        rls.commit().await.map_err(db_err)?;

        let period = period_from_model(inserted);
        tracing::info!(
            period_id = %period.id,
            tenant_id = %period.tenant_id,
            period_start = %period.period_start,
            period_end = %period.period_end,
            "accounting period created"
        );
        Ok(period)
    }

    /// Lists the tenant's periods, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_periods(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<AccountingPeriod>, PeriodError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await.map_err(db_err)?;
        let periods = accounting_periods::Entity::find()
            .filter(accounting_periods::Column::TenantId.eq(tenant_id.into_inner()))
            .order_by_desc(accounting_periods::Column::PeriodStart)
            .all(rls.transaction())
            .await
            .map_err(db_err)?;
        rls.commit().await.map_err(db_err)?;
        Ok(periods.into_iter().map(period_from_model).collect())
    }

    /// Finds the period governing a transaction date.
    ///
    /// When daily and monthly periods both cover the date, the most
    /// restrictive status governs.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_period_for_date(
        &self,
        tenant_id: TenantId,
        date: NaiveDate,
    ) -> Result<Option<AccountingPeriod>, PeriodError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await.map_err(db_err)?;
        let period = find_period_for_date_on(rls.transaction(), tenant_id, date).await?;
        rls.commit().await.map_err(db_err)?;
        Ok(period)
    }

    /// Finds the tenant's currently open period of the given type, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_open_period(
        &self,
        tenant_id: TenantId,
        period_type: PeriodType,
    ) -> Result<Option<AccountingPeriod>, PeriodError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await.map_err(db_err)?;
        let period = accounting_periods::Entity::find()
            .filter(accounting_periods::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(
                accounting_periods::Column::PeriodType
                    .eq(sea_orm_active_enums::PeriodType::from(period_type)),
            )
            .filter(
                accounting_periods::Column::Status.eq(sea_orm_active_enums::PeriodStatus::Open),
            )
            .one(rls.transaction())
            .await
            .map_err(db_err)?;
        rls.commit().await.map_err(db_err)?;
        Ok(period.map(period_from_model))
    }

    /// Checks whether a posting date is acceptable from the period rules
    /// alone. Lock checks are layered on top by the posting guard.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn check_posting_date(
        &self,
        tenant_id: TenantId,
        date: NaiveDate,
    ) -> Result<PostingCheck, PeriodError> {
        let period = self.find_period_for_date(tenant_id, date).await?;
        Ok(PeriodService::check_for_posting(period.as_ref(), date))
    }

    /// Moves a period one step forward in its lifecycle.
    ///
    /// Soft close marks the period; hard close additionally creates the
    /// period lock over its date range in the same transaction. The status
    /// update is a compare-and-set on the status the caller observed.
    ///
    /// # Errors
    ///
    /// Returns an error if the period does not exist, the transition is not
    /// forward, the period lock would overlap an active lock, the period was
    /// concurrently modified, or the database operation fails.
    pub async fn close_period(
        &self,
        tenant_id: TenantId,
        period_id: PeriodId,
        target: PeriodStatus,
        closed_by: UserId,
        closure_notes: Option<String>,
    ) -> Result<AccountingPeriod, PeriodError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await.map_err(db_err)?;
        let txn = rls.transaction();

        let model = accounting_periods::Entity::find_by_id(period_id.into_inner())
            .one(txn)
            .await
            .map_err(db_err)?
            .ok_or(PeriodError::NotFoundById(period_id))?;
        let period = period_from_model(model);

        PeriodService::validate_close_transition(period.status, target)?;

        let now = Utc::now();
        let update = accounting_periods::ActiveModel {
            status: Set(target.into()),
            closed_by: Set(Some(closed_by.into_inner())),
            closed_at: Set(Some(now.into())),
            closure_notes: Set(closure_notes),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        // CAS on the status the caller observed
        let result = accounting_periods::Entity::update_many()
            .set(update)
            .filter(accounting_periods::Column::Id.eq(period_id.into_inner()))
            .filter(
                accounting_periods::Column::Status
                    .eq(sea_orm_active_enums::PeriodStatus::from(period.status)),
            )
            .exec(txn)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(PeriodError::ConcurrentModification);
        }

        if target == PeriodStatus::HardClosed {
            self.create_period_lock(txn, tenant_id, &period, closed_by).await?;
        }

        let updated = accounting_periods::Entity::find_by_id(period_id.into_inner())
            .one(txn)
            .await
            .map_err(db_err)?
            .ok_or(PeriodError::NotFoundById(period_id))?;
        rls.commit().await.map_err(db_err)?;

        tracing::info!(
            period_id = %period_id,
            tenant_id = %tenant_id,
            from = %period.status,
            to = %target,
            "accounting period closed"
        );
        Ok(period_from_model(updated))
    }

    async fn create_period_lock(
        &self,
        txn: &DatabaseTransaction,
        tenant_id: TenantId,
        period: &AccountingPeriod,
        locked_by: UserId,
    ) -> Result<(), PeriodError> {
        let active = active_locks_on(txn, tenant_id).await.map_err(db_err)?;
        let locks: Vec<_> = active.into_iter().map(lock_from_model).collect();

        let reason = format!(
            "Hard close of period {} to {}",
            period.period_start, period.period_end
        );
        LockService::validate_period_lock(&locks, period.period_start, period.period_end, &reason)
            .map_err(|err| match err {
                LockError::Overlap { existing_id, .. } => PeriodError::LockConflict {
                    lock_id: existing_id,
                },
                other => PeriodError::Database(other.to_string()),
            })?;

        let now = Utc::now();
        let lock = ledger_locks::ActiveModel {
            id: Set(Uuid::now_v7()),
            tenant_id: Set(tenant_id.into_inner()),
            lock_type: Set(sea_orm_active_enums::LockType::PeriodLock),
            lock_start_date: Set(period.period_start),
            lock_end_date: Set(period.period_end),
            lock_status: Set(sea_orm_active_enums::LockStatus::Active),
            reason: Set(reason),
            reference_number: Set(None),
            accounting_period_id: Set(Some(period.id.into_inner())),
            locked_by: Set(locked_by.into_inner()),
            locked_at: Set(now.into()),
            released_by: Set(None),
            released_at: Set(None),
        };
        lock.insert(txn).await.map_err(db_err)?;
        Ok(())
    }
}

/// Finds the period governing `date` on an existing transaction.
///
/// Loads every covering period rather than the first row: daily and monthly
/// periods can cover the same date, and the most restrictive status must
/// govern independently of row order.
pub(crate) async fn find_period_for_date_on(
    txn: &DatabaseTransaction,
    tenant_id: TenantId,
    date: NaiveDate,
) -> Result<Option<AccountingPeriod>, PeriodError> {
    let covering: Vec<AccountingPeriod> = accounting_periods::Entity::find()
        .filter(accounting_periods::Column::TenantId.eq(tenant_id.into_inner()))
        .filter(accounting_periods::Column::PeriodStart.lte(date))
        .filter(accounting_periods::Column::PeriodEnd.gte(date))
        .all(txn)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(period_from_model)
        .collect();
    Ok(PeriodService::governing_period_for_date(&covering, date).cloned())
}

/// Loads all of a tenant's periods on an existing transaction.
pub(crate) async fn periods_on(
    txn: &DatabaseTransaction,
    tenant_id: TenantId,
) -> Result<Vec<AccountingPeriod>, DbErr> {
    let periods = accounting_periods::Entity::find()
        .filter(accounting_periods::Column::TenantId.eq(tenant_id.into_inner()))
        .all(txn)
        .await?;
    Ok(periods.into_iter().map(period_from_model).collect())
}

pub(crate) fn period_from_model(model: accounting_periods::Model) -> AccountingPeriod {
    AccountingPeriod {
        id: PeriodId::from_uuid(model.id),
        tenant_id: TenantId::from_uuid(model.tenant_id),
        period_type: model.period_type.into(),
        period_start: model.period_start,
        period_end: model.period_end,
        status: model.status.into(),
        closed_by: model.closed_by.map(UserId::from_uuid),
        closed_at: model.closed_at.map(|at| at.with_timezone(&Utc)),
        closure_notes: model.closure_notes,
        created_by: UserId::from_uuid(model.created_by),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn db_err(err: DbErr) -> PeriodError {
    PeriodError::Database(err.to_string())
}
