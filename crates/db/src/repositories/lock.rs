//! Ledger lock repository.
//!
//! Operators apply and release audit and reconciliation locks here. Period
//! locks are created only by the period repository during hard close and can
//! never be released.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use ledgerguard_core::audit::{AuditError, OverrideLogEntry, OverrideType, UserRole};
use ledgerguard_core::lock::{LedgerLock, LockCheck, LockError, LockService, LockType};
use ledgerguard_shared::types::{LockId, PeriodId, TenantId, UserId};

use crate::entities::{ledger_locks, sea_orm_active_enums};
use crate::repositories::override_log::insert_override_entry;
use crate::rls::RlsConnection;

/// Input for applying a ledger lock.
#[derive(Debug, Clone)]
pub struct ApplyLockInput {
    /// Tenant the lock belongs to.
    pub tenant_id: TenantId,
    /// Kind of lock; period locks are rejected on this path.
    pub lock_type: LockType,
    /// First locked day.
    pub lock_start_date: NaiveDate,
    /// Last locked day (inclusive).
    pub lock_end_date: NaiveDate,
    /// Why the range is being locked.
    pub reason: String,
    /// External reference, such as an audit engagement number.
    pub reference_number: Option<String>,
    /// Who applies the lock.
    pub locked_by: UserId,
}

/// Input for releasing a ledger lock.
#[derive(Debug, Clone)]
pub struct ReleaseLockInput {
    /// Tenant the lock belongs to.
    pub tenant_id: TenantId,
    /// The lock being released.
    pub lock_id: LockId,
    /// Who releases the lock.
    pub released_by: UserId,
    /// The releaser's role, recorded in the audit trail.
    pub role: UserRole,
    /// Why the lock is being released.
    pub justification: String,
}

/// Ledger lock repository.
#[derive(Debug, Clone)]
pub struct LockRepository {
    db: DatabaseConnection,
}

impl LockRepository {
    /// Creates a new lock repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Applies an audit or reconciliation lock over a date range.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is a period lock, the range is invalid,
    /// the reason is blank, the range overlaps an active lock, or the
    /// database operation fails.
    pub async fn apply_lock(&self, input: ApplyLockInput) -> Result<LedgerLock, LockError> {
        let rls = RlsConnection::new(&self.db, input.tenant_id)
            .await
            .map_err(db_err)?;

        let active = active_locks_on(rls.transaction(), input.tenant_id)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(lock_from_model)
            .collect::<Vec<_>>();
        LockService::validate_apply(
            &active,
            input.lock_type,
            input.lock_start_date,
            input.lock_end_date,
            &input.reason,
        )?;

        let now = Utc::now();
        let model = ledger_locks::ActiveModel {
            id: Set(LockId::new().into_inner()),
            tenant_id: Set(input.tenant_id.into_inner()),
            lock_type: Set(input.lock_type.into()),
            lock_start_date: Set(input.lock_start_date),
            lock_end_date: Set(input.lock_end_date),
            lock_status: Set(sea_orm_active_enums::LockStatus::Active),
            reason: Set(input.reason),
            reference_number: Set(input.reference_number),
            accounting_period_id: Set(None),
            locked_by: Set(input.locked_by.into_inner()),
            locked_at: Set(now.into()),
            released_by: Set(None),
            released_at: Set(None),
        };
        let inserted = model.insert(rls.transaction()).await.map_err(db_err)?;
        rls.commit().await.map_err(db_err)?;

        let lock = lock_from_model(inserted);
        tracing::info!(
            lock_id = %lock.id,
            tenant_id = %lock.tenant_id,
            lock_type = %lock.lock_type,
            start = %lock.lock_start_date,
            end = %lock.lock_end_date,
            "ledger lock applied"
        );
        Ok(lock)
    }

    /// Releases an audit or reconciliation lock.
    ///
    /// Every release is an auditable exception: a `lock_release` override
    /// entry is written in the same transaction as the status change. The
    /// status change is a compare-and-set on the active status.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock does not exist, is a period lock, is
    /// already released, the justification is too short, the lock was
    /// concurrently modified, or the database operation fails.
    pub async fn release_lock(&self, input: ReleaseLockInput) -> Result<LedgerLock, LockError> {
        let rls = RlsConnection::new(&self.db, input.tenant_id)
            .await
            .map_err(db_err)?;
        let txn = rls.transaction();

        let model = ledger_locks::Entity::find_by_id(input.lock_id.into_inner())
            .one(txn)
            .await
            .map_err(db_err)?
            .ok_or(LockError::NotFound(input.lock_id))?;
        let lock = lock_from_model(model);
        LockService::validate_release(&lock)?;

        let now = Utc::now();
        let entry = OverrideLogEntry::new(
            input.tenant_id,
            OverrideType::LockRelease,
            &input.justification,
            "ledger_lock",
            input.lock_id.into_inner(),
            input.released_by,
            input.role,
            None,
            now,
        )
        .map_err(|err| match err {
            AuditError::JustificationTooShort => LockError::ReasonRequired,
            AuditError::Database(msg) => LockError::Database(msg),
        })?;
        insert_override_entry(txn, &entry).await.map_err(db_err)?;

        let update = ledger_locks::ActiveModel {
            lock_status: Set(sea_orm_active_enums::LockStatus::Released),
            released_by: Set(Some(input.released_by.into_inner())),
            released_at: Set(Some(now.into())),
            ..Default::default()
        };
        let result = ledger_locks::Entity::update_many()
            .set(update)
            .filter(ledger_locks::Column::Id.eq(input.lock_id.into_inner()))
            .filter(ledger_locks::Column::LockStatus.eq(sea_orm_active_enums::LockStatus::Active))
            .exec(txn)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(LockError::ConcurrentModification);
        }

        let updated = ledger_locks::Entity::find_by_id(input.lock_id.into_inner())
            .one(txn)
            .await
            .map_err(db_err)?
            .ok_or(LockError::NotFound(input.lock_id))?;
        rls.commit().await.map_err(db_err)?;

        tracing::info!(
            lock_id = %input.lock_id,
            tenant_id = %input.tenant_id,
            released_by = %input.released_by,
            "ledger lock released"
        );
        Ok(lock_from_model(updated))
    }

    /// Lists the tenant's locks, most recently applied first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_locks(&self, tenant_id: TenantId) -> Result<Vec<LedgerLock>, LockError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await.map_err(db_err)?;
        let locks = ledger_locks::Entity::find()
            .filter(ledger_locks::Column::TenantId.eq(tenant_id.into_inner()))
            .order_by_desc(ledger_locks::Column::LockedAt)
            .all(rls.transaction())
            .await
            .map_err(db_err)?;
        rls.commit().await.map_err(db_err)?;
        Ok(locks.into_iter().map(lock_from_model).collect())
    }

    /// Checks whether any active lock covers a transaction date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn check_date(
        &self,
        tenant_id: TenantId,
        date: NaiveDate,
    ) -> Result<LockCheck, LockError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await.map_err(db_err)?;
        let active = active_locks_on(rls.transaction(), tenant_id)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(lock_from_model)
            .collect::<Vec<_>>();
        rls.commit().await.map_err(db_err)?;
        Ok(LockService::check(&active, date))
    }
}

/// Loads the tenant's active locks on an existing transaction.
pub(crate) async fn active_locks_on(
    txn: &DatabaseTransaction,
    tenant_id: TenantId,
) -> Result<Vec<ledger_locks::Model>, DbErr> {
    ledger_locks::Entity::find()
        .filter(ledger_locks::Column::TenantId.eq(tenant_id.into_inner()))
        .filter(ledger_locks::Column::LockStatus.eq(sea_orm_active_enums::LockStatus::Active))
        .all(txn)
        .await
}

pub(crate) fn lock_from_model(model: ledger_locks::Model) -> LedgerLock {
    LedgerLock {
        id: LockId::from_uuid(model.id),
        tenant_id: TenantId::from_uuid(model.tenant_id),
        lock_type: model.lock_type.into(),
        lock_start_date: model.lock_start_date,
        lock_end_date: model.lock_end_date,
        lock_status: model.lock_status.into(),
        reason: model.reason,
        reference_number: model.reference_number,
        accounting_period_id: model.accounting_period_id.map(PeriodId::from_uuid),
        locked_by: UserId::from_uuid(model.locked_by),
        locked_at: model.locked_at.with_timezone(&Utc),
        released_by: model.released_by.map(UserId::from_uuid),
        released_at: model.released_at.map(|at| at.with_timezone(&Utc)),
    }
}

fn db_err(err: DbErr) -> LockError {
    LockError::Database(err.to_string())
}
