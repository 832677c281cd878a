//! Settlement repository.
//!
//! Every status change goes through the core state machine, then lands as a
//! compare-and-set update plus an appended transition row in one
//! transaction. Two workers racing on the same settlement cannot both win:
//! the loser's CAS matches zero rows and surfaces as
//! `ConcurrentModification`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use ledgerguard_core::settlement::retry::RetryPolicy;
use ledgerguard_core::settlement::{
    Settlement, SettlementAction, SettlementError, SettlementMachine, SettlementStatus,
    StateTransition,
};
use ledgerguard_shared::types::{SettlementId, TenantId, UserId};

use crate::entities::{sea_orm_active_enums, settlement_transitions, settlements};
use crate::rls::RlsConnection;

/// Input for creating a settlement.
#[derive(Debug, Clone)]
pub struct CreateSettlementInput {
    /// Tenant the settlement belongs to.
    pub tenant_id: TenantId,
    /// External settlement reference, unique per tenant.
    pub settlement_ref: String,
    /// Merchant being paid out.
    pub merchant_id: Uuid,
    /// Net payout amount.
    pub net_amount: Decimal,
    /// Maximum automatic retries.
    pub max_retries: u32,
}

/// Settlement repository.
#[derive(Debug, Clone)]
pub struct SettlementRepository {
    db: DatabaseConnection,
}

impl SettlementRepository {
    /// Creates a new settlement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a settlement in the Created status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails, including a
    /// duplicate settlement reference.
    pub async fn create_settlement(
        &self,
        input: CreateSettlementInput,
    ) -> Result<Settlement, SettlementError> {
        let rls = RlsConnection::new(&self.db, input.tenant_id)
            .await
            .map_err(db_err)?;
        let now = Utc::now();
        let model = settlements::ActiveModel {
            id: Set(SettlementId::new().into_inner()),
            tenant_id: Set(input.tenant_id.into_inner()),
            settlement_ref: Set(input.settlement_ref),
            merchant_id: Set(input.merchant_id),
            net_amount: Set(input.net_amount),
            status: Set(sea_orm_active_enums::SettlementStatus::Created),
            retry_count: Set(0),
            max_retries: Set(i32::try_from(input.max_retries).unwrap_or(i32::MAX)),
            next_retry_at: Set(None),
            last_retry_at: Set(None),
            failure_reason: Set(None),
            utr_number: Set(None),
            bank_reference_number: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let inserted = model.insert(rls.transaction()).await.map_err(db_err)?;
        rls.commit().await.map_err(db_err)?;

        let settlement = settlement_from_model(inserted);
        tracing::info!(
            settlement_id = %settlement.id,
            tenant_id = %settlement.tenant_id,
            settlement_ref = %settlement.settlement_ref,
            "settlement created"
        );
        Ok(settlement)
    }

    /// Finds a settlement by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_settlement(
        &self,
        tenant_id: TenantId,
        settlement_id: SettlementId,
    ) -> Result<Option<Settlement>, SettlementError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await.map_err(db_err)?;
        let model = settlements::Entity::find_by_id(settlement_id.into_inner())
            .one(rls.transaction())
            .await
            .map_err(db_err)?;
        rls.commit().await.map_err(db_err)?;
        Ok(model.map(settlement_from_model))
    }

    /// Lists a settlement's transition history, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_transitions(
        &self,
        tenant_id: TenantId,
        settlement_id: SettlementId,
    ) -> Result<Vec<StateTransition>, SettlementError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await.map_err(db_err)?;
        let rows = settlement_transitions::Entity::find()
            .filter(settlement_transitions::Column::SettlementId.eq(settlement_id.into_inner()))
            .order_by_asc(settlement_transitions::Column::TransitionedAt)
            .all(rls.transaction())
            .await
            .map_err(db_err)?;
        rls.commit().await.map_err(db_err)?;
        Ok(rows
            .into_iter()
            .map(|row| StateTransition {
                from: row.from_status.into(),
                to: row.to_status.into(),
                at: row.transitioned_at.with_timezone(&Utc),
                by: UserId::from_uuid(row.transitioned_by),
            })
            .collect())
    }

    /// Reserves payout funds.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is invalid, the settlement was
    /// concurrently modified, or the database operation fails.
    pub async fn reserve_funds(
        &self,
        tenant_id: TenantId,
        settlement_id: SettlementId,
        actor: UserId,
    ) -> Result<Settlement, SettlementError> {
        self.transition(tenant_id, settlement_id, |settlement, now| {
            SettlementMachine::reserve_funds(settlement, actor, now)
        })
        .await
    }

    /// Sends the payout instruction to the bank.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is invalid, the settlement was
    /// concurrently modified, or the database operation fails.
    pub async fn send_to_bank(
        &self,
        tenant_id: TenantId,
        settlement_id: SettlementId,
        actor: UserId,
    ) -> Result<Settlement, SettlementError> {
        self.transition(tenant_id, settlement_id, |settlement, now| {
            SettlementMachine::send_to_bank(settlement, actor, now)
        })
        .await
    }

    /// Records bank confirmation with its UTR number.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is invalid, the UTR is blank, the
    /// settlement was concurrently modified, or the database operation fails.
    pub async fn confirm_by_bank(
        &self,
        tenant_id: TenantId,
        settlement_id: SettlementId,
        actor: UserId,
        utr_number: &str,
        bank_reference_number: Option<String>,
    ) -> Result<Settlement, SettlementError> {
        self.transition(tenant_id, settlement_id, |settlement, now| {
            SettlementMachine::confirm_by_bank(
                settlement,
                actor,
                now,
                utr_number,
                bank_reference_number.clone(),
            )
        })
        .await
    }

    /// Marks the settlement reconciled and settled.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is invalid, the settlement was
    /// concurrently modified, or the database operation fails.
    pub async fn mark_settled(
        &self,
        tenant_id: TenantId,
        settlement_id: SettlementId,
        actor: UserId,
    ) -> Result<Settlement, SettlementError> {
        self.transition(tenant_id, settlement_id, |settlement, now| {
            SettlementMachine::mark_settled(settlement, actor, now)
        })
        .await
    }

    /// Records a processing failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is invalid, the reason is blank,
    /// the settlement was concurrently modified, or the database operation
    /// fails.
    pub async fn mark_failed(
        &self,
        tenant_id: TenantId,
        settlement_id: SettlementId,
        actor: UserId,
        failure_reason: &str,
    ) -> Result<Settlement, SettlementError> {
        self.transition(tenant_id, settlement_id, |settlement, now| {
            SettlementMachine::mark_failed(settlement, actor, now, failure_reason)
        })
        .await
    }

    /// Schedules another attempt using the retry policy's backoff.
    ///
    /// # Errors
    ///
    /// Returns an error if the settlement is not in Failed, its retry budget
    /// is exhausted, it was concurrently modified, or the database operation
    /// fails.
    pub async fn retry(
        &self,
        tenant_id: TenantId,
        settlement_id: SettlementId,
        actor: UserId,
        policy: &RetryPolicy,
    ) -> Result<Settlement, SettlementError> {
        self.transition(tenant_id, settlement_id, |settlement, now| {
            SettlementMachine::retry(settlement, policy, actor, now)
        })
        .await
    }

    /// Returns settlements whose scheduled retry is due, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn due_for_retry(
        &self,
        tenant_id: TenantId,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<Settlement>, SettlementError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await.map_err(db_err)?;
        let rows = settlements::Entity::find()
            .filter(settlements::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(
                settlements::Column::Status
                    .eq(sea_orm_active_enums::SettlementStatus::Retried),
            )
            .filter(settlements::Column::NextRetryAt.lte(now))
            .order_by_asc(settlements::Column::NextRetryAt)
            .limit(limit)
            .all(rls.transaction())
            .await
            .map_err(db_err)?;
        rls.commit().await.map_err(db_err)?;
        Ok(rows.into_iter().map(settlement_from_model).collect())
    }

    async fn transition<F>(
        &self,
        tenant_id: TenantId,
        settlement_id: SettlementId,
        decide: F,
    ) -> Result<Settlement, SettlementError>
    where
        F: FnOnce(&Settlement, DateTime<Utc>) -> Result<SettlementAction, SettlementError>,
    {
        let rls = RlsConnection::new(&self.db, tenant_id).await.map_err(db_err)?;
        let txn = rls.transaction();

        let model = settlements::Entity::find_by_id(settlement_id.into_inner())
            .one(txn)
            .await
            .map_err(db_err)?
            .ok_or(SettlementError::NotFound(settlement_id))?;
        let settlement = settlement_from_model(model);

        let now = Utc::now();
        let action = decide(&settlement, now)?;
        apply_action(txn, &settlement, &action).await?;

        let updated = settlements::Entity::find_by_id(settlement_id.into_inner())
            .one(txn)
            .await
            .map_err(db_err)?
            .ok_or(SettlementError::NotFound(settlement_id))?;
        rls.commit().await.map_err(db_err)?;

        tracing::info!(
            settlement_id = %settlement_id,
            tenant_id = %tenant_id,
            from = %settlement.status,
            to = %action.new_status(),
            "settlement transitioned"
        );
        Ok(settlement_from_model(updated))
    }
}

/// Applies a validated action: CAS on the observed status plus an appended
/// transition row.
async fn apply_action(
    txn: &DatabaseTransaction,
    settlement: &Settlement,
    action: &SettlementAction,
) -> Result<(), SettlementError> {
    let now_status: sea_orm_active_enums::SettlementStatus = action.new_status().into();
    let record = action.transition(settlement.status);

    let mut update = settlements::ActiveModel {
        status: Set(now_status),
        updated_at: Set(record.at.into()),
        ..Default::default()
    };
    match action {
        SettlementAction::ConfirmByBank {
            utr_number,
            bank_reference_number,
            ..
        } => {
            update.utr_number = Set(Some(utr_number.clone()));
            update.bank_reference_number = Set(bank_reference_number.clone());
        }
        SettlementAction::MarkFailed { failure_reason, .. } => {
            update.failure_reason = Set(Some(failure_reason.clone()));
        }
        SettlementAction::Retry {
            retry_count,
            next_retry_at,
            ..
        } => {
            update.retry_count = Set(i32::try_from(*retry_count).unwrap_or(i32::MAX));
            update.next_retry_at = Set(Some((*next_retry_at).into()));
            update.last_retry_at = Set(Some(record.at.into()));
        }
        SettlementAction::ReserveFunds { .. }
        | SettlementAction::SendToBank { .. }
        | SettlementAction::MarkSettled { .. } => {}
    }

    let result = settlements::Entity::update_many()
        .set(update)
        .filter(settlements::Column::Id.eq(settlement.id.into_inner()))
        .filter(
            settlements::Column::Status
                .eq(sea_orm_active_enums::SettlementStatus::from(settlement.status)),
        )
        .exec(txn)
        .await
        .map_err(db_err)?;
    if result.rows_affected == 0 {
        return Err(SettlementError::ConcurrentModification);
    }

    let transition = settlement_transitions::ActiveModel {
        id: Set(Uuid::now_v7()),
        settlement_id: Set(settlement.id.into_inner()),
        tenant_id: Set(settlement.tenant_id.into_inner()),
        from_status: Set(record.from.into()),
        to_status: Set(record.to.into()),
        transitioned_at: Set(record.at.into()),
        transitioned_by: Set(record.by.into_inner()),
    };
    transition.insert(txn).await.map_err(db_err)?;
    Ok(())
}

pub(crate) fn settlement_from_model(model: settlements::Model) -> Settlement {
    Settlement {
        id: SettlementId::from_uuid(model.id),
        tenant_id: TenantId::from_uuid(model.tenant_id),
        settlement_ref: model.settlement_ref,
        merchant_id: model.merchant_id,
        net_amount: model.net_amount,
        status: model.status.into(),
        retry_count: u32::try_from(model.retry_count).unwrap_or(0),
        max_retries: u32::try_from(model.max_retries).unwrap_or(0),
        next_retry_at: model.next_retry_at.map(|at| at.with_timezone(&Utc)),
        last_retry_at: model.last_retry_at.map(|at| at.with_timezone(&Utc)),
        failure_reason: model.failure_reason,
        utr_number: model.utr_number,
        bank_reference_number: model.bank_reference_number,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn db_err(err: DbErr) -> SettlementError {
    SettlementError::Database(err.to_string())
}
