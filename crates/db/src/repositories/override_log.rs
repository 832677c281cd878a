//! Override log repository.
//!
//! The log is append-only. Entries are inserted inside the transaction of
//! the action they justify, so a failed audit write fails the action.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use ledgerguard_core::audit::{AuditError, OverrideLogEntry};
use ledgerguard_shared::types::{OverrideLogId, TenantId, UserId};

use crate::entities::override_log;
use crate::rls::RlsConnection;

/// Override log repository.
#[derive(Debug, Clone)]
pub struct OverrideLogRepository {
    db: DatabaseConnection,
}

impl OverrideLogRepository {
    /// Creates a new override log repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the override history of one entity, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_entity(
        &self,
        tenant_id: TenantId,
        entity_type: &str,
        entity_id: Uuid,
    ) -> Result<Vec<OverrideLogEntry>, AuditError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await.map_err(db_err)?;
        let entries = override_log::Entity::find()
            .filter(override_log::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(override_log::Column::EntityType.eq(entity_type))
            .filter(override_log::Column::EntityId.eq(entity_id))
            .order_by_asc(override_log::Column::CreatedAt)
            .all(rls.transaction())
            .await
            .map_err(db_err)?;
        rls.commit().await.map_err(db_err)?;
        entries.into_iter().map(entry_from_model).collect()
    }

    /// Lists the tenant's most recent overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_recent(
        &self,
        tenant_id: TenantId,
        limit: u64,
    ) -> Result<Vec<OverrideLogEntry>, AuditError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await.map_err(db_err)?;
        let entries = override_log::Entity::find()
            .filter(override_log::Column::TenantId.eq(tenant_id.into_inner()))
            .order_by_desc(override_log::Column::CreatedAt)
            .limit(limit)
            .all(rls.transaction())
            .await
            .map_err(db_err)?;
        rls.commit().await.map_err(db_err)?;
        entries.into_iter().map(entry_from_model).collect()
    }
}

/// Inserts an override entry on an existing transaction.
pub(crate) async fn insert_override_entry(
    txn: &DatabaseTransaction,
    entry: &OverrideLogEntry,
) -> Result<(), DbErr> {
    let model = override_log::ActiveModel {
        id: Set(entry.id.into_inner()),
        tenant_id: Set(entry.tenant_id.into_inner()),
        override_type: Set(entry.override_type.into()),
        justification: Set(entry.justification.clone()),
        entity_type: Set(entry.entity_type.clone()),
        entity_id: Set(entry.entity_id),
        affected_entities: Set(serde_json::json!(entry.affected_entities)),
        override_by: Set(entry.override_by.into_inner()),
        override_by_role: Set(entry.override_by_role.into()),
        approved_by: Set(entry.approved_by.map(UserId::into_inner)),
        created_at: Set(entry.created_at.into()),
    };
    model.insert(txn).await?;
    tracing::info!(
        override_id = %entry.id,
        tenant_id = %entry.tenant_id,
        override_type = %entry.override_type,
        entity_type = %entry.entity_type,
        "override recorded"
    );
    Ok(())
}

fn entry_from_model(model: override_log::Model) -> Result<OverrideLogEntry, AuditError> {
    let affected_entities: Vec<Uuid> = serde_json::from_value(model.affected_entities)
        .map_err(|err| AuditError::Database(err.to_string()))?;
    Ok(OverrideLogEntry {
        id: OverrideLogId::from_uuid(model.id),
        tenant_id: TenantId::from_uuid(model.tenant_id),
        override_type: model.override_type.into(),
        justification: model.justification,
        entity_type: model.entity_type,
        entity_id: model.entity_id,
        affected_entities,
        override_by: UserId::from_uuid(model.override_by),
        override_by_role: model.override_by_role.into(),
        approved_by: model.approved_by.map(UserId::from_uuid),
        created_at: model.created_at.with_timezone(&Utc),
    })
}

fn db_err(err: DbErr) -> AuditError {
    AuditError::Database(err.to_string())
}
