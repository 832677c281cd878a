//! Row-Level Security (RLS) context management.
//!
//! This module provides utilities for setting `PostgreSQL` RLS context
//! per request to enforce multi-tenant data isolation.
//!
//! # Usage
//!
//! ```ignore
//! use ledgerguard_db::rls::RlsConnection;
//!
//! let rls_conn = RlsConnection::new(&db, tenant_id).await?;
//!
//! // Use rls_conn.transaction() for all queries
//! let periods = AccountingPeriods::find().all(rls_conn.transaction()).await?;
//!
//! rls_conn.commit().await?;
//! ```

use ledgerguard_shared::types::TenantId;
use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};

/// A database connection wrapper that sets RLS context for multi-tenant isolation.
///
/// Wraps a database transaction and ensures the `PostgreSQL` session variable
/// `app.current_tenant_id` is set before any queries are executed, enabling
/// row-level security policies.
pub struct RlsConnection {
    txn: DatabaseTransaction,
}

impl RlsConnection {
    /// Creates a new RLS-enabled connection with the given tenant context.
    ///
    /// Begins a transaction and sets `app.current_tenant_id` using
    /// `SET LOCAL`, which scopes the setting to the current transaction only.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or the RLS
    /// context cannot be set.
    pub async fn new(db: &DatabaseConnection, tenant_id: TenantId) -> Result<Self, DbErr> {
        let txn = db.begin().await?;
        txn.execute_unprepared(&rls_context_sql(tenant_id)).await?;
        Ok(Self { txn })
    }

    /// Returns a reference to the underlying transaction for executing queries.
    #[must_use]
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Commits the transaction, persisting all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }

    /// Rolls back the transaction, discarding all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback fails.
    pub async fn rollback(self) -> Result<(), DbErr> {
        self.txn.rollback().await
    }
}

/// Extension trait for `DatabaseConnection` to easily create RLS-enabled connections.
#[async_trait::async_trait]
pub trait RlsExt {
    /// Creates an RLS-enabled connection with the given tenant context.
    ///
    /// # Errors
    ///
    /// Returns an error if the RLS connection cannot be created.
    async fn with_rls(&self, tenant_id: TenantId) -> Result<RlsConnection, DbErr>;
}

#[async_trait::async_trait]
impl RlsExt for DatabaseConnection {
    async fn with_rls(&self, tenant_id: TenantId) -> Result<RlsConnection, DbErr> {
        RlsConnection::new(self, tenant_id).await
    }
}

/// Sets the RLS context on an existing transaction.
///
/// # Errors
///
/// Returns an error if the RLS context cannot be set.
pub async fn set_rls_context(txn: &DatabaseTransaction, tenant_id: TenantId) -> Result<(), DbErr> {
    txn.execute_unprepared(&rls_context_sql(tenant_id)).await?;
    Ok(())
}

// Tenant IDs are UUIDs, so interpolation cannot inject SQL.
fn rls_context_sql(tenant_id: TenantId) -> String {
    format!("SET LOCAL app.current_tenant_id = '{tenant_id}'")
}
