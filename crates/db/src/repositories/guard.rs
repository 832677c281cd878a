//! Posting guard repository.
//!
//! Loads the tenant's periods and active locks under one RLS transaction,
//! asks the core guard for a decision, and co-commits the override audit
//! entry when one was used. The caller posts its journal entries on the
//! same transaction so posting and audit land atomically.

use chrono::{NaiveDate, Utc};
use sea_orm::{DatabaseConnection, DbErr};

use ledgerguard_core::guard::{GuardError, OverrideRequest, PostingAuthorization, PostingGuard};
use ledgerguard_shared::types::{TenantId, UserId};

use crate::repositories::lock::{active_locks_on, lock_from_model};
use crate::repositories::period::periods_on;
use crate::rls::RlsConnection;

/// Posting guard repository.
#[derive(Debug, Clone)]
pub struct PostingGuardRepository {
    db: DatabaseConnection,
}

impl PostingGuardRepository {
    /// Creates a new posting guard repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Authorizes posting a journal entry dated `transaction_date` and
    /// returns the open RLS transaction alongside the authorization.
    ///
    /// Any override audit entry is already inserted on the returned
    /// transaction; the caller executes its ledger writes on it and commits,
    /// or drops it to roll everything back together.
    ///
    /// # Errors
    ///
    /// Returns an error if the date is locked, no period covers it, the
    /// period is hard-closed, a required override is missing or invalid, or
    /// the database operation fails.
    pub async fn begin_authorized_posting(
        &self,
        tenant_id: TenantId,
        transaction_date: NaiveDate,
        actor: UserId,
        override_request: Option<&OverrideRequest>,
    ) -> Result<(RlsConnection, PostingAuthorization), GuardError> {
        let rls = RlsConnection::new(&self.db, tenant_id).await.map_err(db_err)?;
        let txn = rls.transaction();

        let periods = periods_on(txn, tenant_id).await.map_err(db_err)?;
        let locks = active_locks_on(txn, tenant_id)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(lock_from_model)
            .collect::<Vec<_>>();

        let authorization = PostingGuard::authorize(
            tenant_id,
            &periods,
            &locks,
            transaction_date,
            actor,
            override_request,
            Utc::now(),
        )?;

        if let Some(entry) = &authorization.override_entry {
            crate::repositories::override_log::insert_override_entry(txn, entry)
                .await
                .map_err(db_err)?;
            tracing::warn!(
                tenant_id = %tenant_id,
                period_id = %authorization.period_id,
                override_by = %actor,
                date = %transaction_date,
                "posting authorized via soft-close override"
            );
        }

        Ok((rls, authorization))
    }

    /// Authorizes and immediately commits, for callers that only need the
    /// decision and the audit side effect.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::begin_authorized_posting`].
    pub async fn authorize_posting(
        &self,
        tenant_id: TenantId,
        transaction_date: NaiveDate,
        actor: UserId,
        override_request: Option<&OverrideRequest>,
    ) -> Result<PostingAuthorization, GuardError> {
        let (rls, authorization) = self
            .begin_authorized_posting(tenant_id, transaction_date, actor, override_request)
            .await?;
        rls.commit().await.map_err(db_err)?;
        Ok(authorization)
    }
}

fn db_err(err: DbErr) -> GuardError {
    GuardError::Database(err.to_string())
}
