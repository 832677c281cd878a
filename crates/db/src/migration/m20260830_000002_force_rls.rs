//! Migration to enable FORCE ROW LEVEL SECURITY on all tenant tables.
//!
//! This ensures RLS policies apply even to table owners and superusers,
//! providing an additional layer of security for multi-tenant isolation.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(FORCE_RLS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DISABLE_FORCE_RLS_SQL).await?;
        Ok(())
    }
}

const FORCE_RLS_SQL: &str = r"
ALTER TABLE accounting_periods FORCE ROW LEVEL SECURITY;
ALTER TABLE ledger_locks FORCE ROW LEVEL SECURITY;
ALTER TABLE settlements FORCE ROW LEVEL SECURITY;
ALTER TABLE settlement_transitions FORCE ROW LEVEL SECURITY;
ALTER TABLE override_log FORCE ROW LEVEL SECURITY;
";

const DISABLE_FORCE_RLS_SQL: &str = r"
ALTER TABLE accounting_periods NO FORCE ROW LEVEL SECURITY;
ALTER TABLE ledger_locks NO FORCE ROW LEVEL SECURITY;
ALTER TABLE settlements NO FORCE ROW LEVEL SECURITY;
ALTER TABLE settlement_transitions NO FORCE ROW LEVEL SECURITY;
ALTER TABLE override_log NO FORCE ROW LEVEL SECURITY;
";
