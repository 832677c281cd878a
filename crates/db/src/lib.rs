//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the control-plane tables
//! - Repository abstractions applying the core policy decisions
//! - Database migrations
//! - Row-level security context helpers for tenant isolation

pub mod entities;
pub mod migration;
pub mod repositories;
pub mod rls;

pub use repositories::{
    LockRepository, OverrideLogRepository, PeriodRepository, PostingGuardRepository,
    SettlementRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
