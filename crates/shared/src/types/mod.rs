//! Shared domain types.

pub mod id;

pub use id::{LockId, OverrideLogId, PeriodId, SettlementId, TenantId, UserId};
