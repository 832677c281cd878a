//! `SeaORM` entity definitions for the control-plane tables.

pub mod accounting_periods;
pub mod ledger_locks;
pub mod override_log;
pub mod sea_orm_active_enums;
pub mod settlement_transitions;
pub mod settlements;
