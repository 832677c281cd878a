//! Core policy logic for LedgerGuard.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! It decides WHETHER a ledger posting or settlement transition is allowed;
//! it never computes ledger entries and never touches storage itself.
//!
//! # Modules
//!
//! - `period` - Accounting period lifecycle (open, soft close, hard close)
//! - `lock` - Ledger locks (period, audit, reconciliation)
//! - `settlement` - Settlement state machine and retry scheduling
//! - `audit` - Override audit log entries and justification rules
//! - `guard` - The posting guard composing period, lock, and override checks

pub mod audit;
pub mod guard;
pub mod lock;
pub mod period;
pub mod settlement;
