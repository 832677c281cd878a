//! Ledger lock management.
//!
//! Locks block postings and reversals over a date range independently of
//! period status. Period locks are derived from hard-closed periods and are
//! never operator-managed; audit and reconciliation locks are applied and
//! released by operators.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::LockError;
pub use service::LockService;
pub use types::{LedgerLock, LockCheck, LockStatus, LockType};
