//! Settlement lifecycle management.
//!
//! Tracks a payout batch from creation to bank-confirmed finality with
//! bounded retries. The transition table is closed: every mutation goes
//! through the state machine, and BankConfirmed is the finality gate.
//!
//! # Modules
//!
//! - `types` - Settlement domain types (Settlement, SettlementStatus, SettlementAction)
//! - `error` - Settlement-specific error types
//! - `machine` - State transition logic
//! - `retry` - Retry backoff policy and the retry queue contract

pub mod error;
pub mod machine;
pub mod retry;
pub mod types;

#[cfg(test)]
mod machine_props;

pub use error::SettlementError;
pub use machine::SettlementMachine;
pub use retry::{RetryPolicy, due_for_retry};
pub use types::{Settlement, SettlementAction, SettlementStatus, StateTransition};
