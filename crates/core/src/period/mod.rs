//! Accounting period lifecycle management.
//!
//! Periods bound the time windows in which ledger postings are permitted.
//! The lifecycle is strictly forward: Open -> SoftClosed -> HardClosed.
//! HardClosed is terminal; there is no reopen path.
//!
//! # Modules
//!
//! - `types` - Period domain types (AccountingPeriod, PeriodStatus, PostingCheck)
//! - `error` - Period-specific error types
//! - `service` - Creation validation, close transitions, posting decision table

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::PeriodError;
pub use service::{PeriodService, date_ranges_overlap};
pub use types::{AccountingPeriod, PeriodStatus, PeriodType, PostingCheck};
