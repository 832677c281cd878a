//! Override audit trail.
//!
//! Every privileged exception to the posting rules produces an immutable
//! override log entry recording who, what, and why. Entries are written in
//! the same transaction as the action they justify; a failed audit write
//! fails the action.

pub mod error;
pub mod types;

pub use error::AuditError;
pub use types::{
    MIN_JUSTIFICATION_LEN, OverrideLogEntry, OverrideType, UserRole, validate_justification,
};
