//! Posting guard.
//!
//! The single decision point every journal posting passes through. It
//! composes the lock check, the period lifecycle rules, and the override
//! audit requirements into one fail-closed authorization.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::GuardError;
pub use service::PostingGuard;
pub use types::{OverrideRequest, PostingAuthorization};
