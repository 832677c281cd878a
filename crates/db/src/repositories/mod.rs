//! Repository abstractions for data access.
//!
//! Repositories load tenant state under an RLS transaction, delegate every
//! policy decision to `ledgerguard-core`, and apply the resulting writes.
//! Status changes use compare-and-set updates filtered on the expected
//! status; a lost race surfaces as `ConcurrentModification`.

pub mod guard;
pub mod lock;
pub mod override_log;
pub mod period;
pub mod settlement;

pub use guard::PostingGuardRepository;
pub use lock::LockRepository;
pub use override_log::OverrideLogRepository;
pub use period::PeriodRepository;
pub use settlement::SettlementRepository;
