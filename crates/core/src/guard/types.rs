//! Posting guard types.

use ledgerguard_shared::types::{PeriodId, UserId};
use serde::{Deserialize, Serialize};

use crate::audit::types::{OverrideLogEntry, UserRole};

/// A caller's request to override soft-close posting rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideRequest {
    /// Why the posting must land in a soft-closed period.
    pub justification: String,
    /// The caller's role; only finance admins may override.
    pub role: UserRole,
    /// Second approver, when dual control applies.
    pub approved_by: Option<UserId>,
}

/// A granted posting authorization.
///
/// When the posting used an override, `override_entry` carries the audit
/// record; the repository must persist it in the same transaction as the
/// posting itself.
#[derive(Debug, Clone)]
pub struct PostingAuthorization {
    /// The period the transaction date falls in.
    pub period_id: PeriodId,
    /// Audit entry to co-commit with the posting, if an override was used.
    pub override_entry: Option<OverrideLogEntry>,
}

impl PostingAuthorization {
    /// Returns true if this authorization required an override.
    #[must_use]
    pub fn used_override(&self) -> bool {
        self.override_entry.is_some()
    }
}
