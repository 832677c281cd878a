//! Override audit domain types.

use chrono::{DateTime, Utc};
use ledgerguard_shared::types::{OverrideLogId, TenantId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::audit::error::AuditError;

/// Minimum accepted justification length, after trimming.
pub const MIN_JUSTIFICATION_LEN: usize = 10;

/// Kind of privileged exception being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideType {
    /// Posting into a soft-closed accounting period.
    SoftClosedPosting,
    /// Early release of an audit or reconciliation lock.
    LockRelease,
}

impl OverrideType {
    /// Returns the string representation of the override type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SoftClosedPosting => "soft_closed_posting",
            Self::LockRelease => "lock_release",
        }
    }

    /// Parses an override type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "soft_closed_posting" => Some(Self::SoftClosedPosting),
            "lock_release" => Some(Self::LockRelease),
            _ => None,
        }
    }
}

impl fmt::Display for OverrideType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User role for override privilege checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Read-only access.
    Viewer,
    /// Day-to-day ledger operations, no override privileges.
    Operator,
    /// Full privileges including period close and overrides.
    FinanceAdmin,
}

impl UserRole {
    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Operator => "operator",
            Self::FinanceAdmin => "finance_admin",
        }
    }

    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "viewer" => Some(Self::Viewer),
            "operator" => Some(Self::Operator),
            "finance_admin" => Some(Self::FinanceAdmin),
            _ => None,
        }
    }

    /// Returns true if this role may authorize overrides.
    #[must_use]
    pub fn can_override(&self) -> bool {
        matches!(self, Self::FinanceAdmin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable record of one privileged exception.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideLogEntry {
    /// Unique identifier.
    pub id: OverrideLogId,
    /// Tenant the override happened in.
    pub tenant_id: TenantId,
    /// Kind of exception.
    pub override_type: OverrideType,
    /// Why the override was necessary.
    pub justification: String,
    /// Kind of entity the override acted on, e.g. "accounting_period".
    pub entity_type: String,
    /// The entity the override acted on.
    pub entity_id: Uuid,
    /// Further entities affected, such as the posted journal entries.
    pub affected_entities: Vec<Uuid>,
    /// Who performed the override.
    pub override_by: UserId,
    /// The performer's role at the time.
    pub override_by_role: UserRole,
    /// Second approver, when dual control applies.
    pub approved_by: Option<UserId>,
    /// When the override was recorded.
    pub created_at: DateTime<Utc>,
}

impl OverrideLogEntry {
    /// Builds a new entry after validating the justification.
    ///
    /// # Errors
    /// * `AuditError::JustificationTooShort` if the trimmed justification is
    ///   shorter than `MIN_JUSTIFICATION_LEN`
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tenant_id: TenantId,
        override_type: OverrideType,
        justification: &str,
        entity_type: &str,
        entity_id: Uuid,
        override_by: UserId,
        override_by_role: UserRole,
        approved_by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<Self, AuditError> {
        let justification = validate_justification(justification)?;
        Ok(Self {
            id: OverrideLogId::new(),
            tenant_id,
            override_type,
            justification,
            entity_type: entity_type.to_string(),
            entity_id,
            affected_entities: Vec::new(),
            override_by,
            override_by_role,
            approved_by,
            created_at: now,
        })
    }
}

/// Validates and normalizes an override justification.
///
/// # Errors
/// * `AuditError::JustificationTooShort` if the trimmed text is shorter
///   than `MIN_JUSTIFICATION_LEN`
pub fn validate_justification(justification: &str) -> Result<String, AuditError> {
    let trimmed = justification.trim();
    if trimmed.chars().count() < MIN_JUSTIFICATION_LEN {
        return Err(AuditError::JustificationTooShort);
    }
    Ok(trimmed.to_string())
}
