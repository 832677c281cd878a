//! `SeaORM` active enums mirroring the `PostgreSQL` enum types.
//!
//! Each database enum has a matching domain enum in `ledgerguard-core`; the
//! `From` impls here keep the mapping in one place.

use ledgerguard_core::audit::types as audit;
use ledgerguard_core::lock::types as lock;
use ledgerguard_core::period::types as period;
use ledgerguard_core::settlement::types as settlement;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Accounting period status (`period_status`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "period_status")]
pub enum PeriodStatus {
    /// Posting allowed.
    #[sea_orm(string_value = "open")]
    Open,
    /// Posting requires an admin override.
    #[sea_orm(string_value = "soft_closed")]
    SoftClosed,
    /// Immutable.
    #[sea_orm(string_value = "hard_closed")]
    HardClosed,
}

/// Accounting period granularity (`period_type`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "period_type")]
pub enum PeriodType {
    /// One calendar day.
    #[sea_orm(string_value = "daily")]
    Daily,
    /// One calendar month.
    #[sea_orm(string_value = "monthly")]
    Monthly,
}

/// Ledger lock kind (`lock_type`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "lock_type")]
pub enum LockType {
    /// Created by hard-closing a period.
    #[sea_orm(string_value = "period_lock")]
    PeriodLock,
    /// Applied for an external audit.
    #[sea_orm(string_value = "audit_lock")]
    AuditLock,
    /// Applied during reconciliation.
    #[sea_orm(string_value = "reconciliation_lock")]
    ReconciliationLock,
}

/// Ledger lock status (`lock_status`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "lock_status")]
pub enum LockStatus {
    /// Blocking postings.
    #[sea_orm(string_value = "active")]
    Active,
    /// No longer blocking.
    #[sea_orm(string_value = "released")]
    Released,
}

/// Settlement status (`settlement_status`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "settlement_status")]
pub enum SettlementStatus {
    /// Created by a batch job.
    #[sea_orm(string_value = "created")]
    Created,
    /// Funds reserved.
    #[sea_orm(string_value = "funds_reserved")]
    FundsReserved,
    /// Instruction sent to the bank.
    #[sea_orm(string_value = "sent_to_bank")]
    SentToBank,
    /// Bank confirmed; finality point.
    #[sea_orm(string_value = "bank_confirmed")]
    BankConfirmed,
    /// Settled and immutable.
    #[sea_orm(string_value = "settled")]
    Settled,
    /// A step failed.
    #[sea_orm(string_value = "failed")]
    Failed,
    /// Another attempt scheduled.
    #[sea_orm(string_value = "retried")]
    Retried,
}

/// Override kind (`override_type`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "override_type")]
pub enum OverrideType {
    /// Posting into a soft-closed period.
    #[sea_orm(string_value = "soft_closed_posting")]
    SoftClosedPosting,
    /// Early lock release.
    #[sea_orm(string_value = "lock_release")]
    LockRelease,
}

/// User role (`user_role`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
pub enum UserRole {
    /// Read-only.
    #[sea_orm(string_value = "viewer")]
    Viewer,
    /// Day-to-day operations.
    #[sea_orm(string_value = "operator")]
    Operator,
    /// Full privileges including overrides.
    #[sea_orm(string_value = "finance_admin")]
    FinanceAdmin,
}

impl From<period::PeriodStatus> for PeriodStatus {
    fn from(status: period::PeriodStatus) -> Self {
        match status {
            period::PeriodStatus::Open => Self::Open,
            period::PeriodStatus::SoftClosed => Self::SoftClosed,
            period::PeriodStatus::HardClosed => Self::HardClosed,
        }
    }
}

impl From<PeriodStatus> for period::PeriodStatus {
    fn from(status: PeriodStatus) -> Self {
        match status {
            PeriodStatus::Open => Self::Open,
            PeriodStatus::SoftClosed => Self::SoftClosed,
            PeriodStatus::HardClosed => Self::HardClosed,
        }
    }
}

impl From<period::PeriodType> for PeriodType {
    fn from(period_type: period::PeriodType) -> Self {
        match period_type {
            period::PeriodType::Daily => Self::Daily,
            period::PeriodType::Monthly => Self::Monthly,
        }
    }
}

impl From<PeriodType> for period::PeriodType {
    fn from(period_type: PeriodType) -> Self {
        match period_type {
            PeriodType::Daily => Self::Daily,
            PeriodType::Monthly => Self::Monthly,
        }
    }
}

impl From<lock::LockType> for LockType {
    fn from(lock_type: lock::LockType) -> Self {
        match lock_type {
            lock::LockType::PeriodLock => Self::PeriodLock,
            lock::LockType::AuditLock => Self::AuditLock,
            lock::LockType::ReconciliationLock => Self::ReconciliationLock,
        }
    }
}

impl From<LockType> for lock::LockType {
    fn from(lock_type: LockType) -> Self {
        match lock_type {
            LockType::PeriodLock => Self::PeriodLock,
            LockType::AuditLock => Self::AuditLock,
            LockType::ReconciliationLock => Self::ReconciliationLock,
        }
    }
}

impl From<lock::LockStatus> for LockStatus {
    fn from(status: lock::LockStatus) -> Self {
        match status {
            lock::LockStatus::Active => Self::Active,
            lock::LockStatus::Released => Self::Released,
        }
    }
}

impl From<LockStatus> for lock::LockStatus {
    fn from(status: LockStatus) -> Self {
        match status {
            LockStatus::Active => Self::Active,
            LockStatus::Released => Self::Released,
        }
    }
}

impl From<settlement::SettlementStatus> for SettlementStatus {
    fn from(status: settlement::SettlementStatus) -> Self {
        match status {
            settlement::SettlementStatus::Created => Self::Created,
            settlement::SettlementStatus::FundsReserved => Self::FundsReserved,
            settlement::SettlementStatus::SentToBank => Self::SentToBank,
            settlement::SettlementStatus::BankConfirmed => Self::BankConfirmed,
            settlement::SettlementStatus::Settled => Self::Settled,
            settlement::SettlementStatus::Failed => Self::Failed,
            settlement::SettlementStatus::Retried => Self::Retried,
        }
    }
}

impl From<SettlementStatus> for settlement::SettlementStatus {
    fn from(status: SettlementStatus) -> Self {
        match status {
            SettlementStatus::Created => Self::Created,
            SettlementStatus::FundsReserved => Self::FundsReserved,
            SettlementStatus::SentToBank => Self::SentToBank,
            SettlementStatus::BankConfirmed => Self::BankConfirmed,
            SettlementStatus::Settled => Self::Settled,
            SettlementStatus::Failed => Self::Failed,
            SettlementStatus::Retried => Self::Retried,
        }
    }
}

impl From<audit::OverrideType> for OverrideType {
    fn from(override_type: audit::OverrideType) -> Self {
        match override_type {
            audit::OverrideType::SoftClosedPosting => Self::SoftClosedPosting,
            audit::OverrideType::LockRelease => Self::LockRelease,
        }
    }
}

impl From<OverrideType> for audit::OverrideType {
    fn from(override_type: OverrideType) -> Self {
        match override_type {
            OverrideType::SoftClosedPosting => Self::SoftClosedPosting,
            OverrideType::LockRelease => Self::LockRelease,
        }
    }
}

impl From<audit::UserRole> for UserRole {
    fn from(role: audit::UserRole) -> Self {
        match role {
            audit::UserRole::Viewer => Self::Viewer,
            audit::UserRole::Operator => Self::Operator,
            audit::UserRole::FinanceAdmin => Self::FinanceAdmin,
        }
    }
}

impl From<UserRole> for audit::UserRole {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Viewer => Self::Viewer,
            UserRole::Operator => Self::Operator,
            UserRole::FinanceAdmin => Self::FinanceAdmin,
        }
    }
}
