//! `SeaORM` Entity for the `accounting_periods` table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{PeriodStatus, PeriodType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounting_periods")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub period_type: PeriodType,
    pub period_start: Date,
    pub period_end: Date,
    pub status: PeriodStatus,
    pub closed_by: Option<Uuid>,
    pub closed_at: Option<DateTimeWithTimeZone>,
    pub closure_notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ledger_locks::Entity")]
    LedgerLocks,
}

impl Related<super::ledger_locks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerLocks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
