//! `SeaORM` Entity for the `ledger_locks` table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{LockStatus, LockType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_locks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub lock_type: LockType,
    pub lock_start_date: Date,
    pub lock_end_date: Date,
    pub lock_status: LockStatus,
    pub reason: String,
    pub reference_number: Option<String>,
    pub accounting_period_id: Option<Uuid>,
    pub locked_by: Uuid,
    pub locked_at: DateTimeWithTimeZone,
    pub released_by: Option<Uuid>,
    pub released_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounting_periods::Entity",
        from = "Column::AccountingPeriodId",
        to = "super::accounting_periods::Column::Id"
    )]
    AccountingPeriods,
}

impl Related<super::accounting_periods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountingPeriods.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
