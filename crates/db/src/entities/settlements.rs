//! `SeaORM` Entity for the `settlements` table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::SettlementStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "settlements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub settlement_ref: String,
    pub merchant_id: Uuid,
    pub net_amount: Decimal,
    pub status: SettlementStatus,
    pub retry_count: i32,
    pub max_retries: i32,
    pub next_retry_at: Option<DateTimeWithTimeZone>,
    pub last_retry_at: Option<DateTimeWithTimeZone>,
    pub failure_reason: Option<String>,
    pub utr_number: Option<String>,
    pub bank_reference_number: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::settlement_transitions::Entity")]
    SettlementTransitions,
}

impl Related<super::settlement_transitions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SettlementTransitions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
