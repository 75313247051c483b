//! Monthly cashback aggregates, one row per (account, cycle).

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CycleTag, EngineError, MoneyCents, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashbackLedger {
    pub id: Uuid,
    pub account_id: Uuid,
    pub cycle: CycleTag,
    pub total_cashback: MoneyCents,
    pub remaining_budget: MoneyCents,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cashback_ledgers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_id: String,
    pub cycle_tag: String,
    pub total_cashback_minor: i64,
    pub remaining_budget_minor: i64,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for CashbackLedger {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let cycle = model.cycle_tag.parse().map_err(|_| {
            EngineError::Consistency(format!("cashback ledger {} has invalid cycle", model.id))
        })?;
        Ok(Self {
            id: parse_uuid(&model.id, "cashback ledger")?,
            account_id: parse_uuid(&model.account_id, "account")?,
            cycle,
            total_cashback: MoneyCents::new(model.total_cashback_minor),
            remaining_budget: MoneyCents::new(model.remaining_budget_minor),
            updated_at: model.updated_at,
        })
    }
}
