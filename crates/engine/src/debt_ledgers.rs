//! Monthly debt aggregates, one row per (person, cycle).

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CycleTag, EngineError, MoneyCents, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtLedger {
    pub id: Uuid,
    pub person_id: Uuid,
    pub cycle: CycleTag,
    pub new_debt: MoneyCents,
    pub net_debt: MoneyCents,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "debt_ledgers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub person_id: String,
    pub cycle_tag: String,
    pub new_debt_minor: i64,
    pub net_debt_minor: i64,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for DebtLedger {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let cycle = model.cycle_tag.parse().map_err(|_| {
            EngineError::Consistency(format!("debt ledger {} has invalid cycle", model.id))
        })?;
        Ok(Self {
            id: parse_uuid(&model.id, "debt ledger")?,
            person_id: parse_uuid(&model.person_id, "person")?,
            cycle,
            new_debt: MoneyCents::new(model.new_debt_minor),
            net_debt: MoneyCents::new(model.net_debt_minor),
            updated_at: model.updated_at,
        })
    }
}
