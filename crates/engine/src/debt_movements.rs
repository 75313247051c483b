//! Debt events recorded against a person.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CycleTag, EngineError, MoneyCents, util::parse_uuid};

/// A debt movement keeps the cycle it was booked in; reversals adjust that
/// cycle even when it differs from the transaction's own month.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtMovement {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub person_id: Uuid,
    pub amount: MoneyCents,
    pub cycle: CycleTag,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "debt_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub transaction_id: String,
    pub person_id: String,
    pub amount_minor: i64,
    pub cycle_tag: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&DebtMovement> for ActiveModel {
    fn from(movement: &DebtMovement) -> Self {
        Self {
            id: ActiveValue::Set(movement.id.to_string()),
            transaction_id: ActiveValue::Set(movement.transaction_id.to_string()),
            person_id: ActiveValue::Set(movement.person_id.to_string()),
            amount_minor: ActiveValue::Set(movement.amount.cents()),
            cycle_tag: ActiveValue::Set(movement.cycle.to_string()),
            created_at: ActiveValue::Set(movement.created_at),
            updated_at: ActiveValue::Set(movement.updated_at),
        }
    }
}

impl TryFrom<Model> for DebtMovement {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let cycle = model.cycle_tag.parse().map_err(|_| {
            EngineError::Consistency(format!("debt movement {} has invalid cycle", model.id))
        })?;
        Ok(Self {
            id: parse_uuid(&model.id, "debt movement")?,
            transaction_id: parse_uuid(&model.transaction_id, "transaction")?,
            person_id: parse_uuid(&model.person_id, "person")?,
            amount: MoneyCents::new(model.amount_minor),
            cycle,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
