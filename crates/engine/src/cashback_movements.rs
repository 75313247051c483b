//! Cashback accrued by individual transactions.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, util::parse_uuid};

/// Note written on a movement invalidated by a refund.
pub const REFUNDED_NOTE: &str = "Refunded transaction";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashbackStatus {
    Active,
    Invalidated,
}

impl CashbackStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Invalidated => "invalidated",
        }
    }
}

impl TryFrom<&str> for CashbackStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "invalidated" => Ok(Self::Invalidated),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid cashback status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashbackMovement {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub amount: MoneyCents,
    pub status: CashbackStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cashback_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub transaction_id: String,
    pub amount_minor: i64,
    pub status: String,
    pub note: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CashbackMovement> for ActiveModel {
    fn from(movement: &CashbackMovement) -> Self {
        Self {
            id: ActiveValue::Set(movement.id.to_string()),
            transaction_id: ActiveValue::Set(movement.transaction_id.to_string()),
            amount_minor: ActiveValue::Set(movement.amount.cents()),
            status: ActiveValue::Set(movement.status.as_str().to_string()),
            note: ActiveValue::Set(movement.note.clone()),
            created_at: ActiveValue::Set(movement.created_at),
            updated_at: ActiveValue::Set(movement.updated_at),
        }
    }
}

impl TryFrom<Model> for CashbackMovement {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let status = CashbackStatus::try_from(model.status.as_str()).map_err(|_| {
            EngineError::Consistency(format!("cashback movement {} has invalid status", model.id))
        })?;
        Ok(Self {
            id: parse_uuid(&model.id, "cashback movement")?,
            transaction_id: parse_uuid(&model.transaction_id, "transaction")?,
            amount: MoneyCents::new(model.amount_minor),
            status,
            note: model.note,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
