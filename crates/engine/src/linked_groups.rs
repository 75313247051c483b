//! Linked transaction groups.
//!
//! A group ties a master transaction to the transactions a workflow (refund,
//! split, ...) produced from it. The related ids are stored in creation order
//! as a JSON array.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

/// Workflow a group was created by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkedKind {
    Refund,
    Split,
    Loan,
    Batch,
    Settle,
    CancelOrder,
    Adjustment,
}

impl LinkedKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Refund => "refund",
            Self::Split => "split",
            Self::Loan => "loan",
            Self::Batch => "batch",
            Self::Settle => "settle",
            Self::CancelOrder => "cancel_order",
            Self::Adjustment => "adjustment",
        }
    }
}

impl TryFrom<&str> for LinkedKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "refund" => Ok(Self::Refund),
            "split" => Ok(Self::Split),
            "loan" => Ok(Self::Loan),
            "batch" => Ok(Self::Batch),
            "settle" => Ok(Self::Settle),
            "cancel_order" => Ok(Self::CancelOrder),
            "adjustment" => Ok(Self::Adjustment),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid linked group kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupStatus {
    Active,
    Pending,
    Settled,
    Void,
}

impl GroupStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Settled => "settled",
            Self::Void => "void",
        }
    }

    /// Settled and void groups are immutable.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Settled | Self::Void)
    }
}

impl TryFrom<&str> for GroupStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "pending" => Ok(Self::Pending),
            "settled" => Ok(Self::Settled),
            "void" => Ok(Self::Void),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid linked group status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedGroup {
    pub id: Uuid,
    pub kind: LinkedKind,
    pub master_transaction_id: Uuid,
    pub related_transaction_ids: Vec<Uuid>,
    pub status: GroupStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkedGroup {
    pub fn new(
        kind: LinkedKind,
        master_transaction_id: Uuid,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            master_transaction_id,
            related_transaction_ids: Vec::new(),
            status: GroupStatus::Active,
            notes,
            created_at: now,
            updated_at: now,
        }
    }
}

pub(crate) fn encode_related_ids(ids: &[Uuid]) -> ResultEngine<String> {
    serde_json::to_string(ids)
        .map_err(|err| EngineError::Consistency(format!("cannot encode related ids: {err}")))
}

fn decode_related_ids(group_id: &str, raw: &str) -> ResultEngine<Vec<Uuid>> {
    serde_json::from_str(raw).map_err(|err| {
        EngineError::Consistency(format!(
            "linked group {group_id} has invalid related ids: {err}"
        ))
    })
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "linked_groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: String,
    pub master_transaction_id: String,
    #[sea_orm(column_type = "Text")]
    pub related_transaction_ids: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::MasterTransactionId",
        to = "super::transactions::Column::Id"
    )]
    MasterTransaction,
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&LinkedGroup> for ActiveModel {
    type Error = EngineError;

    fn try_from(group: &LinkedGroup) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(group.id.to_string()),
            kind: ActiveValue::Set(group.kind.as_str().to_string()),
            master_transaction_id: ActiveValue::Set(group.master_transaction_id.to_string()),
            related_transaction_ids: ActiveValue::Set(encode_related_ids(
                &group.related_transaction_ids,
            )?),
            status: ActiveValue::Set(group.status.as_str().to_string()),
            notes: ActiveValue::Set(group.notes.clone()),
            created_at: ActiveValue::Set(group.created_at),
            updated_at: ActiveValue::Set(group.updated_at),
        })
    }
}

impl TryFrom<Model> for LinkedGroup {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let corrupt = |field: &str| {
            EngineError::Consistency(format!("linked group {} has invalid {field}", model.id))
        };
        Ok(Self {
            id: parse_uuid(&model.id, "linked group")?,
            kind: LinkedKind::try_from(model.kind.as_str()).map_err(|_| corrupt("kind"))?,
            master_transaction_id: parse_uuid(&model.master_transaction_id, "transaction")?,
            related_transaction_ids: decode_related_ids(
                &model.id,
                &model.related_transaction_ids,
            )?,
            status: GroupStatus::try_from(model.status.as_str()).map_err(|_| corrupt("status"))?,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
