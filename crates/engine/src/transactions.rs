//! Transaction primitives.
//!
//! A `Transaction` is a financial event recorded against an account. It is
//! never physically deleted: refunds and cancellations only move its status
//! forward.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Expense,
    Income,
    Debt,
    Repayment,
    Cashback,
    Subscription,
    Import,
    Adjustment,
}

/// Direction in which a transaction moves its account balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BalanceFlow {
    Inflow,
    Outflow,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
            Self::Debt => "debt",
            Self::Repayment => "repayment",
            Self::Cashback => "cashback",
            Self::Subscription => "subscription",
            Self::Import => "import",
            Self::Adjustment => "adjustment",
        }
    }

    /// Money leaving the account (expenses, money lent, subscriptions) is an
    /// outflow; everything else adds to the balance.
    pub fn flow(self) -> BalanceFlow {
        match self {
            Self::Expense | Self::Debt | Self::Subscription => BalanceFlow::Outflow,
            Self::Income | Self::Repayment | Self::Cashback | Self::Import | Self::Adjustment => {
                BalanceFlow::Inflow
            }
        }
    }

    /// Kind of the transaction that reverses this one, on the expense/income axis.
    pub fn reversal(self) -> TransactionKind {
        match self.flow() {
            BalanceFlow::Outflow => Self::Income,
            BalanceFlow::Inflow => Self::Expense,
        }
    }

    /// Balance delta produced by a transaction of this kind.
    pub fn signed(self, amount: MoneyCents) -> MoneyCents {
        match self.flow() {
            BalanceFlow::Inflow => amount,
            BalanceFlow::Outflow => -amount,
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            "debt" => Ok(Self::Debt),
            "repayment" => Ok(Self::Repayment),
            "cashback" => Ok(Self::Cashback),
            "subscription" => Ok(Self::Subscription),
            "import" => Ok(Self::Import),
            "adjustment" => Ok(Self::Adjustment),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Active,
    Pending,
    Void,
    Canceled,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Void => "void",
            Self::Canceled => "canceled",
        }
    }

    /// `Active` and `Pending` may still move forward; `Void` and `Canceled` are final.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Active | Self::Pending)
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "pending" => Ok(Self::Pending),
            "void" => Ok(Self::Void),
            "canceled" => Ok(Self::Canceled),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid transaction status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub person_id: Option<Uuid>,
    pub kind: TransactionKind,
    pub category_id: Option<String>,
    pub subscription_member_id: Option<String>,
    pub linked_group_id: Option<Uuid>,
    pub status: TransactionStatus,
    pub amount: MoneyCents,
    pub fee: Option<MoneyCents>,
    pub occurred_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Builds a new active transaction, rejecting non-positive amounts.
    pub fn new(
        account_id: Uuid,
        kind: TransactionKind,
        amount: MoneyCents,
        occurred_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidArgument(
                "amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            account_id,
            person_id: None,
            kind,
            category_id: None,
            subscription_member_id: None,
            linked_group_id: None,
            status: TransactionStatus::Active,
            amount,
            fee: None,
            occurred_at,
            notes: None,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_id: String,
    pub person_id: Option<String>,
    pub kind: String,
    pub category_id: Option<String>,
    pub subscription_member_id: Option<String>,
    pub linked_group_id: Option<String>,
    pub status: String,
    pub amount_minor: i64,
    pub fee_minor: Option<i64>,
    pub occurred_at: DateTimeUtc,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            account_id: ActiveValue::Set(tx.account_id.to_string()),
            person_id: ActiveValue::Set(tx.person_id.map(|id| id.to_string())),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            category_id: ActiveValue::Set(tx.category_id.clone()),
            subscription_member_id: ActiveValue::Set(tx.subscription_member_id.clone()),
            linked_group_id: ActiveValue::Set(tx.linked_group_id.map(|id| id.to_string())),
            status: ActiveValue::Set(tx.status.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            fee_minor: ActiveValue::Set(tx.fee.map(MoneyCents::cents)),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            notes: ActiveValue::Set(tx.notes.clone()),
            created_at: ActiveValue::Set(tx.created_at),
            updated_at: ActiveValue::Set(tx.updated_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let corrupt = |field: &str| {
            EngineError::Consistency(format!("transaction {} has invalid {field}", model.id))
        };
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            account_id: parse_uuid(&model.account_id, "account")?,
            person_id: model
                .person_id
                .as_deref()
                .map(|id| parse_uuid(id, "person"))
                .transpose()?,
            kind: TransactionKind::try_from(model.kind.as_str()).map_err(|_| corrupt("kind"))?,
            category_id: model.category_id,
            subscription_member_id: model.subscription_member_id,
            linked_group_id: model
                .linked_group_id
                .as_deref()
                .map(|id| parse_uuid(id, "linked group"))
                .transpose()?,
            status: TransactionStatus::try_from(model.status.as_str())
                .map_err(|_| corrupt("status"))?,
            amount: MoneyCents::new(model.amount_minor),
            fee: model.fee_minor.map(MoneyCents::new),
            occurred_at: model.occurred_at,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outflows_reverse_as_income() {
        for kind in [
            TransactionKind::Expense,
            TransactionKind::Debt,
            TransactionKind::Subscription,
        ] {
            assert_eq!(kind.reversal(), TransactionKind::Income, "{kind:?}");
        }
    }

    #[test]
    fn inflows_reverse_as_expense() {
        for kind in [
            TransactionKind::Income,
            TransactionKind::Repayment,
            TransactionKind::Cashback,
            TransactionKind::Import,
            TransactionKind::Adjustment,
        ] {
            assert_eq!(kind.reversal(), TransactionKind::Expense, "{kind:?}");
        }
    }

    #[test]
    fn signed_amount_follows_flow() {
        let amount = MoneyCents::new(250);
        assert_eq!(TransactionKind::Expense.signed(amount), MoneyCents::new(-250));
        assert_eq!(TransactionKind::Income.signed(amount), MoneyCents::new(250));
    }

    #[test]
    fn kind_and_status_strings_round_trip() {
        for kind in [
            TransactionKind::Expense,
            TransactionKind::Income,
            TransactionKind::Debt,
            TransactionKind::Repayment,
            TransactionKind::Cashback,
            TransactionKind::Subscription,
            TransactionKind::Import,
            TransactionKind::Adjustment,
        ] {
            assert_eq!(TransactionKind::try_from(kind.as_str()).unwrap(), kind);
        }
        assert!(TransactionKind::try_from("transfer").is_err());
        assert!(TransactionStatus::try_from("done").is_err());
        assert!(TransactionStatus::Pending.is_open());
        assert!(!TransactionStatus::Canceled.is_open());
    }

    #[test]
    fn snapshot_serializes_amounts_as_cents() {
        let now = Utc::now();
        let mut tx = Transaction::new(
            Uuid::new_v4(),
            TransactionKind::Expense,
            MoneyCents::new(10_050),
            now,
            now,
        )
        .unwrap();
        tx.fee = Some(MoneyCents::new(25));
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["amount"], 10_050);
        assert_eq!(value["fee"], 25);

        let back: Transaction = serde_json::from_value(value).unwrap();
        assert_eq!(back, tx);
    }

    #[test]
    fn new_rejects_non_positive_amount() {
        let now = Utc::now();
        let err = Transaction::new(
            Uuid::new_v4(),
            TransactionKind::Expense,
            MoneyCents::ZERO,
            now,
            now,
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidArgument("amount must be > 0".to_string())
        );
    }
}
