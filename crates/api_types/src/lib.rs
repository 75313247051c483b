use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AccountView {
        pub id: Uuid,
        pub name: String,
        /// Current balance, 2 fractional digits.
        pub balance: Decimal,
    }
}

pub mod linked {
    use super::*;

    /// Request body of `POST /linked-txn`.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LinkedTransactionNew {
        pub parent_txn_id: Uuid,
        /// `refund`, `split`, `loan` or `batch`.
        #[serde(rename = "type")]
        pub kind: String,
        /// Required for refunds; must be > 0.
        pub amount: Option<Decimal>,
        pub person_id: Option<Uuid>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LinkedTransactionCreated {
        pub linked_txn_id: Uuid,
        pub related_txn_ids: Vec<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LinkedGroupView {
        pub id: Uuid,
        #[serde(rename = "type")]
        pub kind: String,
        pub master_txn_id: Uuid,
        pub related_txn_ids: Vec<Uuid>,
        pub status: String,
        pub notes: Option<String>,
    }
}

pub mod task {
    use super::*;

    /// Request body of `POST /transactions/tasks`.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionTaskNew {
        pub parent_txn_id: Uuid,
        /// `PARTIAL_REFUND`, `FULL_REFUND`, `CANCEL_ORDER`, `SPLIT_BILL` or `SETTLE_DEBT`.
        pub task_type: String,
        pub amount: Option<Decimal>,
        pub person_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionTaskCreated {
        pub created_txn_ids: Vec<Uuid>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
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

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionStatus {
        Active,
        Pending,
        Void,
        Canceled,
    }

    /// Request body of `POST /transactions`.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionNew {
        pub account_id: Uuid,
        pub kind: TransactionKind,
        /// Must be > 0. The kind defines the sign applied to the balance.
        pub amount: Decimal,
        /// RFC3339 timestamp, including timezone offset.
        pub occurred_at: DateTime<FixedOffset>,
        pub person_id: Option<Uuid>,
        pub category_id: Option<String>,
        pub subscription_member_id: Option<String>,
        pub fee: Option<Decimal>,
        pub notes: Option<String>,
        /// Cashback accrued by this transaction.
        pub cashback: Option<Decimal>,
        /// Debt booked against `person_id`.
        pub debt: Option<Decimal>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionView {
        pub id: Uuid,
        pub account_id: Uuid,
        pub person_id: Option<Uuid>,
        pub kind: TransactionKind,
        pub status: TransactionStatus,
        pub amount: Decimal,
        pub fee: Option<Decimal>,
        pub occurred_at: DateTime<Utc>,
        pub category_id: Option<String>,
        pub linked_group_id: Option<Uuid>,
        pub notes: Option<String>,
    }
}
