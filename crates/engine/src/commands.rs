//! Command structs for engine operations.
//!
//! These types group parameters for write operations (recording a transaction,
//! running a linked workflow), keeping call sites readable and avoiding long
//! argument lists.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    EngineError, LinkedKind, MoneyCents, ResultEngine, TransactionKind,
    util::normalize_optional_text,
};

/// Raw parameters shared by every workflow request, as received from callers.
#[derive(Clone, Debug, Default)]
pub struct WorkflowArgs {
    pub amount: Option<Decimal>,
    pub person_id: Option<Uuid>,
    pub notes: Option<String>,
}

impl WorkflowArgs {
    #[must_use]
    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn person_id(mut self, person_id: Uuid) -> Self {
        self.person_id = Some(person_id);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefundAmount {
    Exact(MoneyCents),
    /// Refund whatever the parent transaction amounts to.
    Full,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefundParams {
    pub amount: RefundAmount,
    pub person_id: Option<Uuid>,
    pub notes: Option<String>,
}

impl RefundParams {
    fn exact(args: WorkflowArgs) -> ResultEngine<Self> {
        let amount = args.amount.ok_or_else(|| {
            EngineError::InvalidArgument("amount is required for refund".to_string())
        })?;
        Ok(Self {
            amount: RefundAmount::Exact(MoneyCents::positive(amount, "amount")?),
            person_id: args.person_id,
            notes: normalize_optional_text(args.notes.as_deref()),
        })
    }

    fn full(args: WorkflowArgs) -> ResultEngine<Self> {
        let amount = match args.amount {
            Some(amount) => RefundAmount::Exact(MoneyCents::positive(amount, "amount")?),
            None => RefundAmount::Full,
        };
        Ok(Self {
            amount,
            person_id: args.person_id,
            notes: normalize_optional_text(args.notes.as_deref()),
        })
    }
}

/// Closed set of linked-transaction workflows.
///
/// Only `Refund` has a handler; the other variants are recognized and fail
/// with [`EngineError::NotImplemented`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Workflow {
    Refund(RefundParams),
    Split,
    Loan,
    Batch,
    Settle,
    CancelOrder,
}

impl Workflow {
    /// Parses the `type` of a linked-transaction request
    /// (`refund`, `split`, `loan`, `batch`).
    pub fn from_linked_type(kind: &str, args: WorkflowArgs) -> ResultEngine<Self> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "refund" => Ok(Self::Refund(RefundParams::exact(args)?)),
            "split" => Ok(Self::Split),
            "loan" => Ok(Self::Loan),
            "batch" => Ok(Self::Batch),
            _ => Err(unsupported(kind)),
        }
    }

    /// Parses the `taskType` of a transaction task request.
    pub fn from_task_type(task: &str, args: WorkflowArgs) -> ResultEngine<Self> {
        match task.trim().to_ascii_uppercase().as_str() {
            "PARTIAL_REFUND" => Ok(Self::Refund(RefundParams::exact(args)?)),
            "FULL_REFUND" => Ok(Self::Refund(RefundParams::full(args)?)),
            "CANCEL_ORDER" => Ok(Self::CancelOrder),
            "SPLIT_BILL" => Ok(Self::Split),
            "SETTLE_DEBT" => Ok(Self::Settle),
            _ => Err(unsupported(task)),
        }
    }

    /// Group kind persisted for this workflow.
    pub fn kind(&self) -> LinkedKind {
        match self {
            Self::Refund(_) => LinkedKind::Refund,
            Self::Split => LinkedKind::Split,
            Self::Loan => LinkedKind::Loan,
            Self::Batch => LinkedKind::Batch,
            Self::Settle => LinkedKind::Settle,
            Self::CancelOrder => LinkedKind::CancelOrder,
        }
    }

    fn notes(&self) -> Option<String> {
        match self {
            Self::Refund(params) => params.notes.clone(),
            _ => None,
        }
    }
}

fn unsupported(kind: &str) -> EngineError {
    EngineError::InvalidArgument(format!("unsupported workflow type: {kind}"))
}

/// Run a workflow against an existing parent transaction.
#[derive(Clone, Debug)]
pub struct LinkedTransactionCmd {
    pub parent_id: Uuid,
    pub workflow: Workflow,
}

impl LinkedTransactionCmd {
    #[must_use]
    pub fn new(parent_id: Uuid, workflow: Workflow) -> Self {
        Self {
            parent_id,
            workflow,
        }
    }

    pub(crate) fn group_notes(&self) -> Option<String> {
        self.workflow.notes()
    }
}

/// Result of a committed workflow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkedOutcome {
    pub group_id: Uuid,
    /// Transactions created by the workflow, in creation order.
    pub created_transaction_ids: Vec<Uuid>,
}

/// Record a new transaction, optionally with its cashback and debt movements.
#[derive(Clone, Debug)]
pub struct RecordTransactionCmd {
    pub account_id: Uuid,
    pub kind: TransactionKind,
    pub amount: MoneyCents,
    pub occurred_at: DateTime<Utc>,
    pub person_id: Option<Uuid>,
    pub category_id: Option<String>,
    pub subscription_member_id: Option<String>,
    pub fee: Option<MoneyCents>,
    pub notes: Option<String>,
    pub cashback: Option<MoneyCents>,
    pub debt: Option<MoneyCents>,
}

impl RecordTransactionCmd {
    #[must_use]
    pub fn new(
        account_id: Uuid,
        kind: TransactionKind,
        amount: MoneyCents,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            account_id,
            kind,
            amount,
            occurred_at,
            person_id: None,
            category_id: None,
            subscription_member_id: None,
            fee: None,
            notes: None,
            cashback: None,
            debt: None,
        }
    }

    #[must_use]
    pub fn person_id(mut self, person_id: Uuid) -> Self {
        self.person_id = Some(person_id);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    #[must_use]
    pub fn subscription_member_id(mut self, member_id: impl Into<String>) -> Self {
        self.subscription_member_id = Some(member_id.into());
        self
    }

    #[must_use]
    pub fn fee(mut self, fee: MoneyCents) -> Self {
        self.fee = Some(fee);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Cashback accrued by this transaction.
    #[must_use]
    pub fn cashback(mut self, amount: MoneyCents) -> Self {
        self.cashback = Some(amount);
        self
    }

    /// Debt booked against the transaction's person.
    #[must_use]
    pub fn debt(mut self, amount: MoneyCents) -> Self {
        self.debt = Some(amount);
        self
    }
}
