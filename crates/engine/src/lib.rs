//! Ledger engine: accounts, transactions and the linked-transaction workflows
//! that keep cashback, debt and balance ledgers consistent.

pub use accounts::Account;
pub use cashback_ledgers::CashbackLedger;
pub use cashback_movements::{CashbackMovement, CashbackStatus};
pub use commands::{
    LinkedOutcome, LinkedTransactionCmd, RecordTransactionCmd, RefundAmount, RefundParams,
    Workflow, WorkflowArgs,
};
pub use cycle::CycleTag;
pub use debt_ledgers::DebtLedger;
pub use debt_movements::DebtMovement;
pub use error::EngineError;
pub use linked_groups::{GroupStatus, LinkedGroup, LinkedKind};
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder};
pub use people::Person;
pub use transactions::{BalanceFlow, Transaction, TransactionKind, TransactionStatus};

mod accounts;
mod cashback_ledgers;
mod cashback_movements;
mod commands;
mod cycle;
mod debt_ledgers;
mod debt_movements;
mod error;
mod linked_groups;
mod money;
mod ops;
mod people;
mod transactions;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
