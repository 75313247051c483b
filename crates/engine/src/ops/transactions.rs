use chrono::Utc;
use uuid::Uuid;

use sea_orm::{ActiveModelTrait, TransactionTrait};

use crate::{
    CashbackMovement, CashbackStatus, CycleTag, DebtMovement, EngineError, MoneyCents,
    RecordTransactionCmd, ResultEngine, Transaction, cashback_movements, debt_movements,
    transactions,
    util::normalize_optional_text,
};

use super::{
    Engine,
    ledgers::{
        adjust_account_balance, adjust_cashback_ledger, adjust_debt_ledger,
        ensure_cashback_ledger, ensure_debt_ledger,
    },
    with_tx,
};

impl Engine {
    /// Return a transaction snapshot from DB.
    pub async fn transaction(&self, transaction_id: Uuid) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            self.require_transaction(&db_tx, transaction_id).await
        })
    }

    /// Records a new transaction and applies its effects.
    ///
    /// This:
    /// - applies the signed amount (and the fee, always as an outflow) to the
    ///   account balance
    /// - records the cashback movement, if any, against the `(account, cycle)`
    ///   aggregate: `+C` total, `-C` remaining budget
    /// - records the debt movement, if any, against the `(person, cycle)`
    ///   aggregate: `+D` new and net debt
    ///
    /// Missing aggregate rows are created at zero. The cycle is the month of
    /// `occurred_at`.
    pub async fn record_transaction(&self, cmd: RecordTransactionCmd) -> ResultEngine<Transaction> {
        let now = Utc::now();
        let mut tx = Transaction::new(cmd.account_id, cmd.kind, cmd.amount, cmd.occurred_at, now)?;
        tx.person_id = cmd.person_id;
        tx.category_id = normalize_optional_text(cmd.category_id.as_deref());
        tx.subscription_member_id = normalize_optional_text(cmd.subscription_member_id.as_deref());
        tx.notes = normalize_optional_text(cmd.notes.as_deref());
        tx.fee = match cmd.fee {
            Some(fee) if fee.is_negative() => {
                return Err(EngineError::InvalidArgument("fee must be >= 0".to_string()));
            }
            Some(fee) if fee.is_zero() => None,
            fee => fee,
        };
        let cashback = cmd
            .cashback
            .map(|amount| require_positive(amount, "cashback"))
            .transpose()?;
        let debt = cmd
            .debt
            .map(|amount| require_positive(amount, "debt"))
            .transpose()?;
        if debt.is_some() && tx.person_id.is_none() {
            return Err(EngineError::InvalidArgument(
                "debt movement requires a person".to_string(),
            ));
        }

        let cycle = CycleTag::from_datetime(tx.occurred_at);
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, tx.account_id).await?;
            if let Some(person_id) = tx.person_id {
                self.require_person(&db_tx, person_id).await?;
            }

            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;

            let fee = tx.fee.unwrap_or(MoneyCents::ZERO);
            adjust_account_balance(&db_tx, tx.account_id, tx.kind.signed(tx.amount) - fee, now)
                .await?;

            if let Some(amount) = cashback {
                let movement = CashbackMovement {
                    id: Uuid::new_v4(),
                    transaction_id: tx.id,
                    amount,
                    status: CashbackStatus::Active,
                    note: None,
                    created_at: now,
                    updated_at: now,
                };
                cashback_movements::ActiveModel::from(&movement)
                    .insert(&db_tx)
                    .await?;
                ensure_cashback_ledger(&db_tx, tx.account_id, &cycle, now).await?;
                adjust_cashback_ledger(&db_tx, tx.account_id, &cycle, amount, -amount, now)
                    .await?;
            }

            if let (Some(amount), Some(person_id)) = (debt, tx.person_id) {
                let movement = DebtMovement {
                    id: Uuid::new_v4(),
                    transaction_id: tx.id,
                    person_id,
                    amount,
                    cycle: cycle.clone(),
                    created_at: now,
                    updated_at: now,
                };
                debt_movements::ActiveModel::from(&movement)
                    .insert(&db_tx)
                    .await?;
                ensure_debt_ledger(&db_tx, person_id, &cycle, now).await?;
                adjust_debt_ledger(&db_tx, person_id, &cycle, amount, amount, now).await?;
            }

            tracing::info!(
                transaction_id = %tx.id,
                account_id = %tx.account_id,
                kind = tx.kind.as_str(),
                amount = %tx.amount,
                "transaction recorded"
            );
            Ok(tx)
        })
    }
}

fn require_positive(amount: MoneyCents, label: &str) -> ResultEngine<MoneyCents> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidArgument(format!("{label} must be > 0")));
    }
    Ok(amount)
}
