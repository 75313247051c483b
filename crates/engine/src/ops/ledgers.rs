//! Ledger aggregates and account balances.
//!
//! Every change is applied as a relative delta (`col = col + delta`) so that
//! concurrent units of work touching the same row compose instead of
//! overwriting each other.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use sea_orm::{
    ActiveModelTrait, ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter,
    TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    CashbackLedger, CashbackMovement, CycleTag, DebtLedger, DebtMovement, EngineError, MoneyCents,
    ResultEngine, accounts, cashback_ledgers, cashback_movements, debt_ledgers, debt_movements,
};

use super::{Engine, with_tx};

/// Add `delta` to the account balance.
pub(super) async fn adjust_account_balance(
    db_tx: &DatabaseTransaction,
    account_id: Uuid,
    delta: MoneyCents,
    now: DateTime<Utc>,
) -> ResultEngine<()> {
    let result = accounts::Entity::update_many()
        .col_expr(
            accounts::Column::CurrentBalanceMinor,
            Expr::col(accounts::Column::CurrentBalanceMinor).add(delta.cents()),
        )
        .col_expr(accounts::Column::UpdatedAt, Expr::value(now))
        .filter(accounts::Column::Id.eq(account_id.to_string()))
        .exec(db_tx)
        .await?;
    if result.rows_affected == 0 {
        return Err(EngineError::KeyNotFound("account not exists".to_string()));
    }
    tracing::debug!(%account_id, %delta, "account balance adjusted");
    Ok(())
}

/// Apply deltas to the `(account, cycle)` cashback aggregate.
///
/// Returns `false` when the aggregate row does not exist; nothing is written
/// in that case.
pub(super) async fn adjust_cashback_ledger(
    db_tx: &DatabaseTransaction,
    account_id: Uuid,
    cycle: &CycleTag,
    delta_total: MoneyCents,
    delta_remaining: MoneyCents,
    now: DateTime<Utc>,
) -> ResultEngine<bool> {
    let result = cashback_ledgers::Entity::update_many()
        .col_expr(
            cashback_ledgers::Column::TotalCashbackMinor,
            Expr::col(cashback_ledgers::Column::TotalCashbackMinor).add(delta_total.cents()),
        )
        .col_expr(
            cashback_ledgers::Column::RemainingBudgetMinor,
            Expr::col(cashback_ledgers::Column::RemainingBudgetMinor)
                .add(delta_remaining.cents()),
        )
        .col_expr(cashback_ledgers::Column::UpdatedAt, Expr::value(now))
        .filter(cashback_ledgers::Column::AccountId.eq(account_id.to_string()))
        .filter(cashback_ledgers::Column::CycleTag.eq(cycle.to_string()))
        .exec(db_tx)
        .await?;
    tracing::debug!(
        %account_id,
        %cycle,
        %delta_total,
        %delta_remaining,
        rows = result.rows_affected,
        "cashback ledger adjusted"
    );
    Ok(result.rows_affected > 0)
}

/// Apply deltas to the `(person, cycle)` debt aggregate.
///
/// Returns `false` when the aggregate row does not exist.
pub(super) async fn adjust_debt_ledger(
    db_tx: &DatabaseTransaction,
    person_id: Uuid,
    cycle: &CycleTag,
    delta_new: MoneyCents,
    delta_net: MoneyCents,
    now: DateTime<Utc>,
) -> ResultEngine<bool> {
    let result = debt_ledgers::Entity::update_many()
        .col_expr(
            debt_ledgers::Column::NewDebtMinor,
            Expr::col(debt_ledgers::Column::NewDebtMinor).add(delta_new.cents()),
        )
        .col_expr(
            debt_ledgers::Column::NetDebtMinor,
            Expr::col(debt_ledgers::Column::NetDebtMinor).add(delta_net.cents()),
        )
        .col_expr(debt_ledgers::Column::UpdatedAt, Expr::value(now))
        .filter(debt_ledgers::Column::PersonId.eq(person_id.to_string()))
        .filter(debt_ledgers::Column::CycleTag.eq(cycle.to_string()))
        .exec(db_tx)
        .await?;
    tracing::debug!(
        %person_id,
        %cycle,
        %delta_new,
        %delta_net,
        rows = result.rows_affected,
        "debt ledger adjusted"
    );
    Ok(result.rows_affected > 0)
}

/// Insert a zeroed cashback aggregate for `(account, cycle)` unless one exists.
pub(super) async fn ensure_cashback_ledger(
    db_tx: &DatabaseTransaction,
    account_id: Uuid,
    cycle: &CycleTag,
    now: DateTime<Utc>,
) -> ResultEngine<()> {
    let exists = cashback_ledgers::Entity::find()
        .filter(cashback_ledgers::Column::AccountId.eq(account_id.to_string()))
        .filter(cashback_ledgers::Column::CycleTag.eq(cycle.to_string()))
        .one(db_tx)
        .await?
        .is_some();
    if exists {
        return Ok(());
    }
    cashback_ledgers::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4().to_string()),
        account_id: ActiveValue::Set(account_id.to_string()),
        cycle_tag: ActiveValue::Set(cycle.to_string()),
        total_cashback_minor: ActiveValue::Set(0),
        remaining_budget_minor: ActiveValue::Set(0),
        updated_at: ActiveValue::Set(now),
    }
    .insert(db_tx)
    .await?;
    Ok(())
}

/// Insert a zeroed debt aggregate for `(person, cycle)` unless one exists.
pub(super) async fn ensure_debt_ledger(
    db_tx: &DatabaseTransaction,
    person_id: Uuid,
    cycle: &CycleTag,
    now: DateTime<Utc>,
) -> ResultEngine<()> {
    let exists = debt_ledgers::Entity::find()
        .filter(debt_ledgers::Column::PersonId.eq(person_id.to_string()))
        .filter(debt_ledgers::Column::CycleTag.eq(cycle.to_string()))
        .one(db_tx)
        .await?
        .is_some();
    if exists {
        return Ok(());
    }
    debt_ledgers::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4().to_string()),
        person_id: ActiveValue::Set(person_id.to_string()),
        cycle_tag: ActiveValue::Set(cycle.to_string()),
        new_debt_minor: ActiveValue::Set(0),
        net_debt_minor: ActiveValue::Set(0),
        updated_at: ActiveValue::Set(now),
    }
    .insert(db_tx)
    .await?;
    Ok(())
}

pub(super) async fn find_cashback_movement<C: ConnectionTrait>(
    db: &C,
    transaction_id: Uuid,
) -> ResultEngine<Option<CashbackMovement>> {
    cashback_movements::Entity::find()
        .filter(cashback_movements::Column::TransactionId.eq(transaction_id.to_string()))
        .one(db)
        .await?
        .map(CashbackMovement::try_from)
        .transpose()
}

pub(super) async fn find_debt_movement<C: ConnectionTrait>(
    db: &C,
    transaction_id: Uuid,
) -> ResultEngine<Option<DebtMovement>> {
    debt_movements::Entity::find()
        .filter(debt_movements::Column::TransactionId.eq(transaction_id.to_string()))
        .one(db)
        .await?
        .map(DebtMovement::try_from)
        .transpose()
}

impl Engine {
    /// Set the cashback budget of `(account, cycle)`.
    ///
    /// The remaining budget becomes `budget - total_cashback`, so cashback
    /// already accrued in the cycle keeps counting against it.
    pub async fn set_cashback_budget(
        &self,
        account_id: Uuid,
        cycle: &CycleTag,
        budget: MoneyCents,
    ) -> ResultEngine<CashbackLedger> {
        if budget.is_negative() {
            return Err(EngineError::InvalidArgument(
                "budget must be >= 0".to_string(),
            ));
        }
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, account_id).await?;
            ensure_cashback_ledger(&db_tx, account_id, cycle, now).await?;
            cashback_ledgers::Entity::update_many()
                .col_expr(
                    cashback_ledgers::Column::RemainingBudgetMinor,
                    Expr::val(budget.cents())
                        .sub(Expr::col(cashback_ledgers::Column::TotalCashbackMinor)),
                )
                .col_expr(cashback_ledgers::Column::UpdatedAt, Expr::value(now))
                .filter(cashback_ledgers::Column::AccountId.eq(account_id.to_string()))
                .filter(cashback_ledgers::Column::CycleTag.eq(cycle.to_string()))
                .exec(&db_tx)
                .await?;
            load_cashback_ledger(&db_tx, account_id, cycle).await
        })
    }

    /// Return the cashback aggregate of `(account, cycle)`.
    pub async fn cashback_ledger(
        &self,
        account_id: Uuid,
        cycle: &CycleTag,
    ) -> ResultEngine<CashbackLedger> {
        with_tx!(self, |db_tx| {
            load_cashback_ledger(&db_tx, account_id, cycle).await
        })
    }

    /// Return the debt aggregate of `(person, cycle)`.
    pub async fn debt_ledger(&self, person_id: Uuid, cycle: &CycleTag) -> ResultEngine<DebtLedger> {
        with_tx!(self, |db_tx| {
            let model = debt_ledgers::Entity::find()
                .filter(debt_ledgers::Column::PersonId.eq(person_id.to_string()))
                .filter(debt_ledgers::Column::CycleTag.eq(cycle.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("debt ledger not exists".to_string()))?;
            DebtLedger::try_from(model)
        })
    }

    /// Return the cashback movement recorded for a transaction.
    pub async fn cashback_movement(&self, transaction_id: Uuid) -> ResultEngine<CashbackMovement> {
        with_tx!(self, |db_tx| {
            find_cashback_movement(&db_tx, transaction_id)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("cashback movement not exists".to_string()))
        })
    }

    /// Return the debt movement recorded for a transaction.
    pub async fn debt_movement(&self, transaction_id: Uuid) -> ResultEngine<DebtMovement> {
        with_tx!(self, |db_tx| {
            find_debt_movement(&db_tx, transaction_id)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("debt movement not exists".to_string()))
        })
    }
}

async fn load_cashback_ledger(
    db_tx: &DatabaseTransaction,
    account_id: Uuid,
    cycle: &CycleTag,
) -> ResultEngine<CashbackLedger> {
    let model = cashback_ledgers::Entity::find()
        .filter(cashback_ledgers::Column::AccountId.eq(account_id.to_string()))
        .filter(cashback_ledgers::Column::CycleTag.eq(cycle.to_string()))
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("cashback ledger not exists".to_string()))?;
    CashbackLedger::try_from(model)
}
