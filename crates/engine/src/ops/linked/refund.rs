use chrono::{DateTime, Utc};
use uuid::Uuid;

use sea_orm::{
    ActiveModelTrait, ActiveValue, DatabaseTransaction, QueryFilter, prelude::*, sea_query::Expr,
};

use crate::{
    CashbackStatus, CycleTag, EngineError, RefundAmount, RefundParams, ResultEngine, Transaction,
    TransactionStatus, cashback_movements, cashback_movements::REFUNDED_NOTE, transactions,
};

use super::super::{
    Engine,
    ledgers::{
        adjust_account_balance, adjust_cashback_ledger, adjust_debt_ledger,
        find_cashback_movement, find_debt_movement,
    },
};
use super::tracker::GroupTracker;

impl Engine {
    /// Refunds `parent`.
    ///
    /// This:
    /// - creates the reversal transaction (opposite flow, same account) and
    ///   tracks it in the group
    /// - cancels the parent
    /// - invalidates the parent's cashback movement and gives the cashback back
    ///   to the `(account, parent month)` budget
    /// - removes the parent's debt from the `(person, movement cycle)` aggregate
    /// - applies the reversal to the account balance
    ///
    /// Missing aggregate rows are skipped.
    pub(super) async fn refund(
        &self,
        db_tx: &DatabaseTransaction,
        parent: &Transaction,
        params: &RefundParams,
        tracker: &mut GroupTracker,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        if !parent.status.is_open() {
            return Err(already_closed(parent.status));
        }
        let amount = match params.amount {
            RefundAmount::Exact(amount) => amount,
            RefundAmount::Full => parent.amount,
        };
        let person_id = match params.person_id {
            Some(person_id) => Some(self.require_person(db_tx, person_id).await?.id),
            None => parent.person_id,
        };

        let mut refund = Transaction::new(parent.account_id, parent.kind.reversal(), amount, now, now)?;
        refund.person_id = person_id;
        refund.linked_group_id = Some(tracker.id());
        refund.notes = Some(refund_note(parent.id, params.notes.as_deref()));
        transactions::ActiveModel::from(&refund).insert(db_tx).await?;
        tracker.track(db_tx, refund.id, now).await?;

        cancel_parent(db_tx, parent.id, now).await?;

        let cycle = CycleTag::from_datetime(parent.occurred_at);
        if let Some(movement) = find_cashback_movement(db_tx, parent.id).await?
            && movement.status == CashbackStatus::Active
        {
            cashback_movements::ActiveModel {
                id: ActiveValue::Set(movement.id.to_string()),
                status: ActiveValue::Set(CashbackStatus::Invalidated.as_str().to_string()),
                note: ActiveValue::Set(Some(REFUNDED_NOTE.to_string())),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            }
            .update(db_tx)
            .await?;
            let found = adjust_cashback_ledger(
                db_tx,
                parent.account_id,
                &cycle,
                -movement.amount,
                movement.amount,
                now,
            )
            .await?;
            if !found {
                tracing::warn!(
                    account_id = %parent.account_id,
                    %cycle,
                    "cashback ledger missing, skipping reversal"
                );
            }
        }

        if let Some(person_id) = parent.person_id
            && let Some(movement) = find_debt_movement(db_tx, parent.id).await?
        {
            let found = adjust_debt_ledger(
                db_tx,
                person_id,
                &movement.cycle,
                -movement.amount,
                -movement.amount,
                now,
            )
            .await?;
            if !found {
                tracing::warn!(
                    %person_id,
                    cycle = %movement.cycle,
                    "debt ledger missing, skipping reversal"
                );
            }
        }

        self.require_account(db_tx, parent.account_id).await?;
        adjust_account_balance(db_tx, parent.account_id, refund.kind.signed(amount), now).await?;
        Ok(())
    }
}

/// Moves the parent to `canceled`, provided it is still open.
///
/// The status filter makes a concurrent refund of the same parent lose instead
/// of reversing the ledgers twice.
async fn cancel_parent(
    db_tx: &DatabaseTransaction,
    parent_id: Uuid,
    now: DateTime<Utc>,
) -> ResultEngine<()> {
    let result = transactions::Entity::update_many()
        .col_expr(
            transactions::Column::Status,
            Expr::value(TransactionStatus::Canceled.as_str()),
        )
        .col_expr(transactions::Column::UpdatedAt, Expr::value(now))
        .filter(transactions::Column::Id.eq(parent_id.to_string()))
        .filter(transactions::Column::Status.is_in([
            TransactionStatus::Active.as_str(),
            TransactionStatus::Pending.as_str(),
        ]))
        .exec(db_tx)
        .await?;
    if result.rows_affected == 0 {
        return Err(already_closed(TransactionStatus::Canceled));
    }
    Ok(())
}

fn already_closed(status: TransactionStatus) -> EngineError {
    EngineError::InvalidArgument(format!("transaction already {}", status.as_str()))
}

fn refund_note(parent_id: Uuid, notes: Option<&str>) -> String {
    match notes {
        Some(notes) => format!("{notes} (refund of {parent_id})"),
        None => format!("Refund of {parent_id}"),
    }
}
