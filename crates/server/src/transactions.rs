//! Transactions API endpoints

use api_types::transaction::{
    TransactionCreated, TransactionKind as ApiKind, TransactionNew,
    TransactionStatus as ApiStatus, TransactionView,
};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use engine::{MoneyCents, RecordTransactionCmd};

use crate::{ServerError, server::ServerState};

fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::Expense => ApiKind::Expense,
        engine::TransactionKind::Income => ApiKind::Income,
        engine::TransactionKind::Debt => ApiKind::Debt,
        engine::TransactionKind::Repayment => ApiKind::Repayment,
        engine::TransactionKind::Cashback => ApiKind::Cashback,
        engine::TransactionKind::Subscription => ApiKind::Subscription,
        engine::TransactionKind::Import => ApiKind::Import,
        engine::TransactionKind::Adjustment => ApiKind::Adjustment,
    }
}

fn map_api_kind(kind: ApiKind) -> engine::TransactionKind {
    match kind {
        ApiKind::Expense => engine::TransactionKind::Expense,
        ApiKind::Income => engine::TransactionKind::Income,
        ApiKind::Debt => engine::TransactionKind::Debt,
        ApiKind::Repayment => engine::TransactionKind::Repayment,
        ApiKind::Cashback => engine::TransactionKind::Cashback,
        ApiKind::Subscription => engine::TransactionKind::Subscription,
        ApiKind::Import => engine::TransactionKind::Import,
        ApiKind::Adjustment => engine::TransactionKind::Adjustment,
    }
}

fn map_status(status: engine::TransactionStatus) -> ApiStatus {
    match status {
        engine::TransactionStatus::Active => ApiStatus::Active,
        engine::TransactionStatus::Pending => ApiStatus::Pending,
        engine::TransactionStatus::Void => ApiStatus::Void,
        engine::TransactionStatus::Canceled => ApiStatus::Canceled,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<TransactionNew>, JsonRejection>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let Json(payload) = payload?;

    let mut cmd = RecordTransactionCmd::new(
        payload.account_id,
        map_api_kind(payload.kind),
        MoneyCents::positive(payload.amount, "amount")?,
        payload.occurred_at.with_timezone(&Utc),
    );
    cmd.person_id = payload.person_id;
    cmd.category_id = payload.category_id;
    cmd.subscription_member_id = payload.subscription_member_id;
    cmd.notes = payload.notes;
    cmd.fee = payload.fee.map(MoneyCents::try_from).transpose()?;
    cmd.cashback = payload
        .cashback
        .map(|amount| MoneyCents::positive(amount, "cashback"))
        .transpose()?;
    cmd.debt = payload
        .debt
        .map(|amount| MoneyCents::positive(amount, "debt"))
        .transpose()?;

    let tx = state.engine.record_transaction(cmd).await?;
    Ok((StatusCode::CREATED, Json(TransactionCreated { id: tx.id })))
}

pub async fn get(
    State(state): State<ServerState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<TransactionView>, ServerError> {
    let Path(id) = id?;
    let tx = state.engine.transaction(id).await?;
    Ok(Json(TransactionView {
        id: tx.id,
        account_id: tx.account_id,
        person_id: tx.person_id,
        kind: map_kind(tx.kind),
        status: map_status(tx.status),
        amount: tx.amount.to_decimal(),
        fee: tx.fee.map(MoneyCents::to_decimal),
        occurred_at: tx.occurred_at,
        category_id: tx.category_id,
        linked_group_id: tx.linked_group_id,
        notes: tx.notes,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_both_ways() {
        for kind in [
            engine::TransactionKind::Expense,
            engine::TransactionKind::Income,
            engine::TransactionKind::Debt,
            engine::TransactionKind::Repayment,
            engine::TransactionKind::Cashback,
            engine::TransactionKind::Subscription,
            engine::TransactionKind::Import,
            engine::TransactionKind::Adjustment,
        ] {
            assert_eq!(map_api_kind(map_kind(kind)), kind);
        }
    }
}
