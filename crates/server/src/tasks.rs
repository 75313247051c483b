//! Transaction task API endpoints
//!
//! Tasks are the upper-case flavour of linked transactions
//! (`PARTIAL_REFUND`, `FULL_REFUND`, ...) and run through the same engine call.

use api_types::task::{TransactionTaskCreated, TransactionTaskNew};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use engine::{LinkedTransactionCmd, Workflow, WorkflowArgs};

use crate::{ServerError, server::ServerState};

pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<TransactionTaskNew>, JsonRejection>,
) -> Result<(StatusCode, Json<TransactionTaskCreated>), ServerError> {
    let Json(payload) = payload?;
    let args = WorkflowArgs {
        amount: payload.amount,
        person_id: payload.person_id,
        notes: None,
    };
    let workflow = Workflow::from_task_type(&payload.task_type, args)?;

    let outcome = state
        .engine
        .process_linked(LinkedTransactionCmd::new(payload.parent_txn_id, workflow))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TransactionTaskCreated {
            created_txn_ids: outcome.created_transaction_ids,
        }),
    ))
}
