//! Linked transaction API endpoints

use api_types::linked::{LinkedGroupView, LinkedTransactionCreated, LinkedTransactionNew};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use uuid::Uuid;

use engine::{LinkedTransactionCmd, Workflow, WorkflowArgs};

use crate::{ServerError, server::ServerState};

pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<LinkedTransactionNew>, JsonRejection>,
) -> Result<(StatusCode, Json<LinkedTransactionCreated>), ServerError> {
    let Json(payload) = payload?;
    let args = WorkflowArgs {
        amount: payload.amount,
        person_id: payload.person_id,
        notes: payload.notes,
    };
    let workflow = Workflow::from_linked_type(&payload.kind, args)?;

    let outcome = state
        .engine
        .process_linked(LinkedTransactionCmd::new(payload.parent_txn_id, workflow))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LinkedTransactionCreated {
            linked_txn_id: outcome.group_id,
            related_txn_ids: outcome.created_transaction_ids,
        }),
    ))
}

pub async fn get(
    State(state): State<ServerState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<LinkedGroupView>, ServerError> {
    let Path(id) = id?;
    let group = state.engine.linked_group(id).await?;
    Ok(Json(LinkedGroupView {
        id: group.id,
        kind: group.kind.as_str().to_string(),
        master_txn_id: group.master_transaction_id,
        related_txn_ids: group.related_transaction_ids,
        status: group.status.as_str().to_string(),
        notes: group.notes,
    }))
}
