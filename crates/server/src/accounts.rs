use api_types::account::AccountView;
use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub async fn get(
    State(state): State<ServerState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<AccountView>, ServerError> {
    let Path(id) = id?;
    let account = state.engine.account(id).await?;
    Ok(Json(AccountView {
        id: account.id,
        name: account.name,
        balance: account.balance.to_decimal(),
    }))
}
