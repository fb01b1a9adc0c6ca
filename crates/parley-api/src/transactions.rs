use axum::{
    Json,
    extract::{Path, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
    response::IntoResponse,
};

use parley_ledger::LedgerError;
use parley_types::api::{CreateTransactionRequest, CreateTransactionResponse, TransactionResponse};

use crate::error::ApiError;
use crate::state::AppState;

/// POST /transactions: reserve a user/admin pair and open a checkout.
pub async fn create_transaction(
    State(state): State<AppState>,
    payload: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;

    let (transaction, checkout) = state
        .ledger
        .create_transaction(req.user_id, req.admin_id, req.price)
        .await
        .map_err(|e| match e {
            // The ids come from the request body, so an unknown one is a bad request.
            LedgerError::UserNotFound(_) | LedgerError::AdminNotFound(_) => {
                ApiError::BadRequest(e.to_string())
            }
            other => other.into(),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTransactionResponse {
            transaction,
            checkout,
        }),
    ))
}

/// GET /transactions/{id}: includes a relay token once the transaction is paid.
pub async fn get_transaction(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let Path(id) = path?;
    let (transaction, token) = state.ledger.transaction_with_credential(id)?;
    Ok(Json(TransactionResponse { transaction, token }))
}
