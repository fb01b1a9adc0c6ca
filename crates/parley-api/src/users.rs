use axum::{
    Json,
    extract::{Path, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
    response::IntoResponse,
};

use parley_types::api::CreateIdentityRequest;
use parley_types::models::User;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateIdentityRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let user = state.ledger.create_user(req.id)?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<User>, ApiError> {
    let Path(id) = path?;
    Ok(Json(state.ledger.user(id)?))
}
