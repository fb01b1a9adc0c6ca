use axum::{
    Json,
    extract::{Path, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
    response::IntoResponse,
};

use parley_types::api::CreateIdentityRequest;
use parley_types::models::Admin;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn create_admin(
    State(state): State<AppState>,
    payload: Result<Json<CreateIdentityRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let admin = state.ledger.create_admin(req.id)?;
    Ok((StatusCode::CREATED, Json(admin)))
}

pub async fn get_admin(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Admin>, ApiError> {
    let Path(id) = path?;
    Ok(Json(state.ledger.admin(id)?))
}

pub async fn list_admins(State(state): State<AppState>) -> Result<Json<Vec<Admin>>, ApiError> {
    Ok(Json(state.ledger.admins()?))
}
