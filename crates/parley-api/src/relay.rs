use axum::{
    extract::{Query, State, WebSocketUpgrade, ws::rejection::WebSocketUpgradeRejection},
    response::Response,
};

use parley_types::api::RelayQuery;
use parley_types::models::Role;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /relay?token=…&role=user|admin: upgrade to a paired relay socket.
///
/// Only the presence of the parameters is checked here. Credential,
/// transaction and session checks run after the upgrade, and a refusal is
/// reported in the close frame.
pub async fn relay_upgrade(
    State(state): State<AppState>,
    Query(query): Query<RelayQuery>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, ApiError> {
    let (token, role) = match (
        query.token.filter(|t| !t.is_empty()),
        query.role.filter(|r| !r.is_empty()),
    ) {
        (Some(token), Some(role)) => (token, role),
        _ => {
            return Err(ApiError::Unauthorized(
                "missing authorization token or role".into(),
            ));
        }
    };
    let role: Role = role
        .parse()
        .map_err(|e: parley_types::models::UnknownRole| ApiError::BadRequest(e.to_string()))?;

    let ws = ws.map_err(|e| ApiError::Failed(format!("failed to upgrade to websocket: {}", e)))?;

    let relay = state.relay.clone();
    Ok(ws.on_upgrade(move |socket| relay.handle_connection(socket, token, role)))
}
