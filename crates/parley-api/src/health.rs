use axum::{Json, extract::State};

use parley_types::api::HealthResponse;

use crate::state::AppState;

pub async fn index() -> &'static str {
    "Parley relay server"
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        active_sessions: state.relay.registry().active_sessions().await,
    })
}
