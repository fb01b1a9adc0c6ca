use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::info;

use parley_types::api::{PaymentNotification, StatusResponse};

use crate::error::ApiError;
use crate::state::AppState;

/// POST /payment-webhook: payment gateway status notification.
///
/// `order_id` and `transaction_status` are required; a missing or empty one
/// is a 400. `fraud_status` only matters for `capture` and is not required:
/// omitting it never yields a 400, and a `capture` without it counts as
/// fraud.
pub async fn payment_notification(
    State(state): State<AppState>,
    payload: Result<Json<PaymentNotification>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(notification) = payload?;

    let order_id = required(notification.order_id, "order_id")?;
    let transaction_status = required(notification.transaction_status, "transaction_status")?;
    let fraud_status = notification.fraud_status.unwrap_or_default();

    let status = state
        .ledger
        .apply_gateway_notification(&order_id, &transaction_status, &fraud_status)?;
    info!(
        "Payment notification for order {} ({}/{}): now {}",
        order_id, transaction_status, fraud_status, status
    );

    Ok(Json(StatusResponse {
        status: "success".into(),
    }))
}

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("missing or invalid {}", field)))
}
