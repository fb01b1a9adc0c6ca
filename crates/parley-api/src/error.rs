//! HTTP error mapping for the API handlers.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use parley_ledger::LedgerError;
use parley_types::api::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// Request was well formed but could not be carried out. The message is
    /// shown to the client.
    #[error("{0}")]
    Failed(String),

    /// Server fault. Logged, never shown to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Failed(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let message = match &self {
            Self::Internal(_) => "internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::UserNotFound(_)
            | LedgerError::AdminNotFound(_)
            | LedgerError::TransactionNotFound(_) => Self::NotFound(e.to_string()),
            LedgerError::InvalidPrice(_) | LedgerError::InvalidOrderId(_) => {
                Self::BadRequest(e.to_string())
            }
            LedgerError::UserExists(_)
            | LedgerError::AdminExists(_)
            | LedgerError::ActiveTransaction { .. }
            | LedgerError::UnknownStatus(_)
            | LedgerError::Upstream(_) => Self::Failed(e.to_string()),
            LedgerError::Credential(_) | LedgerError::Poisoned => Self::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        Self::BadRequest("invalid id format".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn ledger_errors_map_to_statuses() {
        assert_eq!(status_of(LedgerError::UserNotFound(1).into()), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(LedgerError::TransactionNotFound(1).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(LedgerError::InvalidOrderId("x".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(LedgerError::UserExists(1).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(LedgerError::UnknownStatus("refund".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_details_are_hidden() {
        let err: ApiError = LedgerError::Poisoned.into();
        assert_eq!(err.to_string(), "internal error: ledger lock poisoned");
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
