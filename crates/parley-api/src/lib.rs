pub mod admins;
pub mod error;
pub mod health;
pub mod relay;
pub mod state;
pub mod transactions;
pub mod users;
pub mod webhook;

use axum::{
    Router,
    routing::{get, post},
};

pub use error::ApiError;
pub use state::{AppState, AppStateInner};

/// All HTTP and WebSocket routes, without middleware layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::index))
        .route("/health", get(health::health))
        .route("/users", post(users::create_user))
        .route("/users/{id}", get(users::get_user))
        .route("/admins", post(admins::create_admin).get(admins::list_admins))
        .route("/admins/{id}", get(admins::get_admin))
        .route("/transactions", post(transactions::create_transaction))
        .route("/transactions/{id}", get(transactions::get_transaction))
        .route("/payment-webhook", post(webhook::payment_notification))
        .route("/relay", get(relay::relay_upgrade))
        .with_state(state)
}
