use serde::{Deserialize, Serialize};

use crate::models::Transaction;

// -- JWT Claims --

/// Relay credential claims. Issued by the ledger once a transaction is paid,
/// checked by the relay gateway before a socket is paired. Every field is
/// required; a token missing any of them does not decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub admin_id: i64,
    pub transaction_id: i64,
    pub iat: usize,
    pub exp: usize,
}

// -- Identities --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateIdentityRequest {
    pub id: i64,
}

// -- Transactions --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTransactionRequest {
    pub user_id: i64,
    pub admin_id: i64,
    pub price: i64,
}

/// Opaque reference handed back by the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRef {
    pub token: String,
    pub redirect_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTransactionResponse {
    pub transaction: Transaction,
    pub checkout: CheckoutRef,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub transaction: Transaction,
    /// Relay credential, present only once the transaction is paid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

// -- Payment webhook --

/// The subset of a gateway notification the ledger reads. The gateway sends
/// many more fields; they are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct PaymentNotification {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub transaction_status: Option<String>,
    #[serde(default)]
    pub fraud_status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

// -- Relay --

#[derive(Debug, Default, Deserialize)]
pub struct RelayQuery {
    pub token: Option<String>,
    pub role: Option<String>,
}

// -- Misc --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub active_sessions: usize,
}
