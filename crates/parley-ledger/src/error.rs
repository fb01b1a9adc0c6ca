use thiserror::Error;

use parley_crypto::TokenError;

use crate::payment::PaymentError;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("user {0} not found")]
    UserNotFound(i64),
    #[error("admin {0} not found")]
    AdminNotFound(i64),
    #[error("transaction {0} not found")]
    TransactionNotFound(i64),

    #[error("user {0} already exists")]
    UserExists(i64),
    #[error("admin {0} already exists")]
    AdminExists(i64),

    #[error("user {user_id} and admin {admin_id} already have active transaction {transaction_id}")]
    ActiveTransaction {
        user_id: i64,
        admin_id: i64,
        transaction_id: i64,
    },

    #[error("price must be positive, got {0}")]
    InvalidPrice(i64),
    #[error("invalid order id '{0}'")]
    InvalidOrderId(String),
    #[error("unknown transaction status '{0}'")]
    UnknownStatus(String),

    #[error("payment gateway failed: {0}")]
    Upstream(#[from] PaymentError),
    #[error("failed to issue credential: {0}")]
    Credential(#[from] TokenError),

    #[error("ledger lock poisoned")]
    Poisoned,
}
