use async_trait::async_trait;
use thiserror::Error;

use parley_types::api::CheckoutRef;

/// What the ledger asks the payment gateway for when a transaction is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub transaction_id: i64,
    pub gross_amount: i64,
    /// Paying user; the gateway derives its customer details from it.
    pub user_id: i64,
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("gateway unreachable: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("gateway rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("gateway returned no redirect url")]
    MissingRedirect,
}

/// Port to the external payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout(&self, request: CheckoutRequest) -> Result<CheckoutRef, PaymentError>;
}
