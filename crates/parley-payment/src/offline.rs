use async_trait::async_trait;
use tracing::debug;

use parley_ledger::{CheckoutRequest, PaymentError, PaymentGateway};
use parley_types::api::CheckoutRef;

/// Gateway used when no Midtrans server key is configured.
///
/// Every checkout succeeds with a local reference; payment is then confirmed
/// by posting a notification to the webhook by hand.
pub struct OfflineGateway {
    base_url: String,
}

impl OfflineGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PaymentGateway for OfflineGateway {
    async fn create_checkout(&self, request: CheckoutRequest) -> Result<CheckoutRef, PaymentError> {
        let token = format!("offline-{}", request.transaction_id);
        debug!(
            "Offline checkout for transaction {} ({})",
            request.transaction_id, request.gross_amount
        );
        Ok(CheckoutRef {
            redirect_url: format!("{}/checkout/{}", self.base_url.trim_end_matches('/'), token),
            token,
        })
    }
}
