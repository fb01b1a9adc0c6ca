//! Midtrans Snap checkout client.
//!
//! One call is needed: `POST /snap/v1/transactions` authenticated with the
//! server key as the HTTP Basic username. The response carries a Snap token
//! and the redirect URL the payer opens to complete the payment.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use parley_ledger::{CheckoutRequest, PaymentError, PaymentGateway};
use parley_types::api::CheckoutRef;

const SANDBOX_BASE_URL: &str = "https://app.sandbox.midtrans.com";
const PRODUCTION_BASE_URL: &str = "https://app.midtrans.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapEnvironment {
    Sandbox,
    Production,
}

impl SnapEnvironment {
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_BASE_URL,
            Self::Production => PRODUCTION_BASE_URL,
        }
    }
}

// ── Wire types ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct SnapRequest {
    transaction_details: TransactionDetails,
    customer_details: CustomerDetails,
    credit_card: CreditCard,
}

#[derive(Debug, Serialize)]
struct TransactionDetails {
    order_id: String,
    gross_amount: i64,
}

#[derive(Debug, Serialize)]
struct CustomerDetails {
    email: String,
}

#[derive(Debug, Serialize)]
struct CreditCard {
    secure: bool,
}

#[derive(Debug, Deserialize)]
struct SnapResponse {
    #[serde(default)]
    token: String,
    #[serde(default)]
    redirect_url: String,
}

#[derive(Debug, Deserialize)]
struct SnapErrorResponse {
    #[serde(default)]
    error_messages: Vec<String>,
}

impl From<CheckoutRequest> for SnapRequest {
    fn from(req: CheckoutRequest) -> Self {
        Self {
            transaction_details: TransactionDetails {
                order_id: req.transaction_id.to_string(),
                gross_amount: req.gross_amount,
            },
            customer_details: CustomerDetails {
                email: format!("user{}@example.com", req.user_id),
            },
            credit_card: CreditCard { secure: true },
        }
    }
}

// ── Client ──────────────────────────────────────────────────────────────

pub struct SnapClient {
    http: reqwest::Client,
    endpoint: String,
    server_key: String,
}

impl SnapClient {
    pub fn new(server_key: impl Into<String>, environment: SnapEnvironment) -> Self {
        Self::with_base_url(server_key, environment.base_url())
    }

    /// Point the client at an arbitrary Snap-compatible host.
    pub fn with_base_url(server_key: impl Into<String>, base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}/snap/v1/transactions", base_url.trim_end_matches('/')),
            server_key: server_key.into(),
        }
    }
}

#[async_trait]
impl PaymentGateway for SnapClient {
    async fn create_checkout(&self, request: CheckoutRequest) -> Result<CheckoutRef, PaymentError> {
        let order_id = request.transaction_id;
        let body = SnapRequest::from(request);

        let response = self
            .http
            .post(&self.endpoint)
            .basic_auth(&self.server_key, Some(""))
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::Transport(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<SnapErrorResponse>(&text)
                .map(|e| e.error_messages.join("; "))
                .unwrap_or(text);
            warn!("Snap rejected order {} ({}): {}", order_id, status, message);
            return Err(PaymentError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let snap: SnapResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::Transport(Box::new(e)))?;

        if snap.redirect_url.is_empty() {
            return Err(PaymentError::MissingRedirect);
        }

        debug!("Snap checkout for order {}: {}", order_id, snap.redirect_url);
        Ok(CheckoutRef {
            token: snap.token,
            redirect_url: snap.redirect_url,
        })
    }
}
