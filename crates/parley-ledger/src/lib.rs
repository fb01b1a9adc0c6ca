pub mod error;
pub mod identities;
pub mod notification;
pub mod payment;
pub mod transactions;

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::Duration;
use tracing::info;

use parley_crypto::TokenIssuer;
use parley_types::models::{Admin, Transaction, User};

pub use error::LedgerError;
pub use payment::{CheckoutRequest, PaymentError, PaymentGateway};

/// How long a freshly created transaction stays usable.
pub const DEFAULT_TRANSACTION_TTL: Duration = Duration::minutes(10);

/// In-memory store for identities and transactions.
///
/// All state sits behind one mutex and every public method is a complete,
/// atomic operation, so callers never lock or compose get-then-set sequences
/// themselves. The lock is never held across an `.await`.
pub struct Ledger {
    state: Mutex<LedgerState>,
    issuer: TokenIssuer,
    gateway: Arc<dyn PaymentGateway>,
    transaction_ttl: Duration,
}

#[derive(Default)]
struct LedgerState {
    users: BTreeMap<i64, User>,
    admins: BTreeMap<i64, Admin>,
    transactions: HashMap<i64, Transaction>,
    last_transaction_id: i64,
}

impl Ledger {
    pub fn new(issuer: TokenIssuer, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self::with_transaction_ttl(issuer, gateway, DEFAULT_TRANSACTION_TTL)
    }

    pub fn with_transaction_ttl(
        issuer: TokenIssuer,
        gateway: Arc<dyn PaymentGateway>,
        transaction_ttl: Duration,
    ) -> Self {
        info!(
            "Ledger ready (transaction ttl {}s, credential ttl {}s)",
            transaction_ttl.num_seconds(),
            issuer.ttl().num_seconds()
        );
        Self {
            state: Mutex::new(LedgerState::default()),
            issuer,
            gateway,
            transaction_ttl,
        }
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    fn with_state<F, T>(&self, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut LedgerState) -> Result<T, LedgerError>,
    {
        let mut state = self.state.lock().map_err(|_| LedgerError::Poisoned)?;
        f(&mut state)
    }
}
