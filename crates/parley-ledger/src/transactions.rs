use chrono::Utc;
use tracing::{info, warn};

use parley_types::api::CheckoutRef;
use parley_types::models::{Transaction, TransactionStatus};

use crate::notification::status_from_notification;
use crate::payment::CheckoutRequest;
use crate::{Ledger, LedgerError};

impl Ledger {
    /// Create a transaction for an existing user/admin pair and open a
    /// checkout for it.
    ///
    /// The record is inserted as `pending` before the gateway call, which
    /// reserves the pair while the lock is released. It becomes
    /// `pending_payment` once the gateway answers, and is discarded if the
    /// gateway fails or the returned future is dropped before it finishes.
    pub async fn create_transaction(
        &self,
        user_id: i64,
        admin_id: i64,
        price: i64,
    ) -> Result<(Transaction, CheckoutRef), LedgerError> {
        if price <= 0 {
            return Err(LedgerError::InvalidPrice(price));
        }

        let reserved = self.with_state(|state| {
            if !state.users.contains_key(&user_id) {
                return Err(LedgerError::UserNotFound(user_id));
            }
            if !state.admins.contains_key(&admin_id) {
                return Err(LedgerError::AdminNotFound(admin_id));
            }

            let now = Utc::now();
            if let Some(active) = state.transactions.values().find(|t| {
                t.user_id == user_id && t.admin_id == admin_id && t.is_active(now)
            }) {
                return Err(LedgerError::ActiveTransaction {
                    user_id,
                    admin_id,
                    transaction_id: active.id,
                });
            }

            state.last_transaction_id += 1;
            let transaction = Transaction {
                id: state.last_transaction_id,
                user_id,
                admin_id,
                price,
                status: TransactionStatus::Pending,
                expires_at: now + self.transaction_ttl,
            };
            state.transactions.insert(transaction.id, transaction.clone());
            Ok(transaction)
        })?;

        info!(
            "Transaction {} reserved for user {} / admin {} ({})",
            reserved.id, user_id, admin_id, price
        );

        // Dropped without `commit` if the gateway fails or this future is
        // cancelled mid-call; either way the reservation goes away.
        let reservation = Reservation {
            ledger: self,
            id: reserved.id,
            committed: false,
        };

        let checkout = self
            .gateway
            .create_checkout(CheckoutRequest {
                transaction_id: reserved.id,
                gross_amount: price,
                user_id,
            })
            .await
            .map_err(|e| {
                warn!("Checkout for transaction {} failed: {}", reserved.id, e);
                LedgerError::Upstream(e)
            })?;

        let transaction = self.with_state(|state| {
            let transaction = state
                .transactions
                .get_mut(&reserved.id)
                .ok_or(LedgerError::TransactionNotFound(reserved.id))?;
            if transaction.status == TransactionStatus::Pending {
                transaction.status = TransactionStatus::PendingPayment;
            }
            Ok(transaction.clone())
        })?;
        reservation.commit();

        info!("Transaction {} awaiting payment", transaction.id);
        Ok((transaction, checkout))
    }

    pub fn apply_gateway_notification(
        &self,
        order_id: &str,
        transaction_status: &str,
        fraud_status: &str,
    ) -> Result<TransactionStatus, LedgerError> {
        let id: i64 = order_id
            .trim()
            .parse()
            .map_err(|_| LedgerError::InvalidOrderId(order_id.to_string()))?;

        self.with_state(|state| {
            let transaction = state
                .transactions
                .get_mut(&id)
                .ok_or(LedgerError::TransactionNotFound(id))?;

            let next = status_from_notification(transaction_status, fraud_status)
                .ok_or_else(|| LedgerError::UnknownStatus(transaction_status.to_string()))?;

            let current = transaction.status;
            if current == next {
                return Ok(current);
            }
            if current.is_terminal() {
                warn!(
                    "Ignoring '{}' notification for transaction {}: already {}",
                    transaction_status, id, current
                );
                return Ok(current);
            }

            transaction.status = next;
            info!("Transaction {}: {} -> {}", id, current, next);
            Ok(next)
        })
    }

    /// Look up a transaction. Once it is paid, also mint a relay credential
    /// bound to it.
    pub fn transaction_with_credential(
        &self,
        id: i64,
    ) -> Result<(Transaction, Option<String>), LedgerError> {
        let transaction = self.transaction(id)?;

        let credential = if transaction.status == TransactionStatus::Success {
            Some(
                self.issuer
                    .issue(transaction.user_id, transaction.admin_id, transaction.id)?,
            )
        } else {
            None
        };

        Ok((transaction, credential))
    }

    pub fn transaction(&self, id: i64) -> Result<Transaction, LedgerError> {
        self.with_state(|state| {
            state
                .transactions
                .get(&id)
                .cloned()
                .ok_or(LedgerError::TransactionNotFound(id))
        })
    }
}

/// A pending record that has not been handed a checkout yet.
struct Reservation<'a> {
    ledger: &'a Ledger,
    id: i64,
    committed: bool,
}

impl Reservation<'_> {
    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        let id = self.id;
        match self.ledger.with_state(|state| Ok(state.transactions.remove(&id))) {
            Ok(Some(_)) => info!("Transaction {} discarded", id),
            Ok(None) => {}
            Err(e) => warn!("Could not discard transaction {}: {}", id, e),
        }
    }
}
