use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use bytes::Bytes;
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use parley_ledger::Ledger;
use parley_types::models::{Party, Role};

use crate::error::{RelayError, close_code};
use crate::registry::{Registration, RelayFrame, SessionRegistry};

/// Heartbeat interval: server sends a Ping every 15 seconds.
/// If 2 consecutive Pongs are missed (~30s), the connection is dropped.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Default lifetime of a relay session, counted from registration.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, Copy)]
pub struct RelayConfig {
    pub session_ttl: Duration,
    pub heartbeat_interval: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            session_ttl: DEFAULT_SESSION_TTL,
            heartbeat_interval: HEARTBEAT_INTERVAL,
        }
    }
}

/// An authorized, registered connection that has not started relaying yet.
pub struct Session {
    pub party: Party,
    pub peer: Party,
    pub transaction_id: i64,
    pub registration: Registration,
}

enum SessionEnd {
    Disconnected,
    Expired,
    HeartbeatTimeout,
}

/// Pairs the user and admin connections of a paid transaction and forwards
/// frames between them.
#[derive(Clone)]
pub struct Relay {
    ledger: Arc<Ledger>,
    registry: SessionRegistry,
    config: RelayConfig,
}

impl Relay {
    pub fn new(ledger: Arc<Ledger>, registry: SessionRegistry, config: RelayConfig) -> Self {
        Self {
            ledger,
            registry,
            config,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Check the credential and the transaction behind it, then claim the
    /// party's session slot.
    pub async fn authorize(&self, token: &str, role: Role) -> Result<Session, RelayError> {
        let grant = self.ledger.issuer().verify(token)?;

        let transaction = self.ledger.transaction(grant.transaction_id)?;
        if transaction.is_expired(Utc::now()) {
            return Err(RelayError::TransactionExpired(transaction.id));
        }

        let (party, peer) = match role {
            Role::User => (Party::user(grant.user_id), Party::admin(grant.admin_id)),
            Role::Admin => (Party::admin(grant.admin_id), Party::user(grant.user_id)),
        };

        let registration = self.registry.try_register(party, transaction.id).await?;

        Ok(Session {
            party,
            peer,
            transaction_id: transaction.id,
            registration,
        })
    }

    /// Handle one upgraded relay socket from authorization to teardown.
    ///
    /// A refused connection receives a close frame whose code and reason say
    /// why. Once relaying has started, the session ends on disconnect, on a
    /// transport error, on heartbeat timeout or when the session deadline
    /// passes.
    pub async fn handle_connection(self, mut socket: WebSocket, token: String, role: Role) {
        let session = match self.authorize(&token, role).await {
            Ok(session) => session,
            Err(e) => {
                warn!("Relay connection refused ({}): {}", role, e);
                let frame = CloseFrame {
                    code: e.close_code(),
                    reason: e.to_string().into(),
                };
                let _ = socket.send(Message::Close(Some(frame))).await;
                return;
            }
        };

        self.run_session(socket, session).await;
    }

    async fn run_session(&self, socket: WebSocket, session: Session) {
        let Session {
            party,
            peer,
            transaction_id,
            registration,
        } = session;
        let Registration {
            conn_id,
            mut frames,
        } = registration;

        info!(
            "{} joined relay for transaction {} (conn {})",
            party, transaction_id, conn_id
        );

        let (mut sender, mut receiver) = socket.split();

        let deadline = Instant::now() + self.config.session_ttl;
        let expiry = tokio::time::sleep_until(deadline);
        tokio::pin!(expiry);

        let mut heartbeat = tokio::time::interval(self.config.heartbeat_interval);
        heartbeat.tick().await;
        let mut pong_received = true;
        let mut missed_heartbeats: u8 = 0;

        let end = loop {
            tokio::select! {
                inbound = receiver.next() => {
                    let msg = match inbound {
                        Some(Ok(msg)) => msg,
                        Some(Err(e)) => {
                            debug!("{} read error: {}", party, e);
                            break SessionEnd::Disconnected;
                        }
                        None => break SessionEnd::Disconnected,
                    };

                    if Instant::now() >= deadline {
                        break SessionEnd::Expired;
                    }

                    match msg {
                        Message::Text(text) => {
                            self.forward(party, peer, transaction_id, RelayFrame::Text(text.as_str().to_owned()))
                                .await;
                        }
                        Message::Binary(data) => {
                            self.forward(party, peer, transaction_id, RelayFrame::Binary(data))
                                .await;
                        }
                        Message::Pong(_) => pong_received = true,
                        Message::Close(_) => break SessionEnd::Disconnected,
                        Message::Ping(_) => {}
                    }
                }
                outbound = frames.recv() => {
                    let Some(frame) = outbound else {
                        break SessionEnd::Disconnected;
                    };
                    let msg = match frame {
                        RelayFrame::Text(text) => Message::Text(text.into()),
                        RelayFrame::Binary(data) => Message::Binary(data),
                    };
                    if sender.send(msg).await.is_err() {
                        break SessionEnd::Disconnected;
                    }
                }
                _ = heartbeat.tick() => {
                    if std::mem::replace(&mut pong_received, false) {
                        missed_heartbeats = 0;
                    } else {
                        missed_heartbeats += 1;
                        if missed_heartbeats >= 2 {
                            break SessionEnd::HeartbeatTimeout;
                        }
                    }
                    if sender.send(Message::Ping(Bytes::new())).await.is_err() {
                        break SessionEnd::Disconnected;
                    }
                }
                _ = &mut expiry => break SessionEnd::Expired,
            }
        };

        match end {
            SessionEnd::Expired => {
                info!("{} session for transaction {} expired", party, transaction_id);
                let frame = CloseFrame {
                    code: close_code::EXPIRED,
                    reason: "session expired".into(),
                };
                let _ = sender.send(Message::Close(Some(frame))).await;
            }
            SessionEnd::HeartbeatTimeout => {
                warn!(
                    "Heartbeat timeout (missed {} pongs), dropping {}",
                    missed_heartbeats, party
                );
            }
            SessionEnd::Disconnected => {}
        }
        let _ = sender.close().await;

        self.registry.unregister(party, conn_id).await;
        info!("{} left relay for transaction {}", party, transaction_id);
    }

    /// Best-effort delivery: the frame is dropped when the peer is not
    /// connected, is connected for a different transaction, or is not
    /// draining its queue.
    async fn forward(&self, from: Party, to: Party, transaction_id: i64, frame: RelayFrame) {
        match self.registry.lookup_peer(to).await {
            Some(peer) if peer.transaction_id == transaction_id => {
                if !peer.try_send(frame) {
                    debug!("{} -> {}: peer queue unavailable, frame dropped", from, to);
                }
            }
            Some(_) => trace!("{} -> {}: peer is in another session, frame dropped", from, to),
            None => trace!("{} -> {}: peer not connected, frame dropped", from, to),
        }
    }
}
