use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{RwLock, mpsc};
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

use parley_types::models::Party;

use crate::error::RegistryError;

/// Capacity of each connection's outbound frame channel. Frames beyond this
/// are dropped rather than buffered.
const SESSION_CHANNEL_CAPACITY: usize = 256;

/// A frame relayed verbatim from one party to the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayFrame {
    Text(String),
    Binary(Bytes),
}

/// Tracks at most one live connection per party.
///
/// The lock only guards the party -> connection mapping. Writes to a
/// connection go through its outbound channel, drained by that connection's
/// own relay loop, so concurrent senders never touch the socket directly.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    /// party -> live session
    sessions: RwLock<HashMap<Party, SessionEntry>>,
}

struct SessionEntry {
    conn_id: Uuid,
    transaction_id: i64,
    tx: mpsc::Sender<RelayFrame>,
}

/// Returned to the connection that won the slot for its party.
pub struct Registration {
    pub conn_id: Uuid,
    pub frames: mpsc::Receiver<RelayFrame>,
}

/// Transient handle to a registered peer, used for a single forward.
#[derive(Clone)]
pub struct PeerHandle {
    pub conn_id: Uuid,
    pub transaction_id: i64,
    tx: mpsc::Sender<RelayFrame>,
}

impl PeerHandle {
    /// Queue a frame for the peer without waiting. Returns `false` when the
    /// frame was dropped because the peer is gone or not keeping up.
    pub fn try_send(&self, frame: RelayFrame) -> bool {
        match self.tx.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Closed(_)) => false,
        }
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot for `party`. The check and the insert happen under one
    /// write lock; if the party already has a session nothing changes.
    pub async fn try_register(
        &self,
        party: Party,
        transaction_id: i64,
    ) -> Result<Registration, RegistryError> {
        let mut sessions = self.inner.sessions.write().await;
        if sessions.contains_key(&party) {
            return Err(RegistryError::AlreadyActive(party));
        }

        let conn_id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(SESSION_CHANNEL_CAPACITY);
        sessions.insert(
            party,
            SessionEntry {
                conn_id,
                transaction_id,
                tx,
            },
        );
        Ok(Registration {
            conn_id,
            frames: rx,
        })
    }

    /// Find the live connection for `party`, if any.
    pub async fn lookup_peer(&self, party: Party) -> Option<PeerHandle> {
        let sessions = self.inner.sessions.read().await;
        sessions.get(&party).map(|entry| PeerHandle {
            conn_id: entry.conn_id,
            transaction_id: entry.transaction_id,
            tx: entry.tx.clone(),
        })
    }

    /// Release the slot for `party`, but only if `conn_id` still owns it.
    pub async fn unregister(&self, party: Party, conn_id: Uuid) {
        let mut sessions = self.inner.sessions.write().await;
        if let Some(entry) = sessions.get(&party) {
            if entry.conn_id == conn_id {
                sessions.remove(&party);
            }
        }
    }

    pub async fn is_active(&self, party: Party) -> bool {
        self.inner.sessions.read().await.contains_key(&party)
    }

    pub async fn active_sessions(&self) -> usize {
        self.inner.sessions.read().await.len()
    }
}
