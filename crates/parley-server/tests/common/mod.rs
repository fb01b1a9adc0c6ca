//! Shared helpers for the server integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

use parley_api::AppStateInner;
use parley_crypto::TokenIssuer;
use parley_gateway::{Relay, RelayConfig, SessionRegistry};
use parley_ledger::Ledger;
use parley_payment::OfflineGateway;
use parley_types::models::Party;

pub type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct ServerOptions {
    pub transaction_ttl: chrono::Duration,
    pub session_ttl: Duration,
    pub heartbeat_interval: Duration,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            transaction_ttl: chrono::Duration::minutes(10),
            session_ttl: Duration::from_secs(600),
            heartbeat_interval: RelayConfig::default().heartbeat_interval,
        }
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub registry: SessionRegistry,
    pub http: reqwest::Client,
}

pub async fn spawn_server(options: ServerOptions) -> TestServer {
    let ledger = Arc::new(Ledger::with_transaction_ttl(
        TokenIssuer::new("integration-secret"),
        Arc::new(OfflineGateway::new("http://localhost")),
        options.transaction_ttl,
    ));
    let registry = SessionRegistry::new();
    let relay = Relay::new(
        ledger.clone(),
        registry.clone(),
        RelayConfig {
            session_ttl: options.session_ttl,
            heartbeat_interval: options.heartbeat_interval,
        },
    );
    let app = parley_api::router(Arc::new(AppStateInner { ledger, relay }));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        addr,
        registry,
        http: reqwest::Client::new(),
    }
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn relay_url(&self, token: &str, role: &str) -> String {
        format!("ws://{}/relay?token={}&role={}", self.addr, token, role)
    }

    pub async fn post(&self, path: &str, body: Value) -> (reqwest::StatusCode, Value) {
        let response = self.http.post(self.url(path)).json(&body).send().await.unwrap();
        let status = response.status();
        (status, response.json().await.unwrap_or(Value::Null))
    }

    pub async fn get(&self, path: &str) -> (reqwest::StatusCode, Value) {
        let response = self.http.get(self.url(path)).send().await.unwrap();
        let status = response.status();
        (status, response.json().await.unwrap_or(Value::Null))
    }

    /// Create user and admin, open a transaction and settle it. Returns the
    /// transaction id and its relay token.
    pub async fn paid_transaction(&self, user_id: i64, admin_id: i64) -> (i64, String) {
        self.post("/users", json!({ "id": user_id })).await;
        self.post("/admins", json!({ "id": admin_id })).await;

        let (status, body) = self
            .post(
                "/transactions",
                json!({ "user_id": user_id, "admin_id": admin_id, "price": 1000 }),
            )
            .await;
        assert_eq!(status, reqwest::StatusCode::CREATED, "{}", body);
        let id = body["transaction"]["id"].as_i64().unwrap();

        let (status, _) = self
            .post(
                "/payment-webhook",
                json!({
                    "order_id": id.to_string(),
                    "transaction_status": "settlement",
                    "fraud_status": "accept"
                }),
            )
            .await;
        assert_eq!(status, reqwest::StatusCode::OK);

        let (_, body) = self.get(&format!("/transactions/{}", id)).await;
        let token = body["token"].as_str().unwrap().to_string();
        (id, token)
    }

    /// Mint a new relay token for an already paid transaction.
    pub async fn fresh_token(&self, transaction_id: i64) -> String {
        let (_, body) = self.get(&format!("/transactions/{}", transaction_id)).await;
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn connect(&self, token: &str, role: &str) -> Socket {
        let (socket, _) = connect_async(self.relay_url(token, role))
            .await
            .expect("failed to connect relay socket");
        socket
    }

    /// Wait until the registry reports the party as connected (or not).
    pub async fn wait_for(&self, party: Party, active: bool) {
        for _ in 0..200 {
            if self.registry.is_active(party).await == active {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("{} never became {}", party, if active { "active" } else { "inactive" });
    }
}

/// Next data or close message, skipping heartbeat frames.
pub async fn next_message(socket: &mut Socket) -> Message {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("timed out waiting for a message")
            .expect("socket ended without a message")
            .expect("socket error");
        match msg {
            Message::Ping(_) | Message::Pong(_) => continue,
            other => return other,
        }
    }
}

/// Read until a close frame and return its code and reason.
pub async fn close_code(socket: &mut Socket) -> (u16, String) {
    match next_message(socket).await {
        Message::Close(Some(frame)) => (u16::from(frame.code), frame.reason.as_str().to_owned()),
        other => panic!("expected a close frame, got {:?}", other),
    }
}

/// Ping the server and wait for its pong. Frames sent before the ping have
/// been handled by the server once this returns.
pub async fn round_trip(socket: &mut Socket) {
    socket.send(Message::Ping("sync".into())).await.unwrap();
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("timed out waiting for a pong")
            .expect("socket ended before the pong")
            .expect("socket error");
        if let Message::Pong(payload) = msg {
            assert_eq!(&payload[..], b"sync");
            return;
        }
    }
}
