mod config;

use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use parley_api::AppStateInner;
use parley_crypto::TokenIssuer;
use parley_gateway::{Relay, RelayConfig, SessionRegistry};
use parley_ledger::{Ledger, PaymentGateway};
use parley_payment::{OfflineGateway, SnapClient};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "parley_server=debug,parley_gateway=debug,parley_ledger=debug,tower_http=debug"
                    .into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    let gateway: Arc<dyn PaymentGateway> = match &config.midtrans_server_key {
        Some(key) => {
            info!("Using Midtrans Snap ({:?})", config.midtrans_environment);
            Arc::new(SnapClient::new(key.clone(), config.midtrans_environment))
        }
        None => {
            warn!("PARLEY_MIDTRANS_SERVER_KEY not set, using offline checkout; confirm payments via /payment-webhook");
            Arc::new(OfflineGateway::new(config.public_base_url()))
        }
    };

    let token_ttl = chrono::Duration::from_std(config.token_ttl).context("PARLEY_TOKEN_TTL_SECS")?;
    let transaction_ttl =
        chrono::Duration::from_std(config.transaction_ttl).context("PARLEY_TRANSACTION_TTL_SECS")?;

    let ledger = Arc::new(Ledger::with_transaction_ttl(
        TokenIssuer::with_ttl(&config.jwt_secret, token_ttl),
        gateway,
        transaction_ttl,
    ));
    let relay = Relay::new(
        ledger.clone(),
        SessionRegistry::new(),
        RelayConfig {
            session_ttl: config.session_ttl,
            ..RelayConfig::default()
        },
    );

    let app = parley_api::router(Arc::new(AppStateInner { ledger, relay }))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = config.addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Parley server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
