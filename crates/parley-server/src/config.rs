use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, bail};
use tracing::warn;

use parley_payment::SnapEnvironment;

const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];
const DEFAULT_JWT_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub transaction_ttl: Duration,
    pub session_ttl: Duration,
    pub midtrans_server_key: Option<String>,
    pub midtrans_environment: SnapEnvironment,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get("PARLEY_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = match get("PARLEY_PORT") {
            Some(v) => v.parse().with_context(|| format!("PARLEY_PORT is not a port: {}", v))?,
            None => 8080,
        };

        let jwt_secret = get("PARLEY_JWT_SECRET").unwrap_or_else(|| DEFAULT_JWT_SECRET.into());
        if PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            warn!("PARLEY_JWT_SECRET is unset or still a placeholder; relay tokens are forgeable");
        }

        let midtrans_production = match get("PARLEY_MIDTRANS_PRODUCTION") {
            Some(v) => parse_bool(&v).context("PARLEY_MIDTRANS_PRODUCTION")?,
            None => false,
        };

        Ok(Self {
            host,
            port,
            jwt_secret,
            token_ttl: seconds(get("PARLEY_TOKEN_TTL_SECS"), "PARLEY_TOKEN_TTL_SECS", 3600)?,
            transaction_ttl: seconds(
                get("PARLEY_TRANSACTION_TTL_SECS"),
                "PARLEY_TRANSACTION_TTL_SECS",
                600,
            )?,
            session_ttl: seconds(get("PARLEY_SESSION_TTL_SECS"), "PARLEY_SESSION_TTL_SECS", 600)?,
            midtrans_server_key: get("PARLEY_MIDTRANS_SERVER_KEY"),
            midtrans_environment: if midtrans_production {
                SnapEnvironment::Production
            } else {
                SnapEnvironment::Sandbox
            },
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }

    /// Base URL advertised in offline checkout links.
    pub fn public_base_url(&self) -> String {
        let host = if self.host == "0.0.0.0" { "localhost" } else { &self.host };
        format!("http://{}:{}", host, self.port)
    }
}

fn seconds(value: Option<String>, key: &str, default: u64) -> anyhow::Result<Duration> {
    let secs = match value {
        Some(v) => v
            .parse::<u64>()
            .with_context(|| format!("{} must be a whole number of seconds, got {}", key, v))?,
        None => default,
    };
    if secs == 0 {
        bail!("{} must be greater than zero", key);
    }
    Ok(Duration::from_secs(secs))
}

fn parse_bool(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got {}", other),
    }
}
