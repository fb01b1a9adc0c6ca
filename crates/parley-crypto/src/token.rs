use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use parley_types::api::Claims;

/// Default credential lifetime.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::hours(1);

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("credential signature does not match")]
    InvalidSignature,
    #[error("credential is malformed")]
    Malformed,
    #[error("credential has expired")]
    Expired,
    #[error("failed to sign credential: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
}

/// What a verified credential entitles its bearer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grant {
    pub user_id: i64,
    pub admin_id: i64,
    pub transaction_id: i64,
}

/// Mints and checks relay credentials. Holds only immutable key material, so
/// it can be shared freely and verification never takes a lock.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, DEFAULT_TOKEN_TTL)
    }

    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(
        &self,
        user_id: i64,
        admin_id: i64,
        transaction_id: i64,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            user_id,
            admin_id,
            transaction_id,
            iat: now.timestamp().max(0) as usize,
            exp: (now + self.ttl).timestamp().max(0) as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Encoding)
    }

    pub fn verify(&self, token: &str) -> Result<Grant, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;

        Ok(Grant {
            user_id: data.claims.user_id,
            admin_id: data.claims.admin_id,
            transaction_id: data.claims.transaction_id,
        })
    }
}
