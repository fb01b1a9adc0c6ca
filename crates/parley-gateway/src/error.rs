use thiserror::Error;

use parley_crypto::TokenError;
use parley_ledger::LedgerError;
use parley_types::models::Party;

/// WebSocket close codes sent when a relay connection is refused or ended.
pub mod close_code {
    pub const INVALID_CREDENTIAL: u16 = 4001;
    pub const NOT_FOUND: u16 = 4004;
    pub const EXPIRED: u16 = 4008;
    pub const ALREADY_ACTIVE: u16 = 4009;
    pub const INTERNAL: u16 = 1011;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("{0} already has an active session")]
    AlreadyActive(Party),
}

/// Why a connection was refused before relaying started.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid credential: {0}")]
    InvalidCredential(#[from] TokenError),
    #[error("transaction {0} not found")]
    TransactionNotFound(i64),
    #[error("transaction {0} has expired")]
    TransactionExpired(i64),
    #[error(transparent)]
    Conflict(#[from] RegistryError),
    #[error("ledger unavailable: {0}")]
    Ledger(LedgerError),
}

impl RelayError {
    pub fn close_code(&self) -> u16 {
        match self {
            Self::InvalidCredential(_) => close_code::INVALID_CREDENTIAL,
            Self::TransactionNotFound(_) => close_code::NOT_FOUND,
            Self::TransactionExpired(_) => close_code::EXPIRED,
            Self::Conflict(_) => close_code::ALREADY_ACTIVE,
            Self::Ledger(_) => close_code::INTERNAL,
        }
    }
}

impl From<LedgerError> for RelayError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::TransactionNotFound(id) => Self::TransactionNotFound(id),
            other => Self::Ledger(other),
        }
    }
}
