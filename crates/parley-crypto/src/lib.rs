/// Parley Crypto Library
///
/// Relay credentials: HS256 JWTs binding a user, an admin and a transaction.
/// The token carries its own one hour validity window, independent of the
/// transaction's shorter expiry which the relay checks separately.

pub mod token;

pub use token::{Grant, TokenError, TokenIssuer};
