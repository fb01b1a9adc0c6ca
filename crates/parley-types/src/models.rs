use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    pub id: i64,
}

/// Lifecycle of a paid transaction.
///
/// `pending -> pending_payment -> {success, fraud, failed}`. The last three
/// are terminal and never change once reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    PendingPayment,
    Success,
    Fraud,
    Failed,
}

impl TransactionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Fraud | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PendingPayment => "pending_payment",
            Self::Success => "success",
            Self::Fraud => "fraud",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub admin_id: i64,
    /// Amount in the smallest currency unit, as sent to the payment gateway.
    pub price: i64,
    pub status: TransactionStatus,
    pub expires_at: DateTime<Utc>,
}

impl Transaction {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Non-terminal and not yet expired. An active transaction blocks a new
    /// one for the same user/admin pair.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_terminal() && !self.is_expired(now)
    }
}

/// Which side of a paired session a connection speaks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}', expected 'user' or 'admin'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A user or an admin, identified by role + id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Party {
    pub role: Role,
    pub id: i64,
}

impl Party {
    pub fn user(id: i64) -> Self {
        Self { role: Role::User, id }
    }

    pub fn admin(id: i64) -> Self {
        Self { role: Role::Admin, id }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.role, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn transaction(status: TransactionStatus, expires_in: Duration) -> Transaction {
        Transaction {
            id: 1,
            user_id: 1,
            admin_id: 2,
            price: 1000,
            status,
            expires_at: Utc::now() + expires_in,
        }
    }

    #[test]
    fn active_requires_non_terminal_and_unexpired() {
        let now = Utc::now();
        assert!(transaction(TransactionStatus::Pending, Duration::minutes(10)).is_active(now));
        assert!(transaction(TransactionStatus::PendingPayment, Duration::minutes(10)).is_active(now));
        assert!(!transaction(TransactionStatus::Success, Duration::minutes(10)).is_active(now));
        assert!(!transaction(TransactionStatus::Failed, Duration::minutes(10)).is_active(now));
        assert!(!transaction(TransactionStatus::PendingPayment, Duration::minutes(-1)).is_active(now));
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&TransactionStatus::PendingPayment).unwrap();
        assert_eq!(json, "\"pending_payment\"");
    }

    #[test]
    fn role_parsing_is_strict() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("Admin".parse::<Role>().is_err());
    }
}
