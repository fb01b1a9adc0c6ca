//! Payment gateway adapters for the ledger's `PaymentGateway` port.

pub mod offline;
pub mod snap;

pub use offline::OfflineGateway;
pub use snap::{SnapClient, SnapEnvironment};
