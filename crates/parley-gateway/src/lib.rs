pub mod error;
pub mod registry;
pub mod relay;

pub use error::{RegistryError, RelayError};
pub use registry::{PeerHandle, Registration, RelayFrame, SessionRegistry};
pub use relay::{Relay, RelayConfig, Session};
