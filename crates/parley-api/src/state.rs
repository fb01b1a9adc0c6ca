use std::sync::Arc;

use parley_gateway::Relay;
use parley_ledger::Ledger;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub ledger: Arc<Ledger>,
    pub relay: Relay,
}
