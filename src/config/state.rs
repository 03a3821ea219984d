// Application state module
// Shared, read-only state handed to every request

use std::sync::Arc;

use super::types::Config;
use crate::ledger::{self, Connector, LedgerError, SessionPool};

/// Application state
pub struct AppState {
    pub config: Config,
    pub sessions: Arc<SessionPool>,
}

impl AppState {
    /// Create `AppState` with the connector selected by `ledger.backend`
    pub fn new(config: Config) -> Result<Self, LedgerError> {
        let connector = ledger::build_connector(&config.ledger)?;
        Ok(Self::with_connector(config, connector))
    }

    /// Create `AppState` around an explicit connector
    pub fn with_connector(config: Config, connector: Arc<dyn Connector>) -> Self {
        let sessions = Arc::new(SessionPool::new(
            connector,
            config.ledger.max_idle_sessions_per_role,
        ));
        Self { config, sessions }
    }
}
