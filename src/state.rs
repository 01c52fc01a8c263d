use std::sync::Arc;

use crate::config::Config;
use crate::services::{SessionService, SessionStore};
use crate::websocket::Gateway;

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<SessionStore>,
    pub sessions: SessionService,
    pub gateway: Arc<Gateway>,
}

impl AppState {
    /// Wire a fresh, empty store into the registry and the gateway
    pub fn new(config: Config) -> Self {
        let store = Arc::new(SessionStore::new());
        let gateway = Arc::new(Gateway::new(store.clone(), config.outbound_buffer));
        Self {
            config: Arc::new(config),
            sessions: SessionService::new(store.clone()),
            store,
            gateway,
        }
    }
}
