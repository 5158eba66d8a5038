use std::path::PathBuf;
use std::sync::Arc;

use fabric_client::HttpConnector;
use grant_core::{GatewayConfig, Orchestrator};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }

    /// State backed by the HTTP gateway transport.
    pub fn for_root(root: PathBuf, config: GatewayConfig) -> Self {
        Self::new(Orchestrator::new(root, config, Arc::new(HttpConnector::new())))
    }
}
