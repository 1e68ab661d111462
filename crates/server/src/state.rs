use corsaro_core::{Config, Indexer, SanitizedConfig};
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    config: Config,
    indexer: Arc<dyn Indexer>,
}

impl AppState {
    pub fn new(config: Config, indexer: Arc<dyn Indexer>) -> Self {
        Self { config, indexer }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn indexer(&self) -> &dyn Indexer {
        self.indexer.as_ref()
    }
}
