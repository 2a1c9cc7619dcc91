use std::sync::Arc;

use crate::config::AppConfig;
use crate::store::DocumentStore;

/// Shared application state handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.security.jwt_secret
    }
}
