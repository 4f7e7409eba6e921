//! Application state shared across all handlers.

use std::sync::Arc;

use presence_core::config::AppConfig;
use presence_realtime::server::RealtimeEngine;

/// Shared application state, cloned into every handler by Axum.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
    /// Realtime presence engine.
    pub realtime: Arc<RealtimeEngine>,
}

impl AppState {
    /// Builds the state and the realtime engine from configuration.
    pub fn new(config: AppConfig) -> Self {
        let realtime = Arc::new(RealtimeEngine::new(&config.presence));
        Self {
            config: Arc::new(config),
            realtime,
        }
    }
}
