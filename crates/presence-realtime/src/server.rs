//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::info;

use presence_core::config::presence::PresenceConfig;
use presence_core::result::AppResult;

use crate::connection::manager::ConnectionManager;
use crate::connection::pool::ConnectionPool;
use crate::fanout::broadcaster::Broadcaster;
use crate::metrics::RealtimeMetrics;
use crate::presence::monitor::InactivityMonitor;
use crate::presence::tracker::PresenceTracker;

/// Central real-time engine that coordinates all WebSocket subsystems.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection manager.
    pub connections: Arc<ConnectionManager>,
    /// Presence state machine.
    pub presence: Arc<PresenceTracker>,
    /// Inactivity monitor.
    pub monitor: Arc<InactivityMonitor>,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine").finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine with all subsystems.
    pub fn new(config: &PresenceConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let metrics = Arc::new(RealtimeMetrics::new());
        let pool = Arc::new(ConnectionPool::new());
        let broadcaster = Arc::new(Broadcaster::new(pool.clone(), metrics.clone()));
        let presence = Arc::new(PresenceTracker::new(pool.clone(), broadcaster));
        let connections = Arc::new(ConnectionManager::new(
            config.clone(),
            pool,
            presence.clone(),
            metrics.clone(),
        ));
        let monitor = Arc::new(InactivityMonitor::new(presence.clone(), config));

        info!("Real-time engine initialized");

        Self {
            connections,
            presence,
            monitor,
            metrics,
            shutdown_tx,
        }
    }

    /// Starts the inactivity monitor on the current runtime.
    pub fn spawn_monitor(&self) -> JoinHandle<()> {
        tokio::spawn(self.monitor.clone().run(self.shutdown_tx.subscribe()))
    }

    /// Initiates a graceful shutdown of the real-time engine.
    pub async fn shutdown(&self) -> AppResult<()> {
        info!("Shutting down real-time engine");

        // Signal all tasks to stop
        let _ = self.shutdown_tx.send(());

        self.connections.close_all().await;

        info!("Real-time engine shut down");
        Ok(())
    }
}
