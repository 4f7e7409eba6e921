//! Periodic inactivity sweep that demotes idle doctors to away.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use presence_core::config::presence::PresenceConfig;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use super::tracker::PresenceTracker;

/// Runs the inactivity sweep on a fixed period.
#[derive(Debug)]
pub struct InactivityMonitor {
    tracker: Arc<PresenceTracker>,
    threshold: chrono::Duration,
    interval: Duration,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when a sweep ends, however it ends.
struct SweepGuard<'a>(&'a AtomicBool);

impl Drop for SweepGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl InactivityMonitor {
    /// Create a monitor from the presence configuration
    pub fn new(tracker: Arc<PresenceTracker>, config: &PresenceConfig) -> Self {
        Self {
            tracker,
            threshold: chrono::Duration::from_std(config.inactivity_threshold())
                .unwrap_or(chrono::Duration::MAX),
            interval: config.sweep_interval(),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Sweep every period until the shutdown signal fires.
    pub async fn run(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        info!(
            interval_secs = self.interval.as_secs(),
            threshold_secs = self.threshold.num_seconds(),
            "Inactivity monitor started"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                _ = ticker.tick() => {
                    self.sweep().await;
                }
            }
        }

        info!("Inactivity monitor stopped");
    }

    /// Sweep using the current time.
    pub async fn sweep(&self) -> Option<usize> {
        self.sweep_at(Utc::now()).await
    }

    /// Demote every active doctor idle longer than the threshold at `now`.
    ///
    /// Returns the number demoted, or `None` when another sweep was still
    /// running and this one was skipped.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Option<usize> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            debug!("Previous inactivity sweep still running, skipping");
            return None;
        }
        let _guard = SweepGuard(&self.in_flight);

        let mut demoted = 0;
        for doctor_id in self.tracker.idle_candidates(now, self.threshold).await {
            if self.tracker.auto_away(&doctor_id, now, self.threshold).await {
                demoted += 1;
            }
        }

        if demoted > 0 {
            info!(demoted, "Inactivity sweep complete");
        }
        Some(demoted)
    }
}
