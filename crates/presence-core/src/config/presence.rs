//! Presence engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Presence engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// Idle time after which an active doctor is demoted to away.
    #[serde(default = "default_inactivity_threshold")]
    pub inactivity_threshold_seconds: u64,
    /// Period of the inactivity sweep.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Outbound queue depth per connection.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Maximum accepted inbound frame size in bytes.
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
}

impl PresenceConfig {
    /// Inactivity threshold as a [`Duration`].
    pub fn inactivity_threshold(&self) -> Duration {
        Duration::from_secs(self.inactivity_threshold_seconds)
    }

    /// Sweep period as a [`Duration`].
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            inactivity_threshold_seconds: default_inactivity_threshold(),
            sweep_interval_seconds: default_sweep_interval(),
            channel_buffer_size: default_channel_buffer(),
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

fn default_inactivity_threshold() -> u64 {
    300
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_channel_buffer() -> usize {
    256
}

fn default_max_message_bytes() -> usize {
    65_536
}
