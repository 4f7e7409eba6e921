//! Presence status definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Doctor presence status.
///
/// Serialized as a plain string. Values other than the three known ones are
/// kept verbatim in [`PresenceStatus::Custom`] so clients can define their own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PresenceStatus {
    /// Doctor is connected and recently interacted.
    #[default]
    Active,
    /// Doctor is connected but idle, or marked themselves away.
    Away,
    /// Doctor left. Only ever broadcast, never stored.
    Offline,
    /// Client-defined status.
    Custom(String),
}

impl PresenceStatus {
    /// Converts to string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Away => "away",
            Self::Offline => "offline",
            Self::Custom(s) => s,
        }
    }

    /// Whether a record may hold this status while it is in the registry.
    pub fn is_resident(&self) -> bool {
        !matches!(self, Self::Offline)
    }
}

impl From<String> for PresenceStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "active" => Self::Active,
            "away" => Self::Away,
            "offline" => Self::Offline,
            _ => Self::Custom(s),
        }
    }
}

impl From<&str> for PresenceStatus {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<PresenceStatus> for String {
    fn from(status: PresenceStatus) -> Self {
        match status {
            PresenceStatus::Custom(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
