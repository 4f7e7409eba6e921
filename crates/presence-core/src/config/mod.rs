//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! optional TOML files, `PRESENCE__`-prefixed environment variables and the
//! bare `HOST`/`PORT` variables. Every field has a default, so the service
//! starts with no configuration at all.

pub mod app;
pub mod logging;
pub mod presence;

use serde::{Deserialize, Serialize};

use self::app::ServerConfig;
use self::logging::LoggingConfig;
use self::presence::PresenceConfig;

use crate::error::AppError;
use crate::result::AppResult;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP/WebSocket listener settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Presence engine settings.
    #[serde(default)]
    pub presence: PresenceConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for the given environment name.
    ///
    /// Merges `config/default`, the `config/{env}` overlay, environment
    /// variables prefixed with `PRESENCE__` and finally `HOST`/`PORT`.
    pub fn load(env: &str) -> AppResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("PRESENCE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.host", std::env::var("HOST").ok())?
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        Self::from_config(config)
    }

    /// Deserialize and validate an already-built configuration.
    pub fn from_config(config: config::Config) -> AppResult<Self> {
        let app: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        app.validate()?;
        Ok(app)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> AppResult<()> {
        if self.presence.sweep_interval_seconds == 0 {
            return Err(AppError::configuration(
                "presence.sweep_interval_seconds must be greater than zero",
            ));
        }
        if self.presence.channel_buffer_size == 0 {
            return Err(AppError::configuration(
                "presence.channel_buffer_size must be greater than zero",
            ));
        }
        if self.presence.max_message_bytes == 0 {
            return Err(AppError::configuration(
                "presence.max_message_bytes must be greater than zero",
            ));
        }
        Ok(())
    }
}
