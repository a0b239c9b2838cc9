//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field carries a serde default so the server can start
//! without any configuration file at all.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::database::{DatabaseConfig, StoreBackend};
pub use self::logging::LoggingConfig;
pub use self::storage::StorageConfig;

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
const ENV_PREFIX: &str = "PSS";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Token and access-code settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Storage root and quota settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Credential store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for the given environment name.
    ///
    /// Merges `config/default.toml`, `config/{env}.toml` and environment
    /// variables prefixed with `PSS__` (e.g. `PSS__SERVER__PORT=8080`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(Self::env_source())
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Load configuration from an explicit file, still honouring `PSS__` overrides.
    pub fn load_file(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(true))
            .add_source(Self::env_source())
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to read '{path}': {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    fn env_source() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    /// A copy safe for display, with the token secret and database password masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.auth.token_secret = "****".to_string();
        copy.database.url = mask_password(&copy.database.url);
        copy
    }
}

/// Mask the password portion of a database URL for safe logging.
pub fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
            if colon_pos > scheme_end {
                return format!("{}:****@{}", &url[..colon_pos], &url[at_pos + 1..]);
            }
        }
    }
    url.to_string()
}
