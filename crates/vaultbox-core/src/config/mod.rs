//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field has a default so an empty file is valid.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod share;
pub mod storage;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::database::{DatabaseConfig, DatabaseProvider};
pub use self::logging::LoggingConfig;
pub use self::share::ShareConfig;
pub use self::storage::{StorageConfig, StorageProviderKind};
pub use self::worker::WorkerConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Identity token settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Object storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Share link settings.
    #[serde(default)]
    pub share: ShareConfig,
    /// Background worker settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `{dir}/default.toml` with an environment-specific overlay
    /// `{dir}/{env}.toml` and environment variables shaped like
    /// `VAULTBOX__SHARE__TOKEN_LENGTH`.
    pub fn load(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("VAULTBOX")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the service unusable.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.jwt_secret.is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must not be empty"));
        }
        if self.share.token_max_attempts == 0 {
            return Err(AppError::configuration(
                "share.token_max_attempts must be at least 1",
            ));
        }
        if self.share.default_permissions.is_empty() {
            return Err(AppError::configuration(
                "share.default_permissions must not be empty",
            ));
        }
        Ok(())
    }
}
