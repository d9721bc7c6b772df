//! Application configuration schemas.
//!
//! The merged configuration is built from `config/default.toml`, an
//! environment overlay `config/{env}.toml`, and `CYBERSHARE__*` environment
//! variables, in that order of precedence.

pub mod app;
pub mod auth;
pub mod cache;
pub mod content;
pub mod database;
pub mod logging;
pub mod mail;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, RateLimitConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::cache::{CacheConfig, CacheTtlConfig};
pub use self::content::ContentConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::{LogFormat, LoggingConfig};
pub use self::mail::{MailConfig, MailDriver, SmtpConfig, SmtpTls};
pub use self::storage::StorageConfig;

use crate::error::AppError;

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "CYBERSHARE";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Cache provider settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Content and community rules.
    #[serde(default)]
    pub content: ContentConfig,
    /// Outbound mail settings.
    #[serde(default)]
    pub mail: MailConfig,
    /// Uploaded image storage.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for the given environment name.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config", env)
    }

    /// Load configuration from an explicit directory.
    pub fn load_from(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Build a configuration with every default and the given database URL.
    pub fn with_database_url(url: impl Into<String>) -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::new(url),
            cache: CacheConfig::default(),
            auth: AuthConfig::default(),
            content: ContentConfig::default(),
            mail: MailConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = AppConfig::with_database_url("postgres://localhost/cybershare");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.jwt_refresh_ttl_days, 7);
        assert_eq!(config.content.password_reset_ttl_hours, 24);
        assert_eq!(config.content.trending_window_days, 7);
        assert_eq!(config.cache.provider, "memory");
    }

    #[test]
    fn test_load_from_missing_dir_requires_database_url() {
        let result = AppConfig::load_from("/nonexistent-cybershare-config", "test");
        assert!(result.is_err());
    }
}
