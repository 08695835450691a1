//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod admission;
pub mod app;
pub mod coordination;
pub mod database;
pub mod enrollment;
pub mod lock;
pub mod logging;

use serde::{Deserialize, Serialize};

pub use self::admission::AdmissionConfig;
pub use self::app::ServerConfig;
pub use self::coordination::{CoordinationConfig, RedisCoordinationConfig};
pub use self::database::DatabaseConfig;
pub use self::enrollment::EnrollmentConfig;
pub use self::lock::LockConfig;
pub use self::logging::LoggingConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Coordination store (lock backend) settings.
    #[serde(default)]
    pub coordination: CoordinationConfig,
    /// Request admission (token bucket) settings.
    #[serde(default)]
    pub admission: AdmissionConfig,
    /// Course lock lease settings.
    #[serde(default)]
    pub lock: LockConfig,
    /// Enrollment retry and deadline settings.
    #[serde(default)]
    pub enrollment: EnrollmentConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `COURSEHUB__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config", env)
    }

    /// Load configuration from an explicit directory.
    pub fn load_from(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("COURSEHUB")
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

    /// Parse a configuration from an in-memory TOML document.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
            .map_err(AppError::from)
    }
}
