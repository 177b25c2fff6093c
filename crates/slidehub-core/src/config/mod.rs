//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod automation;
pub mod cache;
pub mod library;
pub mod logging;
pub mod worker;

use serde::{Deserialize, Serialize};

use self::automation::AutomationConfig;
use self::cache::CacheConfig;
use self::library::LibraryConfig;
use self::logging::LoggingConfig;
use self::worker::WorkerConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Library layout settings (project roots, thumbnail size).
    #[serde(default)]
    pub library: LibraryConfig,
    /// Per-project database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Thumbnail cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Background worker settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Document automation host settings.
    #[serde(default)]
    pub automation: AutomationConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Per-project SQLite database configuration.
///
/// Every project root folder holds one database file; a connection pool
/// is opened per project so that background tasks can each hold their
/// own dedicated connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file name inside the project root folder.
    #[serde(default = "default_filename")]
    pub filename: String,
    /// Maximum number of connections in the per-project pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Connection acquire timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// SQLite busy timeout in seconds.
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            filename: default_filename(),
            max_connections: default_max_connections(),
            connect_timeout_seconds: default_connect_timeout(),
            busy_timeout_seconds: default_busy_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `SLIDEHUB__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SLIDEHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            library: LibraryConfig::default(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            worker: WorkerConfig::default(),
            automation: AutomationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_filename() -> String {
    "slidehub.db".to_string()
}

fn default_max_connections() -> u32 {
    8
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_busy_timeout() -> u64 {
    5
}
