//! Application configuration.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Platform gateway configuration.
    pub platforms: PlatformsConfig,
    /// Release tracking configuration.
    #[serde(default)]
    pub tracking: TrackingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Platform gateway configuration.
///
/// Platform lookups go through a remote function endpoint that proxies
/// the individual streaming services and storefronts.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformsConfig {
    /// Base URL of the remote function endpoint.
    pub function_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_platform_timeout_secs")]
    pub timeout_secs: u64,
}

/// Release tracking configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackingConfig {
    /// How long a new-release notification stays active, in days.
    #[serde(default = "default_notification_ttl_days")]
    pub notification_ttl_days: i64,
    /// Age in seconds after which an orphaned job lock may be taken over.
    #[serde(default = "default_stale_lock_secs")]
    pub stale_lock_secs: i64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            notification_ttl_days: default_notification_ttl_days(),
            stale_lock_secs: default_stale_lock_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_platform_timeout_secs() -> u64 {
    15
}

const fn default_notification_ttl_days() -> i64 {
    7
}

const fn default_stale_lock_secs() -> i64 {
    600
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `ENCORE_ENV`)
    /// 3. Environment variables with `ENCORE_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("ENCORE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("ENCORE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
