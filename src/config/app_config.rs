use serde::Deserialize;

use crate::infrastructure::observability::MetricsConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub cache: CacheSettings,
    pub persistent: PersistentSettings,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Cache store settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// `redis` or `in_memory`
    pub backend: String,
    pub url: String,
    /// Namespace prepended as `prefix:key`
    pub key_prefix: Option<String>,
    pub connection_timeout_secs: u64,
    /// Entry limit for the in-memory backend
    pub max_capacity: u64,
}

/// Persistent store settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PersistentSettings {
    /// `disabled`, `postgres`, `in_memory` or `prefixed`
    pub backend: String,
    /// Required for `postgres`
    pub url: Option<String>,
    pub table: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Key prefix used by the `prefixed` backend
    pub key_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: "redis".to_string(),
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: None,
            connection_timeout_secs: 5,
            max_capacity: 100_000,
        }
    }
}

impl Default for PersistentSettings {
    fn default() -> Self {
        Self {
            backend: "disabled".to_string(),
            url: None,
            table: "key_value".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 5,
            key_prefix: crate::infrastructure::persistent::DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from `config/default`, `config/local` and `APP__*` env vars
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
