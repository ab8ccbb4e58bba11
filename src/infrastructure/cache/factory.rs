//! Cache store factory for runtime selection

use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheSettings;
use crate::domain::key_value::CacheStore;
use crate::domain::DomainError;

use super::in_memory::{InMemoryCacheConfig, InMemoryCacheStore};
use super::redis::{RedisCacheConfig, RedisCacheStore};

/// Supported cache store backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheType {
    /// Redis or Valkey
    #[default]
    Redis,
    /// In-process store using moka
    InMemory,
}

impl std::fmt::Display for CacheType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheType::Redis => write!(f, "redis"),
            CacheType::InMemory => write!(f, "in_memory"),
        }
    }
}

impl std::str::FromStr for CacheType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redis" | "valkey" => Ok(CacheType::Redis),
            "in_memory" | "inmemory" | "memory" => Ok(CacheType::InMemory),
            _ => Err(DomainError::configuration(format!(
                "Unknown cache backend: {}. Valid backends: redis, in_memory",
                s
            ))),
        }
    }
}

/// Factory for creating cache store instances
#[derive(Debug, Default)]
pub struct CacheStoreFactory;

impl CacheStoreFactory {
    /// Creates a cache store based on configuration
    pub fn create(settings: &CacheSettings) -> Result<Arc<dyn CacheStore>, DomainError> {
        let cache_type: CacheType = settings.backend.parse()?;

        match cache_type {
            CacheType::Redis => {
                let mut config = RedisCacheConfig::new(settings.url.clone())
                    .with_connection_timeout(Duration::from_secs(
                        settings.connection_timeout_secs,
                    ));

                if let Some(prefix) = &settings.key_prefix {
                    config = config.with_key_prefix(prefix.clone());
                }

                Ok(Arc::new(RedisCacheStore::new(config)?))
            }
            CacheType::InMemory => {
                let config =
                    InMemoryCacheConfig::default().with_max_capacity(settings.max_capacity);

                Ok(Arc::new(InMemoryCacheStore::with_config(config)))
            }
        }
    }
}
