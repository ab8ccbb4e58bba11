//! Persistent store factory for runtime selection

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::PersistentSettings;
use crate::domain::key_value::{CacheStore, PersistentStore};
use crate::domain::DomainError;

use super::in_memory::InMemoryPersistentStore;
use super::postgres::{PostgresConfig, PostgresPersistentStore};
use super::prefixed::PrefixedCacheStore;

/// Supported persistent store backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistentType {
    /// No persistent store; reads report it unavailable, writes skip it
    #[default]
    Disabled,
    /// PostgreSQL table
    Postgres,
    /// In-process map
    InMemory,
    /// Prefixed keys in the cache store
    Prefixed,
}

impl std::fmt::Display for PersistentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistentType::Disabled => write!(f, "disabled"),
            PersistentType::Postgres => write!(f, "postgres"),
            PersistentType::InMemory => write!(f, "in_memory"),
            PersistentType::Prefixed => write!(f, "prefixed"),
        }
    }
}

impl std::str::FromStr for PersistentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "disabled" | "none" | "" => Ok(PersistentType::Disabled),
            "postgres" | "postgresql" => Ok(PersistentType::Postgres),
            "in_memory" | "inmemory" | "memory" => Ok(PersistentType::InMemory),
            "prefixed" => Ok(PersistentType::Prefixed),
            _ => Err(DomainError::configuration(format!(
                "Unknown persistent backend: {}. Valid backends: disabled, postgres, in_memory, prefixed",
                s
            ))),
        }
    }
}

/// Factory for creating persistent store instances
#[derive(Debug, Default)]
pub struct PersistentStoreFactory;

impl PersistentStoreFactory {
    /// Creates the configured persistent store, or `None` when disabled
    ///
    /// The prefixed backend shares `cache`. For PostgreSQL the records table is
    /// created if possible; an unreachable database only produces a warning.
    pub async fn create(
        settings: &PersistentSettings,
        cache: Arc<dyn CacheStore>,
    ) -> Result<Option<Arc<dyn PersistentStore>>, DomainError> {
        let persistent_type: PersistentType = settings.backend.parse()?;
        info!("Persistent store backend: {}", persistent_type);

        match persistent_type {
            PersistentType::Disabled => Ok(None),
            PersistentType::InMemory => Ok(Some(Arc::new(InMemoryPersistentStore::new()))),
            PersistentType::Prefixed => Ok(Some(Arc::new(PrefixedCacheStore::new(
                cache,
                settings.key_prefix.clone(),
            )))),
            PersistentType::Postgres => {
                let url = settings.url.clone().ok_or_else(|| {
                    DomainError::configuration("URL is required for the postgres backend")
                })?;

                let config = PostgresConfig::new(url)
                    .with_table(settings.table.clone())
                    .with_max_connections(settings.max_connections)
                    .with_acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs));

                let store = PostgresPersistentStore::connect_lazy(&config)?;

                if let Err(e) = store.table_ready().await {
                    warn!(error = %e, "Could not ensure persistent table; retrying on first use");
                }

                Ok(Some(Arc::new(store)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::InMemoryCacheStore;

    fn cache() -> Arc<dyn CacheStore> {
        Arc::new(InMemoryCacheStore::new())
    }

    #[test]
    fn test_persistent_type_from_str() {
        assert_eq!("disabled".parse::<PersistentType>().unwrap(), PersistentType::Disabled);
        assert_eq!("".parse::<PersistentType>().unwrap(), PersistentType::Disabled);
        assert_eq!("PostgreSQL".parse::<PersistentType>().unwrap(), PersistentType::Postgres);
        assert_eq!("memory".parse::<PersistentType>().unwrap(), PersistentType::InMemory);
        assert_eq!("prefixed".parse::<PersistentType>().unwrap(), PersistentType::Prefixed);
        assert!("cassandra".parse::<PersistentType>().is_err());
    }

    #[tokio::test]
    async fn test_factory_disabled() {
        let settings = PersistentSettings::default();

        let store = PersistentStoreFactory::create(&settings, cache()).await.unwrap();
        assert!(store.is_none());
    }

    #[tokio::test]
    async fn test_factory_prefixed_shares_cache() {
        let cache = cache();
        let settings = PersistentSettings {
            backend: "prefixed".to_string(),
            ..Default::default()
        };

        let store = PersistentStoreFactory::create(&settings, cache.clone())
            .await
            .unwrap()
            .unwrap();
        store
            .insert(crate::domain::KeyValueRecord::new("k", "v"))
            .await
            .unwrap();

        assert_eq!(store.backend(), "prefixed");
        assert_eq!(cache.get("cassandra_k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_factory_postgres_requires_url() {
        let settings = PersistentSettings {
            backend: "postgres".to_string(),
            url: None,
            ..Default::default()
        };

        let result = PersistentStoreFactory::create(&settings, cache()).await;
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}
