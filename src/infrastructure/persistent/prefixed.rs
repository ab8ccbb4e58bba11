//! Persistent store emulated with prefixed keys in a cache store
//!
//! Lower-fidelity mode for environments without a durable store: records are
//! kept in the same cache store under `prefix + key`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::key_value::{CacheStore, KeyValueRecord, PersistentStore};
use crate::domain::DomainError;

pub const DEFAULT_KEY_PREFIX: &str = "cassandra_";

pub struct PrefixedCacheStore {
    cache: Arc<dyn CacheStore>,
    prefix: String,
}

impl std::fmt::Debug for PrefixedCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefixedCacheStore")
            .field("cache", &self.cache.backend())
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl PrefixedCacheStore {
    pub fn new(cache: Arc<dyn CacheStore>, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
        }
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn as_storage_error(err: DomainError) -> DomainError {
        match err {
            DomainError::Cache { message } => DomainError::storage(message),
            other => other,
        }
    }
}

#[async_trait]
impl PersistentStore for PrefixedCacheStore {
    async fn select_by_id(&self, key: &str) -> Result<Option<KeyValueRecord>, DomainError> {
        let value = self
            .cache
            .get(&self.prefixed(key))
            .await
            .map_err(Self::as_storage_error)?;

        Ok(value.map(|value| KeyValueRecord::new(key, value)))
    }

    async fn insert(&self, record: KeyValueRecord) -> Result<(), DomainError> {
        self.cache
            .set(&self.prefixed(record.key()), record.value())
            .await
            .map_err(Self::as_storage_error)
    }

    async fn update(&self, record: KeyValueRecord) -> Result<(), DomainError> {
        self.insert(record).await
    }

    async fn delete_by_id(&self, key: &str) -> Result<(), DomainError> {
        self.cache
            .delete(&self.prefixed(key))
            .await
            .map(|_| ())
            .map_err(Self::as_storage_error)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        self.cache.ping().await.map_err(Self::as_storage_error)
    }

    fn backend(&self) -> &'static str {
        "prefixed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::key_value::MockCacheStore;
    use crate::infrastructure::cache::InMemoryCacheStore;

    #[tokio::test]
    async fn test_records_live_under_prefixed_keys() {
        let cache: Arc<dyn CacheStore> = Arc::new(InMemoryCacheStore::new());
        let store = PrefixedCacheStore::new(cache.clone(), DEFAULT_KEY_PREFIX);

        store.insert(KeyValueRecord::new("k1", "v1")).await.unwrap();

        assert_eq!(
            cache.get("cassandra_k1").await.unwrap(),
            Some("v1".to_string())
        );
        assert!(cache.get("k1").await.unwrap().is_none());

        let record = store.select_by_id("k1").await.unwrap().unwrap();
        assert_eq!(record, KeyValueRecord::new("k1", "v1"));
    }

    #[tokio::test]
    async fn test_delete_removes_prefixed_key_only() {
        let cache: Arc<dyn CacheStore> = Arc::new(InMemoryCacheStore::new());
        cache.set("k1", "plain").await.unwrap();

        let store = PrefixedCacheStore::new(cache.clone(), "p_");
        store.insert(KeyValueRecord::new("k1", "v1")).await.unwrap();
        store.delete_by_id("k1").await.unwrap();

        assert!(store.select_by_id("k1").await.unwrap().is_none());
        assert_eq!(cache.get("k1").await.unwrap(), Some("plain".to_string()));
    }

    #[tokio::test]
    async fn test_cache_errors_become_storage_errors() {
        let mut mock = MockCacheStore::new();
        mock.expect_get()
            .returning(|_| Err(DomainError::cache("connection refused")));

        let store = PrefixedCacheStore::new(Arc::new(mock), DEFAULT_KEY_PREFIX);
        let err = store.select_by_id("k1").await.unwrap_err();

        assert!(matches!(err, DomainError::Storage { .. }));
    }
}
