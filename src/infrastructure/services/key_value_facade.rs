//! Dual-store key-value facade
//!
//! Every operation calls the cache store and then the persistent store. A
//! failing store never stops the other one and never turns into an error for
//! the caller; each store's result is reported separately instead.

use std::fmt::Debug;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::domain::key_value::{CacheStore, KeyValueRecord, PersistentStore};
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_store_operation, StoreCallOutcome};

pub const NOT_FOUND: &str = "Not found";
pub const SERVICE_UNAVAILABLE: &str = "Service unavailable";

const CACHE: &str = "cache";
const PERSISTENT: &str = "persistent";

/// What a single store returned for a read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreReading {
    Found(String),
    NotFound,
    Unavailable,
}

impl StoreReading {
    /// Value or status marker reported to clients
    pub fn into_status(self) -> String {
        match self {
            Self::Found(value) => value,
            Self::NotFound => NOT_FOUND.to_string(),
            Self::Unavailable => SERVICE_UNAVAILABLE.to_string(),
        }
    }
}

/// Per-store result of a read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOutcome {
    pub cache: StoreReading,
    pub persistent: StoreReading,
}

/// What happened to a single store during a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Applied,
    Failed,
    /// Store not configured, or not attempted
    Skipped,
}

/// Per-store result of a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReport {
    pub cache: WriteStatus,
    pub persistent: WriteStatus,
}

/// Result of a modify request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifyOutcome {
    Modified(WriteReport),
    /// The cache store does not hold the key; nothing was written
    NotFound,
    /// The cache store failed during the existence check or the overwrite
    CacheUnavailable,
}

#[derive(Debug, Clone, Copy)]
enum PersistentWrite {
    Insert,
    Update,
}

impl PersistentWrite {
    fn operation(self) -> &'static str {
        match self {
            Self::Insert => "create",
            Self::Update => "modify",
        }
    }
}

/// Facade over a cache store and an optional persistent store
#[derive(Clone)]
pub struct KeyValueFacade {
    cache: Arc<dyn CacheStore>,
    persistent: Option<Arc<dyn PersistentStore>>,
}

impl Debug for KeyValueFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyValueFacade")
            .field("cache", &self.cache.backend())
            .field("persistent", &self.persistent.as_ref().map(|p| p.backend()))
            .finish()
    }
}

impl KeyValueFacade {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        persistent: Option<Arc<dyn PersistentStore>>,
    ) -> Self {
        Self { cache, persistent }
    }

    pub fn cache_store(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    pub fn persistent_store(&self) -> Option<&Arc<dyn PersistentStore>> {
        self.persistent.as_ref()
    }

    /// Reads `key` from both stores
    #[instrument(skip(self))]
    pub async fn read(&self, key: &str) -> ReadOutcome {
        let cache = match self.cache.get(key).await {
            Ok(Some(value)) => {
                record_store_operation(CACHE, "read", StoreCallOutcome::Ok);
                StoreReading::Found(value)
            }
            Ok(None) => {
                record_store_operation(CACHE, "read", StoreCallOutcome::Miss);
                StoreReading::NotFound
            }
            Err(e) => {
                self.cache_failed("read", key, &e);
                StoreReading::Unavailable
            }
        };

        let persistent = match &self.persistent {
            Some(store) => match store.select_by_id(key).await {
                Ok(Some(record)) => {
                    record_store_operation(PERSISTENT, "read", StoreCallOutcome::Ok);
                    StoreReading::Found(record.into_value())
                }
                Ok(None) => {
                    record_store_operation(PERSISTENT, "read", StoreCallOutcome::Miss);
                    StoreReading::NotFound
                }
                Err(e) => {
                    Self::persistent_failed(store.as_ref(), "read", key, &e);
                    StoreReading::Unavailable
                }
            },
            None => {
                record_store_operation(PERSISTENT, "read", StoreCallOutcome::Skipped);
                StoreReading::Unavailable
            }
        };

        ReadOutcome { cache, persistent }
    }

    /// Writes `value` under `key` to both stores
    #[instrument(skip(self, value))]
    pub async fn create(&self, key: &str, value: &str) -> WriteReport {
        let cache = match self.cache.set(key, value).await {
            Ok(()) => {
                record_store_operation(CACHE, "create", StoreCallOutcome::Ok);
                WriteStatus::Applied
            }
            Err(e) => {
                self.cache_failed("create", key, &e);
                WriteStatus::Failed
            }
        };

        let persistent = self
            .write_persistent(PersistentWrite::Insert, KeyValueRecord::new(key, value))
            .await;

        debug!(?cache, ?persistent, "Create finished");
        WriteReport { cache, persistent }
    }

    /// Overwrites `key` if the cache store holds it
    #[instrument(skip(self, value))]
    pub async fn modify(&self, key: &str, value: &str) -> ModifyOutcome {
        match self.cache.exists(key).await {
            Ok(false) => {
                record_store_operation(CACHE, "modify", StoreCallOutcome::Miss);
                debug!("Key not present in cache store, nothing modified");
                return ModifyOutcome::NotFound;
            }
            Ok(true) => {}
            Err(e) => {
                self.cache_failed("modify", key, &e);
                return ModifyOutcome::CacheUnavailable;
            }
        }

        if let Err(e) = self.cache.set(key, value).await {
            self.cache_failed("modify", key, &e);
            return ModifyOutcome::CacheUnavailable;
        }
        record_store_operation(CACHE, "modify", StoreCallOutcome::Ok);

        let persistent = self
            .write_persistent(PersistentWrite::Update, KeyValueRecord::new(key, value))
            .await;

        ModifyOutcome::Modified(WriteReport {
            cache: WriteStatus::Applied,
            persistent,
        })
    }

    /// Removes `key` from both stores, whether or not it exists
    #[instrument(skip(self))]
    pub async fn delete(&self, key: &str) -> WriteReport {
        let cache = match self.cache.delete(key).await {
            Ok(_) => {
                record_store_operation(CACHE, "delete", StoreCallOutcome::Ok);
                WriteStatus::Applied
            }
            Err(e) => {
                self.cache_failed("delete", key, &e);
                WriteStatus::Failed
            }
        };

        let persistent = match &self.persistent {
            Some(store) => match store.delete_by_id(key).await {
                Ok(()) => {
                    record_store_operation(PERSISTENT, "delete", StoreCallOutcome::Ok);
                    WriteStatus::Applied
                }
                Err(e) => {
                    Self::persistent_failed(store.as_ref(), "delete", key, &e);
                    WriteStatus::Failed
                }
            },
            None => {
                record_store_operation(PERSISTENT, "delete", StoreCallOutcome::Skipped);
                WriteStatus::Skipped
            }
        };

        WriteReport { cache, persistent }
    }

    async fn write_persistent(
        &self,
        write: PersistentWrite,
        record: KeyValueRecord,
    ) -> WriteStatus {
        let operation = write.operation();
        let Some(store) = &self.persistent else {
            record_store_operation(PERSISTENT, operation, StoreCallOutcome::Skipped);
            return WriteStatus::Skipped;
        };

        let key = record.key().to_string();
        let result = match write {
            PersistentWrite::Insert => store.insert(record).await,
            PersistentWrite::Update => store.update(record).await,
        };

        match result {
            Ok(()) => {
                record_store_operation(PERSISTENT, operation, StoreCallOutcome::Ok);
                WriteStatus::Applied
            }
            Err(e) => {
                Self::persistent_failed(store.as_ref(), operation, &key, &e);
                WriteStatus::Failed
            }
        }
    }

    fn cache_failed(&self, operation: &'static str, key: &str, error: &DomainError) {
        record_store_operation(CACHE, operation, StoreCallOutcome::Error);
        warn!(
            store = CACHE,
            backend = self.cache.backend(),
            operation,
            key,
            error = %error,
            "Cache store unavailable"
        );
    }

    fn persistent_failed(
        store: &dyn PersistentStore,
        operation: &'static str,
        key: &str,
        error: &DomainError,
    ) {
        record_store_operation(PERSISTENT, operation, StoreCallOutcome::Error);
        warn!(
            store = PERSISTENT,
            backend = store.backend(),
            operation,
            key,
            error = %error,
            "Persistent store unavailable"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::key_value::{MockCacheStore, MockPersistentStore};
    use crate::infrastructure::cache::InMemoryCacheStore;
    use crate::infrastructure::persistent::{InMemoryPersistentStore, PrefixedCacheStore};

    fn in_memory_facade() -> KeyValueFacade {
        KeyValueFacade::new(
            Arc::new(InMemoryCacheStore::new()),
            Some(Arc::new(InMemoryPersistentStore::new())),
        )
    }

    fn cache_only_facade() -> KeyValueFacade {
        KeyValueFacade::new(Arc::new(InMemoryCacheStore::new()), None)
    }

    fn failing_cache() -> MockCacheStore {
        let mut cache = MockCacheStore::new();
        cache
            .expect_get()
            .returning(|_| Err(DomainError::cache("connection refused")));
        cache
            .expect_set()
            .returning(|_, _| Err(DomainError::cache("connection refused")));
        cache
            .expect_exists()
            .returning(|_| Err(DomainError::cache("connection refused")));
        cache
            .expect_delete()
            .returning(|_| Err(DomainError::cache("connection refused")));
        cache.expect_backend().return_const("mock");
        cache
    }

    #[tokio::test]
    async fn test_read_unknown_key() {
        let facade = in_memory_facade();

        let outcome = facade.read("missing").await;

        assert_eq!(outcome.cache, StoreReading::NotFound);
        assert_eq!(outcome.persistent, StoreReading::NotFound);
    }

    #[tokio::test]
    async fn test_create_then_read() {
        let facade = in_memory_facade();

        let report = facade.create("k1", "v1").await;
        assert_eq!(report.cache, WriteStatus::Applied);
        assert_eq!(report.persistent, WriteStatus::Applied);

        let outcome = facade.read("k1").await;
        assert_eq!(outcome.cache, StoreReading::Found("v1".to_string()));
        assert_eq!(outcome.persistent, StoreReading::Found("v1".to_string()));
    }

    #[tokio::test]
    async fn test_modify_unknown_key_does_not_create_it() {
        let facade = in_memory_facade();

        assert_eq!(facade.modify("ghost", "v").await, ModifyOutcome::NotFound);

        let outcome = facade.read("ghost").await;
        assert_eq!(outcome.cache, StoreReading::NotFound);
        assert_eq!(outcome.persistent, StoreReading::NotFound);
    }

    #[tokio::test]
    async fn test_create_modify_read() {
        let facade = in_memory_facade();
        facade.create("k1", "v1").await;

        let outcome = facade.modify("k1", "v2").await;
        assert_eq!(
            outcome,
            ModifyOutcome::Modified(WriteReport {
                cache: WriteStatus::Applied,
                persistent: WriteStatus::Applied,
            })
        );

        let read = facade.read("k1").await;
        assert_eq!(read.cache, StoreReading::Found("v2".to_string()));
        assert_eq!(read.persistent, StoreReading::Found("v2".to_string()));
    }

    #[tokio::test]
    async fn test_delete_always_succeeds() {
        let facade = in_memory_facade();
        facade.create("k1", "v1").await;

        let first = facade.delete("k1").await;
        let second = facade.delete("k1").await;

        assert_eq!(first.cache, WriteStatus::Applied);
        assert_eq!(second.cache, WriteStatus::Applied);
        assert_eq!(second.persistent, WriteStatus::Applied);
        assert_eq!(facade.read("k1").await.cache, StoreReading::NotFound);
    }

    #[tokio::test]
    async fn test_cache_failure_on_read_leaves_persistent_result() {
        let persistent = Arc::new(InMemoryPersistentStore::new());
        persistent
            .insert(KeyValueRecord::new("k1", "durable"))
            .await
            .unwrap();

        let facade = KeyValueFacade::new(Arc::new(failing_cache()), Some(persistent));
        let outcome = facade.read("k1").await;

        assert_eq!(outcome.cache, StoreReading::Unavailable);
        assert_eq!(outcome.persistent, StoreReading::Found("durable".to_string()));
    }

    #[tokio::test]
    async fn test_cache_failure_on_create_still_writes_persistent() {
        let persistent = Arc::new(InMemoryPersistentStore::new());
        let facade = KeyValueFacade::new(Arc::new(failing_cache()), Some(persistent.clone()));

        let report = facade.create("k1", "v1").await;

        assert_eq!(report.cache, WriteStatus::Failed);
        assert_eq!(report.persistent, WriteStatus::Applied);
        assert!(persistent.select_by_id("k1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_cache_failure_on_modify_is_degraded_success() {
        let mut persistent = MockPersistentStore::new();
        persistent.expect_update().never();

        let facade = KeyValueFacade::new(Arc::new(failing_cache()), Some(Arc::new(persistent)));

        assert_eq!(
            facade.modify("k1", "v1").await,
            ModifyOutcome::CacheUnavailable
        );
    }

    #[tokio::test]
    async fn test_cache_overwrite_failure_on_modify_skips_persistent() {
        let mut cache = MockCacheStore::new();
        cache.expect_exists().returning(|_| Ok(true));
        cache
            .expect_set()
            .returning(|_, _| Err(DomainError::cache("READONLY replica")));
        cache.expect_backend().return_const("mock");

        let mut persistent = MockPersistentStore::new();
        persistent.expect_update().never();

        let facade = KeyValueFacade::new(Arc::new(cache), Some(Arc::new(persistent)));

        assert_eq!(
            facade.modify("k1", "v1").await,
            ModifyOutcome::CacheUnavailable
        );
    }

    #[tokio::test]
    async fn test_persistent_failure_is_swallowed() {
        let mut persistent = MockPersistentStore::new();
        persistent
            .expect_select_by_id()
            .returning(|_| Err(DomainError::storage("no hosts available")));
        persistent
            .expect_insert()
            .returning(|_| Err(DomainError::storage("no hosts available")));
        persistent
            .expect_update()
            .returning(|_| Err(DomainError::storage("no hosts available")));
        persistent
            .expect_delete_by_id()
            .returning(|_| Err(DomainError::storage("no hosts available")));
        persistent.expect_backend().return_const("mock");

        let facade = KeyValueFacade::new(
            Arc::new(InMemoryCacheStore::new()),
            Some(Arc::new(persistent)),
        );

        let created = facade.create("k1", "v1").await;
        assert_eq!(created.cache, WriteStatus::Applied);
        assert_eq!(created.persistent, WriteStatus::Failed);

        let read = facade.read("k1").await;
        assert_eq!(read.cache, StoreReading::Found("v1".to_string()));
        assert_eq!(read.persistent, StoreReading::Unavailable);

        let modified = facade.modify("k1", "v2").await;
        assert_eq!(
            modified,
            ModifyOutcome::Modified(WriteReport {
                cache: WriteStatus::Applied,
                persistent: WriteStatus::Failed,
            })
        );

        let deleted = facade.delete("k1").await;
        assert_eq!(deleted.persistent, WriteStatus::Failed);
    }

    #[tokio::test]
    async fn test_modify_uses_update_not_insert() {
        let mut persistent = MockPersistentStore::new();
        persistent.expect_insert().never();
        persistent
            .expect_update()
            .withf(|record| record.key() == "k1" && record.value() == "v2")
            .times(1)
            .returning(|_| Ok(()));

        let cache = Arc::new(InMemoryCacheStore::new());
        cache.set("k1", "v1").await.unwrap();

        let facade = KeyValueFacade::new(cache, Some(Arc::new(persistent)));

        assert!(matches!(
            facade.modify("k1", "v2").await,
            ModifyOutcome::Modified(_)
        ));
    }

    #[tokio::test]
    async fn test_persistent_presence_is_never_checked_before_write() {
        let mut persistent = MockPersistentStore::new();
        persistent.expect_select_by_id().never();
        persistent.expect_insert().times(1).returning(|_| Ok(()));

        let facade = KeyValueFacade::new(
            Arc::new(InMemoryCacheStore::new()),
            Some(Arc::new(persistent)),
        );

        facade.create("k1", "v1").await;
    }

    #[tokio::test]
    async fn test_without_persistent_store() {
        let facade = cache_only_facade();

        let created = facade.create("k1", "v1").await;
        assert_eq!(created.persistent, WriteStatus::Skipped);

        let read = facade.read("k1").await;
        assert_eq!(read.cache, StoreReading::Found("v1".to_string()));
        assert_eq!(read.persistent, StoreReading::Unavailable);

        assert_eq!(
            facade.modify("k1", "v2").await,
            ModifyOutcome::Modified(WriteReport {
                cache: WriteStatus::Applied,
                persistent: WriteStatus::Skipped,
            })
        );

        let deleted = facade.delete("k1").await;
        assert_eq!(deleted.persistent, WriteStatus::Skipped);
        assert_eq!(facade.read("k1").await.cache, StoreReading::NotFound);
    }

    #[tokio::test]
    async fn test_prefixed_mode_reads_both_views_from_one_cache() {
        let cache: Arc<dyn CacheStore> = Arc::new(InMemoryCacheStore::new());
        let persistent = Arc::new(PrefixedCacheStore::new(cache.clone(), "cassandra_"));
        let facade = KeyValueFacade::new(cache.clone(), Some(persistent));

        facade.create("k1", "v1").await;
        cache.set("k1", "cache-only").await.unwrap();

        let read = facade.read("k1").await;
        assert_eq!(read.cache, StoreReading::Found("cache-only".to_string()));
        assert_eq!(read.persistent, StoreReading::Found("v1".to_string()));
    }

    #[test]
    fn test_store_reading_status_strings() {
        assert_eq!(StoreReading::Found("v".to_string()).into_status(), "v");
        assert_eq!(StoreReading::NotFound.into_status(), "Not found");
        assert_eq!(
            StoreReading::Unavailable.into_status(),
            "Service unavailable"
        );
    }
}
