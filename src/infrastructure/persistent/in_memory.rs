//! In-memory persistent store implementation

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::key_value::{KeyValueRecord, PersistentStore};
use crate::domain::DomainError;

/// Thread-safe in-memory persistent store
///
/// Useful for testing and development. Data is lost when the process terminates.
#[derive(Debug, Default)]
pub struct InMemoryPersistentStore {
    records: RwLock<HashMap<String, String>>,
}

impl InMemoryPersistentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self, record: KeyValueRecord) -> Result<(), DomainError> {
        let mut records = self.records.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let key = record.key().to_string();
        records.insert(key, record.into_value());
        Ok(())
    }
}

#[async_trait]
impl PersistentStore for InMemoryPersistentStore {
    async fn select_by_id(&self, key: &str) -> Result<Option<KeyValueRecord>, DomainError> {
        let records = self.records.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(records
            .get(key)
            .map(|value| KeyValueRecord::new(key, value.clone())))
    }

    async fn insert(&self, record: KeyValueRecord) -> Result<(), DomainError> {
        self.write(record)
    }

    async fn update(&self, record: KeyValueRecord) -> Result<(), DomainError> {
        self.write(record)
    }

    async fn delete_by_id(&self, key: &str) -> Result<(), DomainError> {
        let mut records = self.records.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        records.remove(key);
        Ok(())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "in_memory"
    }
}
