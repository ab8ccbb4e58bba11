//! Persistent store trait definition

use async_trait::async_trait;

use crate::domain::DomainError;

use super::KeyValueRecord;

#[cfg(test)]
use mockall::automock;

/// Durable system-of-record store for key-value records
///
/// Writes follow wide-column semantics: `insert` and `update` both overwrite
/// unconditionally and neither checks for prior presence.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PersistentStore: Send + Sync {
    /// Loads the record stored under `key`
    async fn select_by_id(&self, key: &str) -> Result<Option<KeyValueRecord>, DomainError>;

    /// Writes a new record
    async fn insert(&self, record: KeyValueRecord) -> Result<(), DomainError>;

    /// Overwrites an existing record
    async fn update(&self, record: KeyValueRecord) -> Result<(), DomainError>;

    /// Removes the record stored under `key`
    async fn delete_by_id(&self, key: &str) -> Result<(), DomainError>;

    /// Verifies the store is reachable
    async fn ping(&self) -> Result<(), DomainError>;

    /// Backend name used in logs and metric labels
    fn backend(&self) -> &'static str;
}
