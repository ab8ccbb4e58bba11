//! Cache store trait definition

use async_trait::async_trait;

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Fast-path key-value store (Redis/Valkey compatible)
///
/// Every method surfaces backend failures as `DomainError::Cache` so callers
/// can tell "absent" apart from "unreachable".
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Gets the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Stores `value` under `key`, overwriting any previous value
    async fn set(&self, key: &str, value: &str) -> Result<(), DomainError>;

    /// Checks whether `key` is present
    async fn exists(&self, key: &str) -> Result<bool, DomainError>;

    /// Removes `key`, returning whether it was present
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    /// Verifies the store is reachable
    async fn ping(&self) -> Result<(), DomainError>;

    /// Backend name used in logs and metric labels
    fn backend(&self) -> &'static str;
}
