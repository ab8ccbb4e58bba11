//! Redis/Valkey cache store implementation

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tokio::sync::OnceCell;

use crate::domain::key_value::CacheStore;
use crate::domain::DomainError;

/// Configuration for the Redis cache store
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Key prefix for namespacing
    pub key_prefix: Option<String>,
    /// Connection timeout
    pub connection_timeout: Duration,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: None,
            connection_timeout: Duration::from_secs(5),
        }
    }
}

impl RedisCacheConfig {
    /// Creates a new configuration with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Sets the connection timeout
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }
}

/// Redis cache store
///
/// The connection is established on first use and reused afterwards, so the
/// service starts even when Redis is down. A failed attempt is retried on the
/// next call.
pub struct RedisCacheStore {
    client: Client,
    connection: OnceCell<ConnectionManager>,
    config: RedisCacheConfig,
}

impl fmt::Debug for RedisCacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCacheStore")
            .field("config", &self.config)
            .field("connected", &self.connection.initialized())
            .finish()
    }
}

impl RedisCacheStore {
    /// Creates a Redis cache store without connecting
    ///
    /// Only the URL is validated here.
    pub fn new(config: RedisCacheConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| DomainError::configuration(format!("Invalid Redis URL: {}", e)))?;

        Ok(Self {
            client,
            connection: OnceCell::new(),
            config,
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, DomainError> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                let connect = ConnectionManager::new(self.client.clone());

                match tokio::time::timeout(self.config.connection_timeout, connect).await {
                    Ok(Ok(manager)) => {
                        tracing::info!(url = %self.config.url, "Connected to Redis");
                        Ok(manager)
                    }
                    Ok(Err(e)) => Err(DomainError::cache(format!(
                        "Failed to connect to Redis: {}",
                        e
                    ))),
                    Err(_) => Err(DomainError::cache(format!(
                        "Timed out connecting to Redis after {:?}",
                        self.config.connection_timeout
                    ))),
                }
            })
            .await?;

        Ok(manager.clone())
    }

    fn prefix_key(&self, key: &str) -> String {
        match &self.config.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection().await?;

        let result: Option<String> = conn.get(&prefixed_key).await.map_err(|e| {
            DomainError::cache(format!("Failed to get key '{}': {}", key, e))
        })?;

        Ok(result)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection().await?;

        let _: () = conn
            .set(&prefixed_key, value)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to set key '{}': {}", key, e)))?;

        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection().await?;

        let exists: bool = conn.exists(&prefixed_key).await.map_err(|e| {
            DomainError::cache(format!("Failed to check existence of key '{}': {}", key, e))
        })?;

        Ok(exists)
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection().await?;

        let deleted: i32 = conn.del(&prefixed_key).await.map_err(|e| {
            DomainError::cache(format!("Failed to delete key '{}': {}", key, e))
        })?;

        Ok(deleted > 0)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        let mut conn = self.connection().await?;

        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to ping Redis: {}", e)))?;

        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These tests require a running Redis instance
    // Run with: cargo test -- --ignored

    fn get_test_store() -> RedisCacheStore {
        let config = RedisCacheConfig::new("redis://127.0.0.1:6379").with_key_prefix("test");
        RedisCacheStore::new(config).unwrap()
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_set_and_get() {
        let store = get_test_store();

        store.set("key1", "value1").await.unwrap();

        let result = store.get("key1").await.unwrap();
        assert_eq!(result, Some("value1".to_string()));

        store.delete("key1").await.unwrap();
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_exists_and_delete() {
        let store = get_test_store();

        store.set("key2", "value2").await.unwrap();
        assert!(store.exists("key2").await.unwrap());

        assert!(store.delete("key2").await.unwrap());
        assert!(!store.exists("key2").await.unwrap());
        assert!(!store.delete("key2").await.unwrap());
    }

    #[tokio::test]
    async fn test_unreachable_redis_reports_cache_error() {
        let config = RedisCacheConfig::new("redis://127.0.0.1:1")
            .with_connection_timeout(Duration::from_millis(200));
        let store = RedisCacheStore::new(config).unwrap();

        let err = store.get("key").await.unwrap_err();
        assert!(matches!(err, DomainError::Cache { .. }));
        assert!(store.ping().await.is_err());
    }

    #[test]
    fn test_invalid_url_is_configuration_error() {
        let result = RedisCacheStore::new(RedisCacheConfig::new("not a url"));
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_key_prefix() {
        let store = RedisCacheStore::new(
            RedisCacheConfig::new("redis://localhost").with_key_prefix("myapp"),
        )
        .unwrap();

        assert_eq!(store.prefix_key("k"), "myapp:k");
        assert_eq!(get_test_store().backend(), "redis");
    }
}
