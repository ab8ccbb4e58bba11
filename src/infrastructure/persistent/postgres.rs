//! PostgreSQL persistent store implementation with connection pooling

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use tokio::sync::OnceCell;

use crate::domain::key_value::{KeyValueRecord, PersistentStore};
use crate::domain::DomainError;

static TABLE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").expect("valid table name regex"));

/// PostgreSQL persistent store configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Table holding the key-value records
    pub table: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// How long to wait for a pooled connection
    pub acquire_timeout: Duration,
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            table: "key_value".to_string(),
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }
}

/// PostgreSQL persistent store
///
/// Stores one row per key in a `(key, value)` table. Both insert and update
/// are upserts. The pool connects lazily and the table is created on first
/// successful use.
pub struct PostgresPersistentStore {
    pool: PgPool,
    table: String,
    table_guard: OnceCell<()>,
}

impl Debug for PostgresPersistentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresPersistentStore")
            .field("table", &self.table)
            .field("table_ready", &self.is_table_ready())
            .finish()
    }
}

impl PostgresPersistentStore {
    /// Creates a store over an existing pool
    pub fn new(pool: PgPool, table: impl Into<String>) -> Result<Self, DomainError> {
        let table = table.into();

        if !TABLE_NAME.is_match(&table) {
            return Err(DomainError::configuration(format!(
                "Invalid table name: '{}'",
                table
            )));
        }

        Ok(Self {
            pool,
            table,
            table_guard: OnceCell::new(),
        })
    }

    /// Creates a store with a lazily connecting pool
    pub fn connect_lazy(config: &PostgresConfig) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy(&config.url)
            .map_err(|e| DomainError::configuration(format!("Invalid PostgreSQL URL: {}", e)))?;

        Self::new(pool, config.table.clone())
    }

    /// Creates the records table if it does not exist
    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        let query = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
            self.table
        );

        sqlx::query(&query)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create table: {}", e)))?;

        Ok(())
    }

    /// Ensures the table exists, retrying on every call until it succeeds once
    pub async fn table_ready(&self) -> Result<(), DomainError> {
        self.table_guard
            .get_or_try_init(|| self.ensure_table())
            .await
            .map(|_| ())
    }

    pub fn is_table_ready(&self) -> bool {
        self.table_guard.initialized()
    }

    async fn upsert(&self, record: &KeyValueRecord) -> Result<(), DomainError> {
        self.table_ready().await?;

        let query = format!(
            r#"
            INSERT INTO {} (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value
            "#,
            self.table
        );

        sqlx::query(&query)
            .bind(record.key())
            .bind(record.value())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to write key '{}': {}", record.key(), e))
            })?;

        Ok(())
    }
}

#[async_trait]
impl PersistentStore for PostgresPersistentStore {
    async fn select_by_id(&self, key: &str) -> Result<Option<KeyValueRecord>, DomainError> {
        self.table_ready().await?;

        let query = format!("SELECT key, value FROM {} WHERE key = $1", self.table);

        let row = sqlx::query(&query)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to read key '{}': {}", key, e)))?;

        match row {
            Some(row) => {
                let key: String = row
                    .try_get("key")
                    .map_err(|e| DomainError::storage(format!("Failed to decode row: {}", e)))?;
                let value: String = row
                    .try_get("value")
                    .map_err(|e| DomainError::storage(format!("Failed to decode row: {}", e)))?;

                Ok(Some(KeyValueRecord::new(key, value)))
            }
            None => Ok(None),
        }
    }

    async fn insert(&self, record: KeyValueRecord) -> Result<(), DomainError> {
        self.upsert(&record).await
    }

    async fn update(&self, record: KeyValueRecord) -> Result<(), DomainError> {
        self.upsert(&record).await
    }

    async fn delete_by_id(&self, key: &str) -> Result<(), DomainError> {
        self.table_ready().await?;

        let query = format!("DELETE FROM {} WHERE key = $1", self.table);

        sqlx::query(&query)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete key '{}': {}", key, e)))?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to ping PostgreSQL: {}", e)))?;

        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
