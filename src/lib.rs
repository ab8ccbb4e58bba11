//! Key-value playground API
//!
//! CRUD endpoints over a key-value pair backed by two stores:
//! - a cache store (Redis/Valkey, or in-memory)
//! - an optional persistent store (PostgreSQL, in-memory, or prefixed keys in the cache store)
//!
//! A failing store never fails a request; each response reports per-store status.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use anyhow::Context;
use tracing::info;

use api::state::AppState;
use infrastructure::cache::CacheStoreFactory;
use infrastructure::persistent::PersistentStoreFactory;
use infrastructure::services::KeyValueFacade;

/// Create the application state with stores selected by configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let cache = CacheStoreFactory::create(&config.cache).context("Failed to create cache store")?;
    info!("Cache store backend: {}", cache.backend());

    let persistent = PersistentStoreFactory::create(&config.persistent, cache.clone())
        .await
        .context("Failed to create persistent store")?;

    if persistent.is_none() {
        info!("Persistent store disabled; reads will report it as unavailable");
    }

    Ok(AppState::new(KeyValueFacade::new(cache, persistent)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CacheSettings, PersistentSettings};

    #[tokio::test]
    async fn test_create_app_state_in_memory() {
        let config = AppConfig {
            cache: CacheSettings {
                backend: "in_memory".to_string(),
                ..Default::default()
            },
            persistent: PersistentSettings {
                backend: "in_memory".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        let state = create_app_state_with_config(&config).await.unwrap();

        state.facade.create("k", "v").await;
        let outcome = state.facade.read("k").await;
        assert_eq!(outcome.cache.into_status(), "v");
        assert_eq!(outcome.persistent.into_status(), "v");
    }

    #[tokio::test]
    async fn test_create_app_state_rejects_unknown_backend() {
        let config = AppConfig {
            cache: CacheSettings {
                backend: "memcached".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        assert!(create_app_state_with_config(&config).await.is_err());
    }
}
