//! Application state shared by handlers

use std::sync::Arc;

use crate::domain::key_value::{CacheStore, PersistentStore};
use crate::infrastructure::services::KeyValueFacade;

/// Application state; cheap to clone
#[derive(Debug, Clone)]
pub struct AppState {
    pub facade: KeyValueFacade,
}

impl AppState {
    pub fn new(facade: KeyValueFacade) -> Self {
        Self { facade }
    }

    /// Builds state directly from store clients
    pub fn from_stores(
        cache: Arc<dyn CacheStore>,
        persistent: Option<Arc<dyn PersistentStore>>,
    ) -> Self {
        Self::new(KeyValueFacade::new(cache, persistent))
    }
}
