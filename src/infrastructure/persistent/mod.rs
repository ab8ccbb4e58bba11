//! Persistent infrastructure - Persistent store implementations

mod factory;
mod in_memory;
mod postgres;
mod prefixed;

pub use factory::{PersistentStoreFactory, PersistentType};
pub use in_memory::InMemoryPersistentStore;
pub use postgres::{PostgresConfig, PostgresPersistentStore};
pub use prefixed::{PrefixedCacheStore, DEFAULT_KEY_PREFIX};
