//! Key-value domain - record type and store abstractions

mod cache_store;
mod persistent_store;
mod record;

pub use cache_store::CacheStore;
pub use persistent_store::PersistentStore;
pub use record::{validate_key, KeyValueRecord};

#[cfg(test)]
pub use cache_store::MockCacheStore;
#[cfg(test)]
pub use persistent_store::MockPersistentStore;
