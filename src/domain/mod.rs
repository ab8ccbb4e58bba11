//! Domain layer - Core entities and store abstractions

pub mod error;
pub mod key_value;

pub use error::DomainError;
pub use key_value::{validate_key, CacheStore, KeyValueRecord, PersistentStore};
