//! Cache infrastructure - Cache store implementations

mod factory;
mod in_memory;
mod redis;

pub use factory::{CacheStoreFactory, CacheType};
pub use in_memory::{InMemoryCacheConfig, InMemoryCacheStore};
pub use redis::{RedisCacheConfig, RedisCacheStore};
