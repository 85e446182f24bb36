//! Expiring key-value stores.
//!
//! - [`RedisStore`] - Production store shared by every service instance
//! - [`InMemoryStore`] - Single-process store used without Redis and in tests

mod memory_store;
mod redis_store;

pub use crate::domain::repositories::{KeyValueStore, StoreError, StoreResult};
pub use memory_store::InMemoryStore;
pub use redis_store::RedisStore;
