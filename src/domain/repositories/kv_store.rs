//! Key-value store trait with expiring entries.

use async_trait::async_trait;
use std::time::Duration;

/// Errors raised by store implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Store connection error: {0}")]
    Connection(String),

    #[error("Store command failed: {0}")]
    Command(String),

    #[error("Value under '{key}' is not an integer: {value}")]
    InvalidValue { key: String, value: String },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Shared key-value store with per-key expiry.
///
/// Each individual operation is atomic. Multi-step sequences are not; callers
/// that need check-and-write semantics must use [`KeyValueStore::set_if_absent`].
///
/// # Implementations
///
/// - [`crate::infrastructure::store::RedisStore`] - Redis, shared across instances
/// - [`crate::infrastructure::store::InMemoryStore`] - Single-process store for development and tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value under `key`, or `None` if it is missing or expired.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Writes `value` under `key` with the given lifetime, replacing any previous value.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()>;

    /// Writes `value` under `key` only if no live value exists.
    ///
    /// Returns `true` if the write happened, `false` if the key was taken.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<bool>;

    /// Atomically increments the integer under `key`, treating a missing key as 0.
    ///
    /// A key created by this call has no expiry.
    async fn incr(&self, key: &str) -> StoreResult<i64>;

    /// Atomically decrements the integer under `key`, treating a missing key as 0.
    ///
    /// No floor is applied. A key created by this call has no expiry.
    async fn decr(&self, key: &str) -> StoreResult<i64>;

    /// Remaining lifetime of `key`.
    ///
    /// Returns `None` if the key is missing or has no expiry.
    async fn ttl(&self, key: &str) -> StoreResult<Option<Duration>>;

    /// Removes `key`. Returns `true` if a live value was removed.
    async fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Checks if the store backend is reachable.
    async fn ping(&self) -> bool;
}
