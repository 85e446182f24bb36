//! Redis-backed store implementation.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::{
    AsyncCommands, Client, ExistenceCheck, RedisError, SetExpiry, SetOptions,
    aio::ConnectionManager,
};
use tracing::{debug, info};

use super::{KeyValueStore, StoreError, StoreResult};

/// Redis store shared by all service instances.
///
/// Uses `ConnectionManager` for automatic reconnection. Every command is bounded
/// by `timeout`; an elapsed timeout surfaces as [`StoreError::Timeout`]. Commands
/// are never retried.
pub struct RedisStore {
    conn: ConnectionManager,
    timeout: Duration,
}

impl RedisStore {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379/0"`)
    /// - `timeout` - upper bound for every store command, controlled via `STORE_TIMEOUT_MS`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] if the URL is invalid, the connection cannot
    /// be established, or the PING fails.
    pub async fn connect(redis_url: &str, timeout: Duration) -> StoreResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            StoreError::Connection(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| StoreError::Timeout(timeout))?
            .map_err(|e| StoreError::Connection(format!("Failed to connect to Redis: {}", e)))?;

        let store = Self {
            conn: manager,
            timeout,
        };

        if !store.ping().await {
            return Err(StoreError::Connection("Redis PING failed".to_string()));
        }

        info!("Connected to Redis");
        Ok(store)
    }

    /// Runs a single command under the configured timeout.
    async fn bounded<T, F>(&self, command: &'static str, fut: F) -> StoreResult<T>
    where
        F: Future<Output = Result<T, RedisError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(map_redis_error(command, e)),
            Err(_) => Err(StoreError::Timeout(self.timeout)),
        }
    }
}

fn map_redis_error(command: &str, e: RedisError) -> StoreError {
    if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() {
        StoreError::Connection(format!("{command}: {e}"))
    } else {
        StoreError::Command(format!("{command}: {e}"))
    }
}

/// Redis rejects `EX 0`; round sub-second lifetimes up to one second.
fn expiry_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value = self
            .bounded("GET", conn.get::<_, Option<String>>(key))
            .await?;
        debug!(key, hit = value.is_some(), "GET");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        self.bounded(
            "SET EX",
            conn.set_ex::<_, _, ()>(key, value, expiry_seconds(ttl)),
        )
        .await?;
        debug!(key, ttl_secs = expiry_seconds(ttl), "SET EX");
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<bool> {
        let mut conn = self.conn.clone();
        let opts = SetOptions::default()
            .conditional_set(ExistenceCheck::NX)
            .with_expiration(SetExpiry::EX(expiry_seconds(ttl)));

        // `OK` when written, nil when the key already exists
        let reply = self
            .bounded(
                "SET NX EX",
                conn.set_options::<_, _, Option<String>>(key, value, opts),
            )
            .await?;
        let written = reply.is_some();
        debug!(key, written, "SET NX EX");
        Ok(written)
    }

    async fn incr(&self, key: &str) -> StoreResult<i64> {
        let mut conn = self.conn.clone();
        self.bounded("INCR", conn.incr::<_, _, i64>(key, 1)).await
    }

    async fn decr(&self, key: &str) -> StoreResult<i64> {
        let mut conn = self.conn.clone();
        self.bounded("DECR", conn.decr::<_, _, i64>(key, 1)).await
    }

    async fn ttl(&self, key: &str) -> StoreResult<Option<Duration>> {
        let mut conn = self.conn.clone();
        // -2: missing key, -1: no expiry
        let millis = self.bounded("PTTL", conn.pttl::<_, i64>(key)).await?;
        Ok(u64::try_from(millis).ok().map(Duration::from_millis))
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let mut conn = self.conn.clone();
        let removed = self.bounded("DEL", conn.del::<_, i64>(key)).await?;
        Ok(removed > 0)
    }

    async fn ping(&self) -> bool {
        let mut conn = self.conn.clone();
        self.bounded("PING", conn.ping::<()>()).await.is_ok()
    }
}
