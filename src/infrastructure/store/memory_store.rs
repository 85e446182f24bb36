//! In-process store implementation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::time::Instant;
use tracing::debug;

use super::{KeyValueStore, StoreError, StoreResult};

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn new(value: String, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// Writes between two full sweeps of expired entries.
const SWEEP_EVERY_WRITES: u64 = 1024;

/// Single-process store backed by a sharded map.
///
/// Expired entries are treated as absent and removed on access. Entries whose
/// key is never touched again are dropped by a full sweep every
/// [`SWEEP_EVERY_WRITES`] writes, so memory stays bounded by live keys plus
/// one sweep interval. Expiry uses the tokio clock, so tests can drive it with
/// `tokio::time::advance`.
///
/// State is not shared between processes: use [`super::RedisStore`] when more than
/// one instance serves traffic.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: DashMap<String, StoredValue>,
    writes: AtomicU64,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        debug!("Using InMemoryStore (state is local to this process)");
        Self::default()
    }

    /// Drops every expired entry. Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(removed, "Purged expired entries");
        }
        removed
    }

    /// Counts a write and sweeps once per interval.
    ///
    /// Must not be called while holding a map guard.
    fn note_write(&self) {
        let writes = self.writes.fetch_add(1, Ordering::Relaxed) + 1;
        if writes % SWEEP_EVERY_WRITES == 0 {
            self.purge_expired();
        }
    }

    /// Adds `delta` to the integer under `key`, keeping its expiry.
    fn add(&self, key: &str, delta: i64) -> StoreResult<i64> {
        let result = self.add_in_place(key, delta);
        self.note_write();
        result
    }

    fn add_in_place(&self, key: &str, delta: i64) -> StoreResult<i64> {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) if !occupied.get().is_expired() => {
                let current: i64 =
                    occupied
                        .get()
                        .value
                        .parse()
                        .map_err(|_| StoreError::InvalidValue {
                            key: key.to_string(),
                            value: occupied.get().value.clone(),
                        })?;
                let next = current + delta;
                occupied.get_mut().value = next.to_string();
                Ok(next)
            }
            Entry::Occupied(mut occupied) => {
                occupied.insert(StoredValue::new(delta.to_string(), None));
                Ok(delta)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(StoredValue::new(delta.to_string(), None));
                Ok(delta)
            }
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired() {
                return Ok(Some(entry.value.clone()));
            }
        }
        self.entries.remove_if(key, |_, entry| entry.is_expired());
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        self.entries.insert(
            key.to_string(),
            StoredValue::new(value.to_string(), Some(ttl)),
        );
        self.note_write();
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<bool> {
        let written = match self.entries.entry(key.to_string()) {
            Entry::Occupied(occupied) if !occupied.get().is_expired() => false,
            Entry::Occupied(mut occupied) => {
                occupied.insert(StoredValue::new(value.to_string(), Some(ttl)));
                true
            }
            Entry::Vacant(vacant) => {
                vacant.insert(StoredValue::new(value.to_string(), Some(ttl)));
                true
            }
        };
        self.note_write();
        Ok(written)
    }

    async fn incr(&self, key: &str) -> StoreResult<i64> {
        self.add(key, 1)
    }

    async fn decr(&self, key: &str) -> StoreResult<i64> {
        self.add(key, -1)
    }

    async fn ttl(&self, key: &str) -> StoreResult<Option<Duration>> {
        let Some(entry) = self.entries.get(key) else {
            return Ok(None);
        };
        if entry.is_expired() {
            return Ok(None);
        }
        Ok(entry
            .expires_at
            .map(|at| at.saturating_duration_since(Instant::now())))
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        Ok(self
            .entries
            .remove(key)
            .is_some_and(|(_, entry)| !entry.is_expired()))
    }

    async fn ping(&self) -> bool {
        true
    }
}
