//! Per-client quota tracking with a fixed refill window.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::quota::whole_minutes;
use crate::domain::entities::{QuotaCheck, QuotaStatus};
use crate::domain::keys::quota_key;
use crate::domain::repositories::{KeyValueStore, StoreError};
use crate::error::AppError;

/// Length of a quota window.
pub const QUOTA_WINDOW: Duration = Duration::from_secs(30 * 60);

/// Service owning per-client quota windows.
///
/// # Lifecycle
///
/// 1. The first check in a window creates the record with the full budget
///    (creation itself is free)
/// 2. Each gated operation that succeeds is charged with [`Self::commit`]
/// 3. Once the budget reaches zero, checks are refused until the record expires
///
/// A window therefore allows exactly `max_requests` charged operations.
///
/// # Concurrency
///
/// Window creation is an atomic set-if-absent. The check → commit pair is not
/// atomic, so concurrent requests from one client can overshoot the budget by
/// the number of requests in flight.
pub struct QuotaService {
    store: Arc<dyn KeyValueStore>,
    max_requests: i64,
    window: Duration,
}

impl QuotaService {
    /// Creates a quota service granting `max_requests` per 30-minute window.
    pub fn new(store: Arc<dyn KeyValueStore>, max_requests: u32) -> Self {
        Self {
            store,
            max_requests: i64::from(max_requests),
            window: QUOTA_WINDOW,
        }
    }

    /// Checks whether `client_id` may perform a gated operation.
    ///
    /// Opens a new window if none is active. Does not charge the client.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store errors; the request is never
    /// allowed through on a store failure.
    pub async fn check_and_reserve(&self, client_id: &str) -> Result<QuotaCheck, AppError> {
        let key = quota_key(client_id);

        if self
            .store
            .set_if_absent(&key, &self.max_requests.to_string(), self.window)
            .await?
        {
            tracing::debug!(client = %client_id, "Opened quota window");
            return Ok(self.fresh_window());
        }

        let Some(remaining) = self.read_remaining(&key).await? else {
            // Expired between the two calls; commit will reopen it
            return Ok(self.fresh_window());
        };

        let reset_after = match self.store.ttl(&key).await? {
            Some(ttl) => ttl,
            None => {
                // A record without expiry would lock the client out forever
                tracing::warn!(client = %client_id, "Quota record had no expiry, restoring window");
                self.store
                    .set(&key, &remaining.to_string(), self.window)
                    .await?;
                self.window
            }
        };

        let allowed = remaining > 0;
        if !allowed {
            tracing::info!(client = %client_id, reset_secs = reset_after.as_secs(), "Quota exhausted");
        }

        Ok(QuotaCheck {
            allowed,
            remaining,
            reset_after,
        })
    }

    /// Charges `client_id` for one completed operation.
    ///
    /// No floor is applied; the gate in [`Self::check_and_reserve`] is what
    /// stops further requests.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store errors. The charged operation has
    /// already happened at that point, so callers should still report success.
    pub async fn commit(&self, client_id: &str) -> Result<QuotaStatus, AppError> {
        let key = quota_key(client_id);
        let remaining = self.store.decr(&key).await?;

        match self.store.ttl(&key).await? {
            Some(ttl) => Ok(QuotaStatus {
                remaining,
                reset_minutes: whole_minutes(ttl),
            }),
            None => {
                // The window expired before the charge landed and DECR created a
                // persistent key; charge a fresh window instead.
                let remaining = self.max_requests - 1;
                self.store
                    .set(&key, &remaining.to_string(), self.window)
                    .await?;
                Ok(QuotaStatus {
                    remaining,
                    reset_minutes: whole_minutes(self.window),
                })
            }
        }
    }

    /// Current quota state of `client_id`, or `None` if no window is active.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store errors.
    pub async fn status(&self, client_id: &str) -> Result<Option<QuotaStatus>, AppError> {
        let key = quota_key(client_id);
        let Some(remaining) = self.read_remaining(&key).await? else {
            return Ok(None);
        };
        let ttl = self.store.ttl(&key).await?.unwrap_or(Duration::ZERO);

        Ok(Some(QuotaStatus {
            remaining,
            reset_minutes: whole_minutes(ttl),
        }))
    }

    /// Drops the active window of `client_id`. Returns `true` if one existed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store errors.
    pub async fn reset(&self, client_id: &str) -> Result<bool, AppError> {
        Ok(self.store.delete(&quota_key(client_id)).await?)
    }

    fn fresh_window(&self) -> QuotaCheck {
        QuotaCheck {
            allowed: true,
            remaining: self.max_requests,
            reset_after: self.window,
        }
    }

    async fn read_remaining(&self, key: &str) -> Result<Option<i64>, StoreError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        raw.parse()
            .map(Some)
            .map_err(|_| StoreError::InvalidValue {
                key: key.to_string(),
                value: raw,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockKeyValueStore;
    use crate::infrastructure::store::InMemoryStore;

    fn memory_service(max: u32) -> QuotaService {
        QuotaService::new(Arc::new(InMemoryStore::new()), max)
    }

    #[tokio::test]
    async fn test_first_check_opens_window() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_set_if_absent()
            .withf(|key, value, ttl| key == "quota:1.2.3.4" && value == "10" && *ttl == QUOTA_WINDOW)
            .times(1)
            .returning(|_, _, _| Ok(true));
        store.expect_get().times(0);

        let service = QuotaService::new(Arc::new(store), 10);
        let check = service.check_and_reserve("1.2.3.4").await.unwrap();

        assert!(check.allowed);
        assert_eq!(check.remaining, 10);
        assert_eq!(check.reset_minutes(), 30);
    }

    #[tokio::test]
    async fn test_exhausted_window_is_refused() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_set_if_absent()
            .returning(|_, _, _| Ok(false));
        store
            .expect_get()
            .returning(|_| Ok(Some("0".to_string())));
        store
            .expect_ttl()
            .returning(|_| Ok(Some(Duration::from_secs(17 * 60 + 42))));

        let service = QuotaService::new(Arc::new(store), 10);
        let check = service.check_and_reserve("1.2.3.4").await.unwrap();

        assert!(!check.allowed);
        assert_eq!(check.reset_minutes(), 17);
    }

    #[tokio::test]
    async fn test_negative_remaining_is_refused() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_set_if_absent()
            .returning(|_, _, _| Ok(false));
        store
            .expect_get()
            .returning(|_| Ok(Some("-2".to_string())));
        store
            .expect_ttl()
            .returning(|_| Ok(Some(Duration::from_secs(60))));

        let service = QuotaService::new(Arc::new(store), 10);
        assert!(!service.check_and_reserve("c").await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_check_store_failure_is_not_allowed() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_set_if_absent()
            .returning(|_, _, _| Err(StoreError::Timeout(Duration::from_secs(1))));

        let service = QuotaService::new(Arc::new(store), 10);
        assert!(matches!(
            service.check_and_reserve("c").await,
            Err(AppError::Internal { .. })
        ));
    }

    #[tokio::test]
    async fn test_check_corrupted_record() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_set_if_absent()
            .returning(|_, _, _| Ok(false));
        store
            .expect_get()
            .returning(|_| Ok(Some("many".to_string())));

        let service = QuotaService::new(Arc::new(store), 10);
        assert!(matches!(
            service.check_and_reserve("c").await,
            Err(AppError::Internal { .. })
        ));
    }

    #[tokio::test]
    async fn test_check_restores_missing_expiry() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_set_if_absent()
            .returning(|_, _, _| Ok(false));
        store
            .expect_get()
            .returning(|_| Ok(Some("-1".to_string())));
        store.expect_ttl().returning(|_| Ok(None));
        store
            .expect_set()
            .withf(|key, value, ttl| key == "quota:c" && value == "-1" && *ttl == QUOTA_WINDOW)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = QuotaService::new(Arc::new(store), 10);
        let check = service.check_and_reserve("c").await.unwrap();

        assert!(!check.allowed);
        assert_eq!(check.reset_minutes(), 30);
    }

    #[tokio::test]
    async fn test_commit_decrements() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_decr()
            .withf(|key| key == "quota:c")
            .times(1)
            .returning(|_| Ok(4));
        store
            .expect_ttl()
            .returning(|_| Ok(Some(Duration::from_secs(29 * 60 + 5))));

        let service = QuotaService::new(Arc::new(store), 10);
        let status = service.commit("c").await.unwrap();

        assert_eq!(status.remaining, 4);
        assert_eq!(status.reset_minutes, 29);
    }

    #[tokio::test]
    async fn test_commit_store_failure() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_decr()
            .returning(|_| Err(StoreError::Connection("refused".to_string())));

        let service = QuotaService::new(Arc::new(store), 10);
        assert!(service.commit("c").await.is_err());
    }

    #[tokio::test]
    async fn test_exactly_max_charged_requests_per_window() {
        let service = memory_service(10);

        for i in 0..10 {
            let check = service.check_and_reserve("client").await.unwrap();
            assert!(check.allowed, "request {} should be allowed", i + 1);
            let status = service.commit("client").await.unwrap();
            assert_eq!(status.remaining, 9 - i);
        }

        let check = service.check_and_reserve("client").await.unwrap();
        assert!(!check.allowed);
        assert!((1..=30).contains(&check.reset_minutes()));
    }

    #[tokio::test]
    async fn test_uncommitted_checks_are_free() {
        let service = memory_service(2);

        for _ in 0..5 {
            assert!(service.check_and_reserve("client").await.unwrap().allowed);
        }
        assert_eq!(service.status("client").await.unwrap().unwrap().remaining, 2);
    }

    #[tokio::test]
    async fn test_clients_are_independent() {
        let service = memory_service(1);

        service.check_and_reserve("a").await.unwrap();
        service.commit("a").await.unwrap();

        assert!(!service.check_and_reserve("a").await.unwrap().allowed);
        assert!(service.check_and_reserve("b").await.unwrap().allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_resets_after_window() {
        let service = memory_service(3);

        for _ in 0..3 {
            service.check_and_reserve("client").await.unwrap();
            service.commit("client").await.unwrap();
        }
        assert!(!service.check_and_reserve("client").await.unwrap().allowed);

        tokio::time::advance(QUOTA_WINDOW).await;

        let check = service.check_and_reserve("client").await.unwrap();
        assert!(check.allowed);
        assert_eq!(check.remaining, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_commit_after_window_expired_opens_fresh_window() {
        let service = memory_service(5);

        service.check_and_reserve("client").await.unwrap();
        tokio::time::advance(QUOTA_WINDOW).await;

        let status = service.commit("client").await.unwrap();
        assert_eq!(status.remaining, 4);
        assert_eq!(status.reset_minutes, 30);

        tokio::time::advance(QUOTA_WINDOW).await;
        assert_eq!(service.status("client").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reset_drops_window() {
        let service = memory_service(1);

        service.check_and_reserve("client").await.unwrap();
        service.commit("client").await.unwrap();
        assert!(service.reset("client").await.unwrap());

        assert!(service.check_and_reserve("client").await.unwrap().allowed);
        assert!(!service.reset("nobody").await.unwrap());
    }
}
