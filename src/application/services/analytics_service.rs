//! Global resolution counter.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::keys::RESOLUTION_COUNTER_KEY;
use crate::domain::repositories::KeyValueStore;
use crate::error::AppError;

/// Best-effort usage counter.
///
/// Increments run in detached tasks and never report back to the request that
/// triggered them. Lost increments are acceptable.
pub struct AnalyticsService {
    store: Arc<dyn KeyValueStore>,
}

impl AnalyticsService {
    /// Creates a new analytics service.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Counts one successful resolution in the background.
    ///
    /// Must be called from within a tokio runtime. The returned handle may be
    /// dropped; it exists so tests can wait for the increment.
    pub fn record_resolution(&self) -> JoinHandle<()> {
        let store = self.store.clone();
        tokio::spawn(async move {
            if let Err(e) = store.incr(RESOLUTION_COUNTER_KEY).await {
                tracing::debug!(error = %e, "Dropped resolution count");
            }
        })
    }

    /// Total successful resolutions recorded so far.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store errors or a corrupted counter.
    pub async fn total_resolutions(&self) -> Result<i64, AppError> {
        let Some(raw) = self.store.get(RESOLUTION_COUNTER_KEY).await? else {
            return Ok(0);
        };

        raw.parse().map_err(|_| {
            AppError::internal(
                "Resolution counter is corrupted",
                serde_json::json!({ "value": raw }),
            )
        })
    }
}
