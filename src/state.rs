use std::sync::Arc;

use crate::application::services::{AnalyticsService, LinkService, QuotaService};
use crate::domain::repositories::KeyValueStore;
use crate::utils::denylist::Denylist;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub quota_service: Arc<QuotaService>,
    pub analytics_service: Arc<AnalyticsService>,
    /// Raw store handle, used by the health check.
    pub store: Arc<dyn KeyValueStore>,
    /// Public domain prefixed to short codes in responses.
    pub public_domain: String,
    /// Trust `X-Forwarded-For` / `X-Real-IP` for client identification.
    pub behind_proxy: bool,
}

impl AppState {
    /// Wires all services over a single store.
    ///
    /// The public domain is always added to the denylist so the service never
    /// shortens its own links.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        api_quota: u32,
        public_domain: impl Into<String>,
        denylist: Denylist,
        behind_proxy: bool,
    ) -> Self {
        let public_domain = public_domain.into();
        let denylist = denylist.with_host(&public_domain);

        let analytics_service = Arc::new(AnalyticsService::new(store.clone()));
        let link_service = Arc::new(LinkService::new(
            store.clone(),
            analytics_service.clone(),
            denylist,
        ));
        let quota_service = Arc::new(QuotaService::new(store.clone(), api_quota));

        Self {
            link_service,
            quota_service,
            analytics_service,
            store,
            public_domain,
            behind_proxy,
        }
    }
}
