#![allow(dead_code)]

use axum::Router;
use axum::extract::ConnectInfo;
use axum_test::TestServer;
use redilink::domain::repositories::KeyValueStore;
use redilink::infrastructure::store::InMemoryStore;
use redilink::routes::router;
use redilink::state::AppState;
use redilink::utils::denylist::Denylist;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::Layer;

pub const TEST_DOMAIN: &str = "sho.rt";
pub const TEST_QUOTA: u32 = 10;
pub const TEST_PEER: &str = "127.0.0.1:12345";

pub fn create_test_state(store: Arc<dyn KeyValueStore>) -> AppState {
    AppState::new(
        store,
        TEST_QUOTA,
        TEST_DOMAIN,
        Denylist::from_csv("evil.com, spam.net"),
        false,
    )
}

pub fn create_test_server(state: AppState) -> TestServer {
    create_test_server_from(state, TEST_PEER)
}

/// Full router with every request appearing to come from `peer`.
pub fn create_test_server_from(state: AppState, peer: &str) -> TestServer {
    let app: Router = router(state).layer(MockConnectInfoLayer::new(peer));
    TestServer::new(app).unwrap()
}

pub fn memory_store() -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::new())
}

pub async fn create_test_link(store: &dyn KeyValueStore, code: &str, url: &str) {
    store
        .set(&format!("link:{code}"), url, Duration::from_secs(3600))
        .await
        .unwrap();
}

#[derive(Clone)]
pub struct MockConnectInfoLayer {
    addr: SocketAddr,
}

impl MockConnectInfoLayer {
    pub fn new(addr: &str) -> Self {
        Self {
            addr: addr.parse().unwrap(),
        }
    }
}

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService {
            inner,
            addr: self.addr,
        }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
    addr: SocketAddr,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        req.extensions_mut().insert(ConnectInfo(self.addr));
        self.inner.call(req)
    }
}
