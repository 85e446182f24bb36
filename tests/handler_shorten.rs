mod common;

use async_trait::async_trait;
use redilink::domain::repositories::{KeyValueStore, StoreError, StoreResult};
use redilink::infrastructure::store::InMemoryStore;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

/// In-memory store whose `DECR` always times out.
#[derive(Default)]
struct FailingChargeStore {
    inner: InMemoryStore,
}

#[async_trait]
impl KeyValueStore for FailingChargeStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get(key).await
    }
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        self.inner.set(key, value, ttl).await
    }
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<bool> {
        self.inner.set_if_absent(key, value, ttl).await
    }
    async fn incr(&self, key: &str) -> StoreResult<i64> {
        self.inner.incr(key).await
    }
    async fn decr(&self, _key: &str) -> StoreResult<i64> {
        Err(StoreError::Timeout(Duration::from_secs(1)))
    }
    async fn ttl(&self, key: &str) -> StoreResult<Option<Duration>> {
        self.inner.ttl(key).await
    }
    async fn delete(&self, key: &str) -> StoreResult<bool> {
        self.inner.delete(key).await
    }
    async fn ping(&self) -> bool {
        self.inner.ping().await
    }
}

#[tokio::test]
async fn test_shorten_generates_code() {
    let store = common::memory_store();
    let server = common::create_test_server(common::create_test_state(store.clone()));

    let response = server
        .post("/api/v1")
        .json(&json!({ "url": "https://example.com/some/path" }))
        .await;

    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["url"], "https://example.com/some/path");
    assert_eq!(body["expiry"], 24);
    assert_eq!(body["rate_limit"], common::TEST_QUOTA - 1);
    // Truncated to whole minutes, so just under a full window reads 29
    let reset = body["rate_limit_reset"].as_i64().unwrap();
    assert!((29..=30).contains(&reset));

    let short = body["short"].as_str().unwrap();
    let code = short.strip_prefix("sho.rt/").unwrap();
    assert_eq!(code.len(), 6);

    let stored = store.get(&format!("link:{code}")).await.unwrap();
    assert_eq!(stored.as_deref(), Some("https://example.com/some/path"));
}

#[tokio::test]
async fn test_shorten_prefixes_scheme_and_honours_expiry() {
    let store = common::memory_store();
    let server = common::create_test_server(common::create_test_state(store.clone()));

    let response = server
        .post("/api/v1")
        .json(&json!({ "url": "example.com", "short": "ex", "expiry": 1 }))
        .await;

    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["url"], "http://example.com");
    assert_eq!(body["short"], "sho.rt/ex");
    assert_eq!(body["expiry"], 1);

    let ttl = store.ttl("link:ex").await.unwrap().unwrap();
    assert!(ttl.as_secs() <= 3600 && ttl.as_secs() > 3590);

    let redirect = server.get("/ex").await;
    assert_eq!(redirect.status_code(), 301);
    assert_eq!(redirect.header("location"), "http://example.com");
}

#[tokio::test]
async fn test_shorten_custom_code_conflict() {
    let store = common::memory_store();
    common::create_test_link(&*store, "taken", "https://first.example").await;
    let server = common::create_test_server(common::create_test_state(store.clone()));

    let response = server
        .post("/api/v1")
        .json(&json!({ "url": "https://second.example", "short": "taken" }))
        .await;

    assert_eq!(response.status_code(), 403);
    let body = response.json::<Value>();
    assert_eq!(body["error"], "Custom short URL already exists");
    assert_eq!(body["code"], "conflict");

    let stored = store.get("link:taken").await.unwrap();
    assert_eq!(stored.as_deref(), Some("https://first.example"));
}

#[tokio::test]
async fn test_conflict_is_not_charged() {
    let store = common::memory_store();
    common::create_test_link(&*store, "taken", "https://first.example").await;
    let server = common::create_test_server(common::create_test_state(store.clone()));

    server
        .post("/api/v1")
        .json(&json!({ "url": "https://second.example", "short": "taken" }))
        .await;

    let response = server
        .post("/api/v1")
        .json(&json!({ "url": "https://second.example" }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["rate_limit"], common::TEST_QUOTA - 1);
}

#[tokio::test]
async fn test_shorten_denylisted_domain() {
    let store = common::memory_store();
    let server = common::create_test_server(common::create_test_state(store.clone()));

    for url in ["https://evil.com/x", "http://www.evil.com", "sho.rt/abc"] {
        let response = server
            .post("/api/v1")
            .json(&json!({ "url": url, "short": "blocked" }))
            .await;

        assert_eq!(response.status_code(), 503, "{url} should be refused");
        assert_eq!(response.json::<Value>()["code"], "forbidden_domain");
    }

    assert_eq!(store.get("link:blocked").await.unwrap(), None);
}

#[tokio::test]
async fn test_shorten_invalid_url() {
    let server = common::create_test_server(common::create_test_state(common::memory_store()));

    for url in ["", "ftp://example.com/file", "http://"] {
        let response = server.post("/api/v1").json(&json!({ "url": url })).await;
        assert_eq!(response.status_code(), 400, "{url:?} should be rejected");
        assert_eq!(response.json::<Value>()["code"], "validation_error");
    }
}

#[tokio::test]
async fn test_shorten_invalid_custom_code() {
    let server = common::create_test_server(common::create_test_state(common::memory_store()));

    for short in ["has/slash", "health", "x".repeat(51).as_str()] {
        let response = server
            .post("/api/v1")
            .json(&json!({ "url": "https://example.com", "short": short }))
            .await;
        assert_eq!(response.status_code(), 400, "{short:?} should be rejected");
    }
}

#[tokio::test]
async fn test_shorten_negative_expiry() {
    let server = common::create_test_server(common::create_test_state(common::memory_store()));

    let response = server
        .post("/api/v1")
        .json(&json!({ "url": "https://example.com", "expiry": -5 }))
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["details"]["fields"], json!(["expiry"]));
}

#[tokio::test]
async fn test_shorten_malformed_body() {
    let server = common::create_test_server(common::create_test_state(common::memory_store()));

    let response = server
        .post("/api/v1")
        .content_type("application/json")
        .text("{not json")
        .await;

    assert_eq!(response.status_code(), 400);
    let body = response.json::<Value>();
    assert_eq!(body["error"], "Invalid request");

    let missing_url = server.post("/api/v1").json(&json!({ "short": "abc" })).await;
    assert_eq!(missing_url.status_code(), 400);
}

#[tokio::test]
async fn test_quota_exhausted_after_max_requests() {
    let server = common::create_test_server(common::create_test_state(common::memory_store()));

    for i in 0..common::TEST_QUOTA {
        let response = server
            .post("/api/v1")
            .json(&json!({ "url": format!("https://example.com/{i}") }))
            .await;
        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>()["rate_limit"],
            common::TEST_QUOTA - 1 - i
        );
    }

    let response = server
        .post("/api/v1")
        .json(&json!({ "url": "https://example.com/eleventh" }))
        .await;

    assert_eq!(response.status_code(), 429);
    let body = response.json::<Value>();
    assert_eq!(body["error"], "Rate limit exceeded");
    let reset = body["rate_limit_reset"].as_i64().unwrap();
    assert!((1..=30).contains(&reset));
}

#[tokio::test]
async fn test_quota_is_per_client() {
    let store = common::memory_store();
    let state = common::create_test_state(store);
    let first = common::create_test_server_from(state.clone(), "10.0.0.1:1000");
    let second = common::create_test_server_from(state, "10.0.0.2:1000");

    for _ in 0..common::TEST_QUOTA {
        first
            .post("/api/v1")
            .json(&json!({ "url": "https://example.com" }))
            .await
            .assert_status_ok();
    }

    let refused = first
        .post("/api/v1")
        .json(&json!({ "url": "https://example.com" }))
        .await;
    assert_eq!(refused.status_code(), 429);

    let response = second
        .post("/api/v1")
        .json(&json!({ "url": "https://example.com" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["rate_limit"], common::TEST_QUOTA - 1);
}

#[tokio::test]
async fn test_forwarded_for_used_behind_proxy() {
    let store = common::memory_store();
    let mut state = common::create_test_state(store.clone());
    state.behind_proxy = true;
    let server = common::create_test_server(state);

    server
        .post("/api/v1")
        .add_header("X-Forwarded-For", "203.0.113.7, 10.0.0.1")
        .json(&json!({ "url": "https://example.com" }))
        .await
        .assert_status_ok();

    assert_eq!(
        store.get("quota:203.0.113.7").await.unwrap().as_deref(),
        Some("9")
    );
    assert_eq!(store.get("quota:127.0.0.1").await.unwrap(), None);
}

#[tokio::test]
async fn test_percent_encoded_custom_code_rejected() {
    let store = common::memory_store();
    let server = common::create_test_server(common::create_test_state(store.clone()));

    let response = server
        .post("/api/v1")
        .json(&json!({ "url": "https://example.com", "short": "a%41b" }))
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["code"], "validation_error");
    assert_eq!(store.get("link:a%41b").await.unwrap(), None);
}

#[tokio::test]
async fn test_custom_code_resolves_as_returned() {
    let server = common::create_test_server(common::create_test_state(common::memory_store()));

    let created = server
        .post("/api/v1")
        .json(&json!({ "url": "https://example.com/docs", "short": "Docs-2024_v1.x~" }))
        .await;
    created.assert_status_ok();

    let short = created.json::<Value>()["short"].as_str().unwrap().to_string();
    let path = short.strip_prefix("sho.rt").unwrap();

    let response = server.get(path).await;
    assert_eq!(response.status_code(), 301);
    assert_eq!(response.header("location"), "https://example.com/docs");
}

#[tokio::test]
async fn test_failed_quota_charge_still_returns_link() {
    let store = Arc::new(FailingChargeStore::default());
    let server = common::create_test_server(common::create_test_state(store.clone()));

    let response = server
        .post("/api/v1")
        .json(&json!({ "url": "https://example.com/report", "short": "report" }))
        .await;

    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["short"], "sho.rt/report");
    assert_eq!(body["rate_limit"], common::TEST_QUOTA - 1);
    assert_eq!(body["rate_limit_reset"], 30);

    assert_eq!(
        store.get("link:report").await.unwrap().as_deref(),
        Some("https://example.com/report")
    );
    // The charge never landed
    assert_eq!(
        store.get("quota:127.0.0.1").await.unwrap().as_deref(),
        Some("10")
    );
}
