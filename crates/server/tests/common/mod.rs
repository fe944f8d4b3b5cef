//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a mock catalog injected, so search, source and playback routes can
//! be exercised without reaching any real catalog.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use reelflix_core::{
    testing::MockCatalogClient, CatalogClient, Config, InMemorySourceRegistry, SearchCoordinator,
    SearchThrottle, SessionSnapshot, Source,
};
use reelflix_server::{api::WsBroadcaster, state::AppState};

/// Re-export fixtures for test convenience
pub use reelflix_core::testing::fixtures;

/// Test fixture for API testing with a mock catalog.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::new();
///     fixture.catalog.set_results(fixtures::BASE_A, vec![...]).await;
///
///     let response = fixture.post("/api/v1/search", json!({ "query": "matrix" })).await;
///     assert_eq!(response.status, 202);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock catalog - configure per-source results and failures
    pub catalog: Arc<MockCatalogClient>,
    /// Shared state, for reaching the coordinator directly
    pub state: Arc<AppState>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a fixture with the three standard sources and no throttle delay.
    pub fn new() -> Self {
        Self::with_sources(fixtures::sources())
    }

    pub fn with_sources(sources: Vec<Source>) -> Self {
        Self::build(sources, Duration::ZERO)
    }

    pub fn with_throttle(min_interval: Duration) -> Self {
        Self::build(fixtures::sources(), min_interval)
    }

    fn build(sources: Vec<Source>, min_interval: Duration) -> Self {
        let catalog = Arc::new(MockCatalogClient::new());

        let mut config = Config::default();
        config.search.min_interval_ms = min_interval.as_millis() as u64;
        config.sources = sources.clone();

        let registry = Arc::new(InMemorySourceRegistry::new(sources));
        let coordinator = Arc::new(
            SearchCoordinator::new(Arc::clone(&catalog) as Arc<dyn CatalogClient>)
                .with_throttle(Arc::new(SearchThrottle::new(min_interval))),
        );

        let state = Arc::new(AppState::new(
            config,
            registry,
            Arc::clone(&catalog) as Arc<dyn CatalogClient>,
            coordinator,
            WsBroadcaster::default(),
        ));

        let router = reelflix_server::api::create_router(Arc::clone(&state));

        Self {
            router,
            catalog,
            state,
        }
    }

    /// Wait for the current session to complete or be abandoned.
    pub async fn wait_for_current_session(&self) -> SessionSnapshot {
        self.state
            .coordinator()
            .current_session()
            .await
            .expect("No current session")
            .wait_until_settled()
            .await
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a GET request and return the raw body as text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&body_bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
