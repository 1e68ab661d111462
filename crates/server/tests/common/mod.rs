//! Common test utilities for in-process API testing.
//!
//! This module provides a test fixture that builds the router around a real
//! `CorsaroIndexer` whose transport is scripted, so requests exercise the
//! whole query pipeline without touching the network.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use corsaro_core::{
    testing::MockTransport, Config, CorsaroIndexer, IndexerConfig, PageErrorPolicy,
    ServerConfig,
};

/// Re-export fixtures for test convenience
pub use corsaro_core::testing::fixtures;

/// Test fixture for API testing with a scripted site.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::new();
///     fixture.transport.set_page(1, fixtures::page_payload(&fixtures::items(3, 1))).await;
///
///     let response = fixture.get("/api/v1/search?q=matrix").await;
///     assert_eq!(response.body["count"], 3);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Scripted site - configure feed and search pages
    pub transport: Arc<MockTransport>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a new test fixture with the default indexer settings.
    pub fn new() -> Self {
        Self::with_policy(PageErrorPolicy::default())
    }

    /// Create a test fixture with a given page failure policy.
    pub fn with_policy(on_page_error: PageErrorPolicy) -> Self {
        let transport = Arc::new(MockTransport::new());

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 8080, // Not used for in-process testing
            },
            indexer: IndexerConfig {
                user_agent: Some("corsaro-tests".to_string()),
                on_page_error,
                verify_on_startup: false,
                ..Default::default()
            },
        };

        let indexer = Arc::new(CorsaroIndexer::new(&config.indexer, transport.clone()));
        let state = Arc::new(corsaro_server::state::AppState::new(config, indexer));
        let router = corsaro_server::api::create_router(state);

        Self { router, transport }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path).await
    }

    /// Send a POST request without body.
    pub async fn post(&self, path: &str) -> TestResponse {
        self.request("POST", path).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
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

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status, $response.status, $response.text
        );
    };
}
