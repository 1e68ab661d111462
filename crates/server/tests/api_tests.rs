//! In-process API tests.
//!
//! Every request goes through the router, the indexer and a scripted transport.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{fixtures, TestFixture};
use corsaro_core::testing::MockReply;
use corsaro_core::PageErrorPolicy;

// =============================================================================
// Health, config, indexer info
// =============================================================================

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/health").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_is_sanitized() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/config").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["indexer"]["site_link"], "https://corsaro.red/");
    assert_eq!(response.body["indexer"]["user_agent_configured"], true);
    assert_eq!(response.body["indexer"]["on_page_error"], "skip");
    assert!(response.body["indexer"].get("user_agent").is_none());
}

#[tokio::test]
async fn test_indexer_info_and_categories() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/indexer").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["id"], "corsarored");
    assert_eq!(response.body["name"], "Corsaro.red");
    assert_eq!(response.body["language"], "it-it");
    assert_eq!(response.body["privacy"], "public");

    let categories = response.body["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 7);
    assert_eq!(
        categories[2],
        json!({"native_id": 2, "code": 2000, "name": "Movies", "description": "Movies"})
    );
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_without_term_reads_feed() {
    let fixture = TestFixture::new();
    fixture
        .transport
        .set_latest(fixtures::feed_payload(&fixtures::items(3, 1)))
        .await;

    let response = fixture.get("/api/v1/search").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["count"], 3);
    assert!(response.body.get("error").is_none());

    let requests = fixture.transport.recorded_requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
}

#[tokio::test]
async fn test_search_release_shape() {
    let fixture = TestFixture::new();
    fixture
        .transport
        .set_page(1, fixtures::page_payload(&[fixtures::raw_item("Matrix", 2)]))
        .await;

    let response = fixture.get("/api/v1/search?q=matrix").await;

    assert_status!(response, StatusCode::OK);
    let release = &response.body["releases"][0];
    assert_eq!(release["title"], "Matrix");
    assert_eq!(release["category"], 2000);
    assert_eq!(release["guid"], release["comments"]);
    assert_eq!(release["grabs"], 42);
    assert_eq!(release["seeders"], 12);
    assert_eq!(release["peers"], 15);
    assert_eq!(release["publish_date"], "2024-03-01T18:30:00Z");
}

#[tokio::test]
async fn test_search_sends_native_categories() {
    let fixture = TestFixture::new();

    let response = fixture
        .get("/api/v1/search?q=gomorra&cat=5070,5000&season=1&ep=4")
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["count"], 0);

    let requests = fixture.transport.recorded_requests().await;
    assert_eq!(requests[0].param("term"), Some("gomorra S01E4"));
    assert_eq!(requests[0].param("category"), Some("1,7"));
}

#[tokio::test]
async fn test_search_paginates() {
    let fixture = TestFixture::new();
    fixture
        .transport
        .set_page(1, fixtures::page_payload(&fixtures::items(25, 1)))
        .await;
    fixture
        .transport
        .set_page(2, fixtures::page_payload(&fixtures::items(10, 2)))
        .await;

    let response = fixture.get("/api/v1/search?q=matrix").await;

    assert_eq!(response.body["count"], 35);
    assert_eq!(fixture.transport.requested_pages().await, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_search_failure_answers_no_results_with_error() {
    let fixture = TestFixture::new();
    fixture.transport.set_page(1, r#"{"ok": false}"#).await;

    let response = fixture.get("/api/v1/search?q=matrix").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["count"], 0);
    assert_eq!(response.body["releases"], json!([]));
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .contains("Remote error"));
}

#[tokio::test]
async fn test_search_abort_policy_reports_parse_error() {
    let fixture = TestFixture::with_policy(PageErrorPolicy::Abort);
    fixture.transport.set_page(1, "<html>maintenance</html>").await;

    let response = fixture.get("/api/v1/search?q=matrix").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["count"], 0);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .contains("Parse error"));
}

#[tokio::test]
async fn test_search_rejects_bad_category() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/search?q=matrix&cat=movies").await;

    assert_status!(response, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].as_str().unwrap().contains("movies"));
    assert!(fixture.transport.recorded_requests().await.is_empty());
}

// =============================================================================
// Verify
// =============================================================================

#[tokio::test]
async fn test_verify_ok() {
    let fixture = TestFixture::new();
    fixture
        .transport
        .set_latest(fixtures::feed_payload(&fixtures::items(4, 1)))
        .await;

    let response = fixture.post("/api/v1/indexer/verify").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["ok"], true);
    assert_eq!(response.body["releases_found"], 4);
}

#[tokio::test]
async fn test_verify_empty_feed() {
    let fixture = TestFixture::new();

    let response = fixture.post("/api/v1/indexer/verify").await;

    assert_eq!(response.body["ok"], false);
    assert_eq!(
        response.body["error"],
        "Could not find any release from this source"
    );
}

#[tokio::test]
async fn test_verify_transport_failure() {
    let fixture = TestFixture::new();
    fixture
        .transport
        .set_latest_reply(MockReply::ConnectionFailed)
        .await;

    let response = fixture.post("/api/v1/indexer/verify").await;

    assert_eq!(response.body["ok"], false);
    let error = response.body["error"].as_str().unwrap();
    assert!(error.starts_with("Could not find any release from this source"));
    assert!(error.contains("Connection failed"));
}

// =============================================================================
// Metrics
// =============================================================================

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new();
    fixture.get("/api/v1/health").await;

    let response = fixture.get("/metrics").await;

    assert_status!(response, StatusCode::OK);
    assert!(response.text.contains("corsaro_http_requests_total"));
    assert!(response.text.contains("/api/v1/health"));
}
