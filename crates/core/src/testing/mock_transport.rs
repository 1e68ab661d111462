//! Scripted transport for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::transport::{Transport, TransportError, TransportResponse};

/// Body served for search pages nobody configured.
const EMPTY_PAGE: &str = r#"{"results": []}"#;

/// Body served for the feed when nobody configured it.
const EMPTY_FEED: &str = "[]";

/// What the mock answers for one endpoint or page.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// A response with the given status and body.
    Body(TransportResponse),
    /// Fail with [`TransportError::Timeout`].
    Timeout,
    /// Fail with [`TransportError::ConnectionFailed`].
    ConnectionFailed,
}

impl MockReply {
    /// A 200 response with this body.
    pub fn ok(body: impl Into<String>) -> Self {
        MockReply::Body(TransportResponse::ok(body))
    }

    /// A response with a non-success status.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        MockReply::Body(TransportResponse {
            status,
            body: body.into(),
        })
    }

    fn into_result(self) -> Result<TransportResponse, TransportError> {
        match self {
            MockReply::Body(response) => Ok(response),
            MockReply::Timeout => Err(TransportError::Timeout),
            MockReply::ConnectionFailed => {
                Err(TransportError::ConnectionFailed("mock connection refused".to_string()))
            }
        }
    }
}

/// A recorded request for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// "GET" or "POST".
    pub method: &'static str,
    pub url: String,
    /// POSTed pairs in the order they were sent. Empty for GET.
    pub params: Vec<(String, String)>,
}

impl RecordedRequest {
    /// Value of a POSTed parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Mock implementation of the Transport trait.
///
/// GET requests are answered with the "latest" reply. POST requests are
/// answered with the reply configured for the `page` parameter, and with an
/// empty results page when none is configured.
///
/// # Example
///
/// ```rust,ignore
/// use corsaro_core::testing::{fixtures, MockTransport};
///
/// let transport = MockTransport::new();
/// transport.set_page(1, fixtures::page_payload(&fixtures::items(25, 1))).await;
///
/// let indexer = CorsaroIndexer::new(&IndexerConfig::default(), Arc::new(transport));
/// ```
#[derive(Debug, Default)]
pub struct MockTransport {
    latest: Arc<RwLock<Option<MockReply>>>,
    pages: Arc<RwLock<HashMap<u32, MockReply>>>,
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve this body from the "latest" feed.
    pub async fn set_latest(&self, body: impl Into<String>) {
        self.set_latest_reply(MockReply::ok(body)).await;
    }

    pub async fn set_latest_reply(&self, reply: MockReply) {
        *self.latest.write().await = Some(reply);
    }

    /// Serve this body for a search page number.
    pub async fn set_page(&self, page: u32, body: impl Into<String>) {
        self.set_page_reply(page, MockReply::ok(body)).await;
    }

    pub async fn set_page_reply(&self, page: u32, reply: MockReply) {
        self.pages.write().await.insert(page, reply);
    }

    /// Every request received so far, oldest first.
    pub async fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().await.clone()
    }

    /// Page numbers of the search requests received so far, in order.
    pub async fn requested_pages(&self) -> Vec<u32> {
        self.requests
            .read()
            .await
            .iter()
            .filter_map(|r| r.param("page").and_then(|p| p.parse().ok()))
            .collect()
    }

    pub async fn clear_requests(&self) {
        self.requests.write().await.clear();
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        self.requests.write().await.push(RecordedRequest {
            method: "GET",
            url: url.to_string(),
            params: Vec::new(),
        });

        self.latest
            .read()
            .await
            .clone()
            .unwrap_or_else(|| MockReply::ok(EMPTY_FEED))
            .into_result()
    }

    async fn post(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<TransportResponse, TransportError> {
        let request = RecordedRequest {
            method: "POST",
            url: url.to_string(),
            params: params.to_vec(),
        };
        let page = request.param("page").and_then(|p| p.parse::<u32>().ok());
        self.requests.write().await.push(request);

        let reply = match page {
            Some(page) => self.pages.read().await.get(&page).cloned(),
            None => None,
        };
        reply.unwrap_or_else(|| MockReply::ok(EMPTY_PAGE)).into_result()
    }
}
