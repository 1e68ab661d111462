//! HTTP transport abstraction.
//!
//! The indexer only needs "GET this URL" and "POST these key/value pairs";
//! cookies, timeouts, session pacing and retries live behind this trait so the
//! query pipeline can be driven by a scripted transport in tests.

mod http;

pub use http::ReqwestTransport;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by the transport itself, before any payload is inspected.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    Request(String),
}

impl TransportError {
    /// Whether a retry may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::Timeout | TransportError::ConnectionFailed(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::ConnectionFailed(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

/// Status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for the HTTP collaborator of the indexer.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET a URL.
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError>;

    /// POST ordered key/value pairs to a URL.
    async fn post(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<TransportResponse, TransportError>;
}
