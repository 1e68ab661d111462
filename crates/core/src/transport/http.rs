//! reqwest-backed transport with a cookie session.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use super::{Transport, TransportError, TransportResponse};
use crate::config::IndexerConfig;

/// Pause before retrying a transient failure.
const RETRY_PAUSE: Duration = Duration::from_millis(500);

/// HTTP transport for one site session.
///
/// Every request carries `Content-Type: application/json` and the site as
/// `Referer`. Cookies set by the site are kept for the lifetime of the client.
pub struct ReqwestTransport {
    client: Client,
    last_request: Arc<Mutex<Option<Instant>>>,
    request_delay: Duration,
    retries: u32,
}

impl ReqwestTransport {
    /// Create a transport for the configured site.
    pub fn new(config: &IndexerConfig) -> Result<Self, TransportError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        let referer = header::HeaderValue::from_str(&config.normalized_site_link())
            .map_err(|e| TransportError::Request(format!("Invalid site link header: {}", e)))?;
        headers.insert(header::REFERER, referer);

        let mut builder = Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .timeout(Duration::from_secs(u64::from(config.timeout_secs)));
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            last_request: Arc::new(Mutex::new(None)),
            request_delay: Duration::from_millis(config.request_delay_ms),
            retries: config.retries,
        })
    }

    /// Wait until the session delay since the previous request has elapsed.
    async fn wait_for_rate_limit(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.request_delay {
                let wait_time = self.request_delay - elapsed;
                debug!("Session rate limit: waiting {:?}", wait_time);
                sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }

    /// Send a request, retrying transient failures.
    async fn send<F>(&self, build: F) -> Result<TransportResponse, TransportError>
    where
        F: Fn() -> RequestBuilder + Send + Sync,
    {
        let mut attempt = 0;
        loop {
            self.wait_for_rate_limit().await;

            match self.send_once(build()).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    warn!(attempt, error = %e, "Transient transport failure, retrying");
                    sleep(RETRY_PAUSE).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(
        &self,
        request: RequestBuilder,
    ) -> Result<TransportResponse, TransportError> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, bytes = body.len(), "Site response received");
        Ok(TransportResponse { status, body })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        self.send(|| self.client.get(url)).await
    }

    async fn post(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<TransportResponse, TransportError> {
        let body: Map<String, Value> = params
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        self.send(|| self.client.post(url).json(&body)).await
    }
}
