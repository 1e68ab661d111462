//! Corsaro.red indexer: entry point of the query pipeline.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::categories::CategoryMapper;
use super::error::{IndexerError, VerifyError};
use super::pagination::{PageErrorPolicy, PaginationController};
use super::release::ReleaseBuilder;
use super::response;
use super::types::{Indexer, IndexerInfo, Privacy, Query, Release};
use crate::config::IndexerConfig;
use crate::metrics::{PARSE_FAILURES, QUERY_DURATION, RELEASES_RETURNED, SITE_REQUESTS};
use crate::transport::{ReqwestTransport, Transport, TransportError};

const LATEST_PATH: &str = "api/latests";
const SEARCH_PATH: &str = "api/search";

/// Chooses feed-mode or search-mode for each query and returns the releases.
pub struct CorsaroIndexer {
    info: IndexerInfo,
    mapper: CategoryMapper,
    transport: Arc<dyn Transport>,
    latest_url: String,
    search_url: String,
    policy: PageErrorPolicy,
}

impl CorsaroIndexer {
    /// Create an indexer over an existing transport.
    pub fn new(config: &IndexerConfig, transport: Arc<dyn Transport>) -> Self {
        let site_link = config.normalized_site_link();
        Self {
            info: IndexerInfo {
                id: "corsarored".to_string(),
                name: "Corsaro.red".to_string(),
                description: "Italian Torrents".to_string(),
                site_link: site_link.clone(),
                language: "it-it".to_string(),
                privacy: Privacy::Public,
            },
            mapper: CategoryMapper::corsaro(),
            transport,
            latest_url: format!("{}{}", site_link, LATEST_PATH),
            search_url: format!("{}{}", site_link, SEARCH_PATH),
            policy: config.on_page_error,
        }
    }

    /// Create an indexer with its own HTTP session.
    pub fn from_config(config: &IndexerConfig) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    /// Run a query: blank terms read the "latest" feed, anything else pages
    /// through the search endpoint.
    pub async fn run(&self, query: &Query) -> Result<Vec<Release>, IndexerError> {
        let start = Instant::now();
        let (mode, result) = if query.is_feed() {
            ("feed", self.feed().await)
        } else {
            let term = query.search_string();
            let category_filter = self.mapper.to_native_filter(&query.categories);
            debug!(term = %term, category = %category_filter, "Starting search");
            let result = PaginationController::new(
                self.transport.as_ref(),
                &self.search_url,
                &self.mapper,
                self.policy,
            )
            .search(&term, &category_filter)
            .await;
            ("search", result)
        };

        let elapsed = start.elapsed().as_secs_f64();
        match &result {
            Ok(releases) => {
                QUERY_DURATION
                    .with_label_values(&[mode, "success"])
                    .observe(elapsed);
                RELEASES_RETURNED
                    .with_label_values(&[mode])
                    .observe(releases.len() as f64);
                debug!(mode, releases = releases.len(), elapsed_secs = elapsed, "Query complete");
            }
            Err(e) => {
                QUERY_DURATION
                    .with_label_values(&[mode, "error"])
                    .observe(elapsed);
                warn!(mode, error = %e, "Query failed");
            }
        }

        result
    }

    async fn feed(&self) -> Result<Vec<Release>, IndexerError> {
        debug!(url = %self.latest_url, "Requesting latest feed");
        let fetched = match self.transport.get(&self.latest_url).await {
            Ok(resp) => response::accept(resp).map_err(IndexerError::from),
            Err(e) => Err(e.into()),
        };
        let status = if fetched.is_ok() { "success" } else { "error" };
        SITE_REQUESTS.with_label_values(&["latest", status]).inc();
        let payload = fetched?;

        let items = response::parse_feed(&payload).inspect_err(|e| {
            if let IndexerError::Parse(parse) = e {
                PARSE_FAILURES.with_label_values(&["payload"]).inc();
                warn!(
                    error = %parse,
                    payload = %parse.payload_excerpt(),
                    "Failed to parse latest feed"
                );
            }
        })?;

        Ok(ReleaseBuilder::new(&self.mapper).build_all(&items))
    }
}

#[async_trait]
impl Indexer for CorsaroIndexer {
    fn info(&self) -> &IndexerInfo {
        &self.info
    }

    fn categories(&self) -> &CategoryMapper {
        &self.mapper
    }

    async fn search(&self, query: &Query) -> Result<Vec<Release>, IndexerError> {
        self.run(query).await
    }

    async fn verify(&self) -> Result<usize, VerifyError> {
        match self.run(&Query::default()).await {
            Ok(releases) if !releases.is_empty() => {
                info!(indexer = %self.info.id, releases = releases.len(), "Indexer verified");
                Ok(releases.len())
            }
            Ok(_) => Err(VerifyError { cause: None }),
            Err(e) => Err(VerifyError { cause: Some(e) }),
        }
    }
}
