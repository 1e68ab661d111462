//! Page-fetch loop for term searches.
//!
//! Pages are requested one after the other: page `N + 1` is only requested
//! once page `N` came back non-empty. The loop stops at the first empty page
//! or after [`MAX_SEARCH_PAGES`] pages, whichever comes first.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::categories::CategoryMapper;
use super::error::IndexerError;
use super::release::ReleaseBuilder;
use super::response;
use super::types::Release;
use crate::metrics::{PAGES_FETCHED, PARSE_FAILURES, SITE_REQUESTS};
use crate::transport::Transport;

/// Hard ceiling on pages requested for one query.
pub const MAX_SEARCH_PAGES: u32 = 8;

/// Items the site serves per search page.
pub const PAGE_SIZE: usize = 25;

/// What to do with a search page whose payload cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageErrorPolicy {
    /// Report the page and move on to the next page number.
    #[default]
    Skip,
    /// Stop the query and return the parse error.
    Abort,
}

/// Parameters of one term search. Each page gets a fresh parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    term: String,
    category: String,
}

impl SearchRequest {
    pub fn new(term: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            category: category.into(),
        }
    }

    /// Ordered `(key, value)` pairs for the given page.
    pub fn params(&self, page: u32) -> Vec<(String, String)> {
        vec![
            ("term".to_string(), self.term.clone()),
            ("category".to_string(), self.category.clone()),
            ("page".to_string(), page.to_string()),
        ]
    }
}

/// Loop state of a single search call.
#[derive(Debug)]
struct PageState {
    page_number: u32,
    accumulated: Vec<Release>,
    done: bool,
}

impl PageState {
    fn new() -> Self {
        Self {
            page_number: 1,
            accumulated: Vec::new(),
            done: false,
        }
    }

    fn advance(&mut self) {
        if self.page_number >= MAX_SEARCH_PAGES {
            self.done = true;
        } else {
            self.page_number += 1;
        }
    }
}

/// Drives the search endpoint page by page.
pub struct PaginationController<'a> {
    transport: &'a dyn Transport,
    search_url: &'a str,
    builder: ReleaseBuilder<'a>,
    policy: PageErrorPolicy,
}

impl<'a> PaginationController<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        search_url: &'a str,
        mapper: &'a CategoryMapper,
        policy: PageErrorPolicy,
    ) -> Self {
        Self {
            transport,
            search_url,
            builder: ReleaseBuilder::new(mapper),
            policy,
        }
    }

    /// Run a term search with a native category filter.
    ///
    /// A remote failure on any page aborts the whole search. A page whose
    /// payload cannot be parsed is handled according to the [`PageErrorPolicy`].
    pub async fn search(
        &self,
        term: &str,
        category_filter: &str,
    ) -> Result<Vec<Release>, IndexerError> {
        let request = SearchRequest::new(term, category_filter);
        let mut state = PageState::new();
        let mut pages_fetched = 0u32;

        while !state.done {
            let page = state.page_number;
            let payload = self.fetch_page(&request, page).await?;
            pages_fetched += 1;

            match response::parse_page(&payload) {
                Ok(items) if items.is_empty() => {
                    debug!(page, "Empty page, end of results");
                    state.done = true;
                    continue;
                }
                Ok(items) => {
                    let releases = self.builder.build_all(&items);
                    debug!(page, items = items.len(), releases = releases.len(), "Page parsed");
                    state.accumulated.extend(releases);
                }
                Err(IndexerError::Parse(e)) => {
                    PARSE_FAILURES.with_label_values(&["payload"]).inc();
                    warn!(
                        page,
                        error = %e,
                        payload = %e.payload_excerpt(),
                        "Failed to parse search page"
                    );
                    if self.policy == PageErrorPolicy::Abort {
                        PAGES_FETCHED.observe(f64::from(pages_fetched));
                        return Err(e.into());
                    }
                }
                Err(e) => return Err(e),
            }

            state.advance();
        }

        PAGES_FETCHED.observe(f64::from(pages_fetched));
        Ok(state.accumulated)
    }

    async fn fetch_page(&self, request: &SearchRequest, page: u32) -> Result<String, IndexerError> {
        debug!(page, url = self.search_url, "Requesting search page");
        let result = match self.transport.post(self.search_url, &request.params(page)).await {
            Ok(resp) => response::accept(resp).map_err(IndexerError::from),
            Err(e) => Err(e.into()),
        };
        let status = if result.is_ok() { "success" } else { "error" };
        SITE_REQUESTS.with_label_values(&["search", status]).inc();
        result
    }
}
