//! Corsaro.red indexer.
//!
//! A query flows through the modules in this order:
//! - `dispatcher` picks feed-mode (blank term) or search-mode
//! - `pagination` drives the search endpoint page by page
//! - `response` unwraps the payload shape of each endpoint
//! - `release` turns each item into a [`Release`], mapping its category
//!   through `categories`

mod categories;
mod dispatcher;
mod error;
mod pagination;
mod release;
mod response;
mod types;

pub use categories::{CategoryCode, CategoryMapper, CategoryMapping, ALL_CATEGORIES};
pub use dispatcher::CorsaroIndexer;
pub use error::{IndexerError, ParseError, RemoteError, VerifyError};
pub use pagination::{
    PageErrorPolicy, PaginationController, SearchRequest, MAX_SEARCH_PAGES, PAGE_SIZE,
};
pub use release::{parse_publish_date, ReleaseBuilder};
pub use response::{accept, check_ok, parse_feed, parse_page};
pub use types::{Indexer, IndexerInfo, Privacy, Query, RawItem, Release};
