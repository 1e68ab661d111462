//! Prometheus metrics for the indexer pipeline.
//!
//! This module provides metrics for:
//! - Requests sent to the site (per endpoint and outcome)
//! - Parse failures (whole payloads and single items)
//! - Query duration and releases returned

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Site Requests
// =============================================================================

/// Requests sent to the site.
pub static SITE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("corsaro_site_requests_total", "Total requests sent to the site"),
        &["endpoint", "status"], // endpoint: "latest", "search"; status: "success", "error"
    )
    .unwrap()
});

/// Parse failures by scope.
pub static PARSE_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "corsaro_parse_failures_total",
            "Total payloads or items that could not be parsed",
        ),
        &["scope"], // "payload", "item"
    )
    .unwrap()
});

// =============================================================================
// Queries
// =============================================================================

/// Query duration in seconds.
pub static QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "corsaro_query_duration_seconds",
            "Duration of a full query, all pages included",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["mode", "result"], // mode: "feed", "search"; result: "success", "error"
    )
    .unwrap()
});

/// Releases returned per query.
pub static RELEASES_RETURNED: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "corsaro_releases_returned",
            "Number of releases returned per query",
        )
        .buckets(vec![0.0, 1.0, 10.0, 25.0, 50.0, 100.0, 200.0]),
        &["mode"],
    )
    .unwrap()
});

/// Pages fetched per search query.
pub static PAGES_FETCHED: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "corsaro_pages_fetched",
            "Number of search pages requested per query",
        )
        .buckets(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]),
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SITE_REQUESTS.clone()),
        Box::new(PARSE_FAILURES.clone()),
        Box::new(QUERY_DURATION.clone()),
        Box::new(RELEASES_RETURNED.clone()),
        Box::new(PAGES_FETCHED.clone()),
    ]
}
