//! Testing utilities for the query pipeline.
//!
//! [`MockTransport`] stands in for the site so that the indexer can be driven
//! page by page without a network, and [`fixtures`] builds site payloads.
//!
//! # Example
//!
//! ```rust,ignore
//! use corsaro_core::testing::{fixtures, MockReply, MockTransport};
//!
//! let transport = MockTransport::new();
//! transport.set_latest(fixtures::feed_payload(&fixtures::items(3, 1))).await;
//! transport.set_page_reply(2, MockReply::Timeout).await;
//! ```

mod mock_transport;

pub use mock_transport::{MockReply, MockTransport, RecordedRequest};

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Value};

    /// A well-formed site item with reasonable defaults.
    pub fn raw_item(title: &str, native_category: i64) -> Value {
        let slug = title.to_lowercase().replace(' ', "-");
        json!({
            "title": title,
            "link": format!("https://corsaro.red/torrent/{}", slug),
            "last_updated": "2024-03-01 18:30:00",
            "category": native_category,
            "size": 1024 * 1024 * 700,
            "completed": 42,
            "description": format!("{} description", title),
            "seeders": 12,
            "leechers": 3,
            "hash": format!("{:0>40}", slug.len()),
            "magnet": format!("magnet:?xt=urn:btih:{:0>40}&dn={}", slug.len(), slug),
        })
    }

    /// `count` movie items titled "Page {page} Item {n}", numbered from 1.
    pub fn items(count: usize, page: u32) -> Vec<Value> {
        (1..=count)
            .map(|i| raw_item(&format!("Page {} Item {}", page, i), 2))
            .collect()
    }

    /// Search page body wrapping the items in `results`.
    pub fn page_payload(items: &[Value]) -> String {
        json!({ "results": items }).to_string()
    }

    /// "Latest" feed body: a bare array of items.
    pub fn feed_payload(items: &[Value]) -> String {
        Value::Array(items.to_vec()).to_string()
    }
}
