//! Conversion of raw site items into [`Release`] records.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::categories::CategoryMapper;
use super::error::ParseError;
use super::types::{RawItem, Release};
use crate::metrics::PARSE_FAILURES;

/// Builds releases, mapping native categories through the site's table.
#[derive(Debug, Clone, Copy)]
pub struct ReleaseBuilder<'a> {
    mapper: &'a CategoryMapper,
}

impl<'a> ReleaseBuilder<'a> {
    pub fn new(mapper: &'a CategoryMapper) -> Self {
        Self { mapper }
    }

    /// Decode and build one item candidate.
    pub fn build(&self, item: &Value) -> Result<Release, ParseError> {
        let raw: RawItem = serde_json::from_value(item.clone())
            .map_err(|e| ParseError::new(format!("invalid item: {}", e), item.to_string()))?;
        self.build_raw(raw)
            .map_err(|e| ParseError::new(e.reason, item.to_string()))
    }

    /// Build from an already decoded item.
    pub fn build_raw(&self, item: RawItem) -> Result<Release, ParseError> {
        let comments = parse_uri("link", &item.link)?;
        let magnet_uri = parse_uri("magnet", &item.magnet)?;

        let publish_date = non_empty(item.last_updated).and_then(|d| {
            let parsed = parse_publish_date(&d);
            if parsed.is_none() {
                debug!(value = %d, "Unparseable last_updated, leaving publish date unset");
            }
            parsed
        });

        Ok(Release {
            title: item.title,
            comments,
            publish_date,
            category: self.mapper.to_internal(item.category),
            size_bytes: item.size,
            grabs: item.completed,
            description: non_empty(item.description),
            seeders: item.seeders,
            peers: u64::from(item.seeders) + u64::from(item.leechers),
            info_hash: non_empty(item.hash),
            magnet_uri,
        })
    }

    /// Build every candidate, dropping (and reporting) the malformed ones.
    pub fn build_all(&self, items: &[Value]) -> Vec<Release> {
        items
            .iter()
            .filter_map(|item| match self.build(item) {
                Ok(release) => Some(release),
                Err(e) => {
                    PARSE_FAILURES.with_label_values(&["item"]).inc();
                    warn!(
                        error = %e,
                        payload = %e.payload_excerpt(),
                        "Skipping malformed item"
                    );
                    None
                }
            })
            .collect()
    }
}

fn parse_uri(field: &str, value: &str) -> Result<Url, ParseError> {
    Url::parse(value.trim())
        .map_err(|e| ParseError::new(format!("'{}' is not a valid URI: {}", field, e), value))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse the site's `last_updated` timestamp. Offset-less forms are taken as UTC.
pub fn parse_publish_date(date_str: &str) -> Option<DateTime<Utc>> {
    let date_str = date_str.trim();
    DateTime::parse_from_rfc3339(date_str)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            [
                "%Y-%m-%d %H:%M:%S",
                "%Y-%m-%dT%H:%M:%S",
                "%Y-%m-%dT%H:%M:%S%.f",
                "%Y-%m-%d %H:%M:%S%.f",
            ]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(date_str, fmt).ok())
            .map(|ndt| ndt.and_utc())
        })
}
