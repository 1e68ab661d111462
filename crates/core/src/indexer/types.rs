//! Types for the indexer query pipeline.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;
use url::Url;

use super::categories::{CategoryCode, CategoryMapper};
use super::error::{IndexerError, VerifyError};

/// Query parameters for a release search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Free-text search term. Blank selects the "latest" feed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    /// Torznab codes to restrict to. Empty means all categories.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub categories: BTreeSet<CategoryCode>,
    /// Optional season for TV searches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    /// Optional episode, only meaningful with a season.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<String>,
}

impl Query {
    /// Query with a search term and no category restriction.
    pub fn term(term: impl Into<String>) -> Self {
        Self {
            term: Some(term.into()),
            ..Default::default()
        }
    }

    pub fn with_categories(mut self, categories: impl IntoIterator<Item = CategoryCode>) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    pub fn with_episode(mut self, season: u32, episode: Option<String>) -> Self {
        self.season = Some(season);
        self.episode = episode;
        self
    }

    /// Episode string such as "S01" or "S01E05".
    pub fn episode_string(&self) -> Option<String> {
        self.season.map(|s| match self.episode.as_deref().map(str::trim) {
            Some(ep) if !ep.is_empty() => format!("S{:02}E{}", s, ep),
            _ => format!("S{:02}", s),
        })
    }

    /// The text actually sent as `term`.
    pub fn search_string(&self) -> String {
        let term = self.term.as_deref().unwrap_or("").trim();
        match self.episode_string() {
            Some(ep) if term.is_empty() => ep,
            Some(ep) => format!("{} {}", term, ep),
            None => term.to_string(),
        }
    }

    /// Whether this query runs against the "latest" feed.
    pub fn is_feed(&self) -> bool {
        self.search_string().is_empty()
    }
}

/// One item as returned by the site, in either response shape.
#[derive(Debug, Clone, Deserialize)]
pub struct RawItem {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub last_updated: Option<String>,
    pub category: i64,
    #[serde(default)]
    pub size: Option<u64>,
    /// Cumulative completed downloads.
    pub completed: u64,
    #[serde(default)]
    pub description: Option<String>,
    pub seeders: u32,
    pub leechers: u32,
    #[serde(default)]
    pub hash: Option<String>,
    pub magnet: String,
}

/// A release normalized for the aggregator.
///
/// The guid is not stored separately: it is always the comments URI.
#[derive(Debug, Clone, PartialEq)]
pub struct Release {
    pub title: String,
    pub(crate) comments: Url,
    pub publish_date: Option<DateTime<Utc>>,
    pub category: CategoryCode,
    pub size_bytes: Option<u64>,
    pub grabs: u64,
    pub description: Option<String>,
    pub seeders: u32,
    /// Seeders plus leechers, widened so the sum cannot overflow.
    pub peers: u64,
    pub info_hash: Option<String>,
    pub magnet_uri: Url,
}

impl Release {
    /// Details page of the release on the site.
    pub fn comments(&self) -> &Url {
        &self.comments
    }

    /// Unique id of the release, identical to [`Release::comments`].
    pub fn guid(&self) -> &Url {
        &self.comments
    }

    /// Leechers as reported by the site.
    pub fn leechers(&self) -> u64 {
        self.peers - u64::from(self.seeders)
    }
}

impl Serialize for Release {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Release", 12)?;
        s.serialize_field("title", &self.title)?;
        s.serialize_field("guid", self.guid().as_str())?;
        s.serialize_field("comments", self.comments.as_str())?;
        s.serialize_field("publish_date", &self.publish_date)?;
        s.serialize_field("category", &self.category)?;
        s.serialize_field("size", &self.size_bytes)?;
        s.serialize_field("grabs", &self.grabs)?;
        s.serialize_field("description", &self.description)?;
        s.serialize_field("seeders", &self.seeders)?;
        s.serialize_field("peers", &self.peers)?;
        s.serialize_field("info_hash", &self.info_hash)?;
        s.serialize_field("magnet_uri", self.magnet_uri.as_str())?;
        s.end()
    }
}

/// Whether the tracker requires an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    Public,
    SemiPrivate,
    Private,
}

/// Static description of an indexer.
#[derive(Debug, Clone, Serialize)]
pub struct IndexerInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub site_link: String,
    pub language: String,
    pub privacy: Privacy,
}

/// Trait for a single-site indexer.
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Identity of the indexer for logging and the API.
    fn info(&self) -> &IndexerInfo;

    /// Category table of the site.
    fn categories(&self) -> &CategoryMapper;

    /// Run a query and return the normalized releases.
    async fn search(&self, query: &Query) -> Result<Vec<Release>, IndexerError>;

    /// Check that the site answers with at least one release.
    async fn verify(&self) -> Result<usize, VerifyError>;
}
