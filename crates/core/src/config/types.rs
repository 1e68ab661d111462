use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

use crate::indexer::PageErrorPolicy;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub indexer: IndexerConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Corsaro.red indexer configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexerConfig {
    /// Base URL of the site (e.g., "https://corsaro.red/")
    #[serde(default = "default_site_link")]
    pub site_link: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Minimum delay between two requests of the same session
    #[serde(default)]
    pub request_delay_ms: u64,
    /// Transport retries on connect/timeout failures (default: 1)
    #[serde(default = "default_retries")]
    pub retries: u32,
    /// Optional User-Agent header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// What to do when a search page cannot be parsed
    #[serde(default)]
    pub on_page_error: PageErrorPolicy,
    /// Run a feed query at startup to check the site answers
    #[serde(default = "default_verify_on_startup")]
    pub verify_on_startup: bool,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            site_link: default_site_link(),
            timeout_secs: default_timeout(),
            request_delay_ms: 0,
            retries: default_retries(),
            user_agent: None,
            on_page_error: PageErrorPolicy::default(),
            verify_on_startup: default_verify_on_startup(),
        }
    }
}

impl IndexerConfig {
    /// Site link with a guaranteed trailing slash, so endpoint paths can be joined.
    pub fn normalized_site_link(&self) -> String {
        let trimmed = self.site_link.trim();
        if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{}/", trimmed)
        }
    }
}

fn default_site_link() -> String {
    "https://corsaro.red/".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_retries() -> u32 {
    1
}

fn default_verify_on_startup() -> bool {
    true
}

/// Sanitized config for API responses (user agent hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub indexer: SanitizedIndexerConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedIndexerConfig {
    pub site_link: String,
    pub timeout_secs: u32,
    pub request_delay_ms: u64,
    pub retries: u32,
    pub user_agent_configured: bool,
    pub on_page_error: PageErrorPolicy,
    pub verify_on_startup: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            indexer: SanitizedIndexerConfig {
                site_link: config.indexer.normalized_site_link(),
                timeout_secs: config.indexer.timeout_secs,
                request_delay_ms: config.indexer.request_delay_ms,
                retries: config.indexer.retries,
                user_agent_configured: config.indexer.user_agent.is_some(),
                on_page_error: config.indexer.on_page_error,
                verify_on_startup: config.indexer.verify_on_startup,
            },
        }
    }
}
