use url::Url;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Indexer site link is an absolute http(s) URL
/// - Indexer timeout is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    let site_link = config.indexer.normalized_site_link();
    let url = Url::parse(&site_link).map_err(|e| {
        ConfigError::ValidationError(format!("indexer.site_link is not a valid URL: {}", e))
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::ValidationError(format!(
            "indexer.site_link must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.indexer.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "indexer.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
