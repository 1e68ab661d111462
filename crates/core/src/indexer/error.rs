//! Error kinds of the query pipeline.

use thiserror::Error;

use crate::transport::TransportError;

/// Longest payload excerpt carried into logs.
const EXCERPT_CHARS: usize = 200;

/// The site failed the request. Always aborts the whole query.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The payload carried `"ok": false`.
    #[error("Server reported an application error")]
    ServerFailure { payload: String },

    /// Non-success HTTP status without the `ok` convention.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// A payload or an item did not have the expected shape.
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct ParseError {
    pub reason: String,
    /// Offending raw payload text, kept for diagnostics.
    pub payload: String,
}

impl ParseError {
    pub fn new(reason: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            payload: payload.into(),
        }
    }

    /// Payload truncated for log lines.
    pub fn payload_excerpt(&self) -> String {
        excerpt(&self.payload)
    }
}

/// Error returned by a query.
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

impl From<TransportError> for IndexerError {
    fn from(err: TransportError) -> Self {
        IndexerError::Remote(RemoteError::Transport(err))
    }
}

impl IndexerError {
    pub fn is_remote(&self) -> bool {
        matches!(self, IndexerError::Remote(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, IndexerError::Parse(_))
    }
}

/// The configuration check found nothing to show.
#[derive(Debug, Error)]
#[error("Could not find any release from this source")]
pub struct VerifyError {
    /// Query failure behind the check, `None` when the feed was simply empty.
    #[source]
    pub cause: Option<IndexerError>,
}

pub(crate) fn excerpt(text: &str) -> String {
    if text.chars().count() <= EXCERPT_CHARS {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(EXCERPT_CHARS).collect();
        cut.push('…');
        cut
    }
}
