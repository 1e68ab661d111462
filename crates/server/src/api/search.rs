//! Search and verification API handlers.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Query as QueryParams, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use corsaro_core::{CategoryCode, IndexerError, Query, Release};

use crate::metrics::{API_SEARCHES_TOTAL, VERIFY_RUNS_TOTAL};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    /// Comma separated Torznab codes.
    #[serde(default)]
    pub cat: Option<String>,
    #[serde(default)]
    pub season: Option<u32>,
    #[serde(default)]
    pub ep: Option<String>,
}

impl SearchParams {
    fn into_query(self) -> Result<Query, String> {
        let categories = match self.cat.as_deref() {
            Some(cat) => parse_categories(cat)?,
            None => BTreeSet::new(),
        };
        Ok(Query {
            term: self.q,
            categories,
            season: self.season,
            episode: self.ep,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub releases: Vec<Release>,
    pub count: usize,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub releases_found: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn parse_categories(cat: &str) -> Result<BTreeSet<CategoryCode>, String> {
    cat.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| {
            c.parse::<CategoryCode>()
                .map_err(|_| format!("Invalid category code: {}", c))
        })
        .collect()
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/search
///
/// Run a query against the indexer. A failed query answers with no releases
/// and the error message.
pub async fn search(
    State(state): State<Arc<AppState>>,
    QueryParams(params): QueryParams<SearchParams>,
) -> Result<Json<SearchResponse>, impl IntoResponse> {
    let query = match params.into_query() {
        Ok(query) => query,
        Err(error) => return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error }))),
    };

    let start = Instant::now();
    let result = state.indexer().search(&query).await;
    let duration_ms = start.elapsed().as_millis() as u64;

    let response = match result {
        Ok(releases) => {
            API_SEARCHES_TOTAL.with_label_values(&["ok"]).inc();
            SearchResponse {
                count: releases.len(),
                releases,
                duration_ms,
                error: None,
            }
        }
        Err(e) => {
            let outcome = match &e {
                IndexerError::Remote(_) => "remote_error",
                IndexerError::Parse(_) => "parse_error",
            };
            API_SEARCHES_TOTAL.with_label_values(&[outcome]).inc();
            warn!(
                term = %query.search_string(),
                error = %e,
                "Search failed, answering with no results"
            );
            SearchResponse {
                releases: Vec::new(),
                count: 0,
                duration_ms,
                error: Some(e.to_string()),
            }
        }
    };

    Ok(Json(response))
}

/// POST /api/v1/indexer/verify
///
/// Check that the site answers the "latest" feed with at least one release.
pub async fn verify(State(state): State<Arc<AppState>>) -> Json<VerifyResponse> {
    match state.indexer().verify().await {
        Ok(found) => {
            VERIFY_RUNS_TOTAL.with_label_values(&["ok"]).inc();
            info!(releases = found, "Indexer verification succeeded");
            Json(VerifyResponse {
                ok: true,
                releases_found: Some(found),
                error: None,
            })
        }
        Err(e) => {
            VERIFY_RUNS_TOTAL.with_label_values(&["failed"]).inc();
            let error = match &e.cause {
                Some(cause) => format!("{}: {}", e, cause),
                None => e.to_string(),
            };
            warn!(error = %error, "Indexer verification failed");
            Json(VerifyResponse {
                ok: false,
                releases_found: None,
                error: Some(error),
            })
        }
    }
}
