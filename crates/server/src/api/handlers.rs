use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use corsaro_core::{CategoryCode, IndexerInfo, SanitizedConfig};
use serde::Serialize;
use std::sync::Arc;

use crate::metrics::encode_metrics;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub native_id: u32,
    pub code: CategoryCode,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct IndexerResponse {
    #[serde(flatten)]
    pub info: IndexerInfo,
    pub categories: Vec<CategoryResponse>,
}

/// GET /api/v1/indexer
///
/// Identity of the indexer and its category table.
pub async fn get_indexer(State(state): State<Arc<AppState>>) -> Json<IndexerResponse> {
    let indexer = state.indexer();
    let categories = indexer
        .categories()
        .mappings()
        .iter()
        .map(|m| CategoryResponse {
            native_id: m.native_id,
            code: m.code,
            name: m.code.name(),
            description: m.description,
        })
        .collect();

    Json(IndexerResponse {
        info: indexer.info().clone(),
        categories,
    })
}

/// GET /metrics
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
