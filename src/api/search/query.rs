use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;
use std::time::Instant;

use super::types::*;
use crate::api::ApiError;
use crate::state::AppState;
use svapna_search::search::{self as corpus, SearchError};

/// POST /search - 全文子串搜索
pub async fn search(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let started = Instant::now();

    let Json(req) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let term = req.search_term.unwrap_or_default();

    let outcome = corpus::search(state.corpus.as_ref(), &term, &state.limits())
        .await
        .map_err(|e| {
            if let SearchError::Database(ref inner) = e {
                tracing::error!("Search error: {}", inner);
            }
            ApiError::from(e)
        })?;

    let search_time = started.elapsed().as_secs_f64();
    tracing::info!(
        "Search for '{}' completed in {:.3}s, found {} texts",
        term.trim(),
        search_time,
        outcome.results.len()
    );

    Ok(Json(SearchResponse {
        results: outcome.results,
        total_matches: outcome.total_matches,
        search_time,
        database_type: state.config.search.database_type.clone(),
    }))
}
