//! Corpus statistics for the page header / 语料统计

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::ApiError;
use crate::state::AppState;
use svapna_search::search::{CorpusStats, SearchError};

/// GET /stats - 获取语料统计
pub async fn corpus_stats(State(state): State<Arc<AppState>>) -> Result<Json<CorpusStats>, ApiError> {
    let corpus = state.corpus.as_ref().ok_or(SearchError::Unavailable)?;
    let stats = corpus.stats().await.map_err(|e| {
        tracing::warn!("Failed to read corpus stats: {}", e);
        SearchError::Database(e)
    })?;
    Ok(Json(stats))
}
