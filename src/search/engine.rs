//! Search operation / 搜索操作
//!
//! A document matches when its case-folded content contains the case-folded
//! term. Folding, counting and snippet extraction all happen here; the
//! database only streams candidate rows in display-name order.

use futures::TryStreamExt;
use std::sync::Arc;
use thiserror::Error;

use super::db_index::Corpus;
use super::schema::{SearchLimits, SearchOutcome};
use super::snippet::{build_match, fold_case};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search term required")]
    EmptyTerm,
    #[error("Database not available. Please wait for download to complete.")]
    Unavailable,
    #[error("{0}")]
    Database(#[from] sqlx::Error),
    #[error("Search task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Normalize a raw term: trim, then lower-case / 规范化搜索词
pub fn normalize_term(raw: &str) -> Option<String> {
    let term = fold_case(raw.trim());
    if term.is_empty() {
        None
    } else {
        Some(term)
    }
}

/// Run one search against the corpus, if there is one.
///
/// The term is validated before the corpus is consulted, so an empty term is
/// rejected even in degraded mode. Rows are scanned until `max_results`
/// documents have matched.
pub async fn search(
    corpus: Option<&Corpus>,
    raw_term: &str,
    limits: &SearchLimits,
) -> Result<SearchOutcome, SearchError> {
    let term = normalize_term(raw_term).ok_or(SearchError::EmptyTerm)?;
    let corpus = corpus.ok_or(SearchError::Unavailable)?;

    let cap = limits.max_results as usize;
    let shared: Arc<str> = Arc::from(term.as_str());
    let mut rows = corpus.candidates(&term);
    let mut scanned = 0usize;
    let mut matches = Vec::new();

    while matches.len() < cap {
        let Some(row) = rows.try_next().await? else {
            break;
        };
        scanned += 1;

        // Folding and scanning whole documents is CPU-bound / 全文扫描放到阻塞线程
        let folded = Arc::clone(&shared);
        let (max_snippets, context_chars) = (limits.max_snippets, limits.context_chars);
        let found = tokio::task::spawn_blocking(move || {
            build_match(row, &folded, max_snippets, context_chars)
        })
        .await?;

        if let Some(hit) = found {
            matches.push(hit);
        }
    }

    tracing::debug!(
        "Search '{}': {} rows scanned, {} matches",
        term,
        scanned,
        matches.len()
    );
    Ok(SearchOutcome::from_matches(matches))
}
