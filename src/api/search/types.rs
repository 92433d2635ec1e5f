use serde::{Deserialize, Serialize};
use svapna_search::search::TextMatch;

/// Search request / 搜索请求
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub search_term: Option<String>,
}

/// Search response / 搜索响应
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<TextMatch>,
    pub total_matches: u64,
    /// Elapsed seconds / 耗时（秒）
    pub search_time: f64,
    pub database_type: String,
}
