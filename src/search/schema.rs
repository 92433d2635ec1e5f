//! Corpus rows and search result types / 语料行与搜索结果类型

use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;

/// Fallback for missing tradition/author/period / 缺失元数据的默认值
pub const UNKNOWN: &str = "Unknown";

/// One joined `texts` + `search_index` row / 文本与内容索引的联合行
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TextRow {
    pub display_name: String,
    pub tradition: Option<String>,
    pub author: Option<String>,
    pub period: Option<String>,
    pub content: Option<String>,
}

/// A matching document as returned to clients / 命中文档
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMatch {
    pub display_name: String,
    pub tradition: String,
    pub author: String,
    pub period: String,
    /// Non-overlapping occurrences of the term / 不重叠出现次数
    pub count: u64,
    pub snippets: Vec<String>,
}

/// Result of one search / 单次搜索结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub results: Vec<TextMatch>,
    /// Sum of `count` over `results` / 所有结果出现次数之和
    pub total_matches: u64,
}

impl SearchOutcome {
    pub fn from_matches(results: Vec<TextMatch>) -> Self {
        let total_matches = results.iter().map(|m| m.count).sum();
        Self { results, total_matches }
    }
}

/// Per-query bounds / 查询限制
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_results: u32,
    pub max_snippets: usize,
    pub context_chars: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for SearchLimits {
    fn from(config: &SearchConfig) -> Self {
        Self {
            max_results: config.max_results,
            max_snippets: config.max_snippets,
            context_chars: config.context_chars,
        }
    }
}

/// Corpus statistics / 语料统计
#[derive(Debug, Clone, Default, Serialize)]
pub struct CorpusStats {
    pub total_texts: i64,
    pub indexed_texts: i64,
    pub database_size_mb: f64,
}
