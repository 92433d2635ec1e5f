//! Search module - substring search over the corpus / 搜索模块
//!
//! - db_index: read-only SQLite access, LIKE prefilter joined to metadata
//! - snippet: case folding, occurrence counting, context snippets
//! - engine: the search operation and its error type
//!
//! No tokenization or ranking: results are ordered by display name.

pub mod db_index;
pub mod engine;
pub mod schema;
pub mod snippet;

pub use db_index::Corpus;
pub use engine::{search, SearchError};
pub use schema::{CorpusStats, SearchLimits, SearchOutcome, TextMatch, TextRow};
