//! Read-only corpus database / 只读语料数据库
//!
//! The corpus is prepared elsewhere and never written here:
//! - texts: filename, display_name, tradition, author, period
//! - search_index: filename, content (whole document as one string)
//!
//! Only rows present in both tables are searchable (inner join).

use futures::stream::BoxStream;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use std::path::{Path, PathBuf};

use super::schema::{CorpusStats, TextRow};

// ?1 = 0 disables the prefilter; SQLite's LOWER only folds ASCII.
const CANDIDATE_QUERY: &str = r#"
    SELECT COALESCE(t.display_name, t.filename) AS display_name,
           t.tradition, t.author, t.period, si.content
    FROM search_index si
    JOIN texts t ON si.filename = t.filename
    WHERE ?1 = 0 OR instr(LOWER(si.content), ?2) > 0
    ORDER BY display_name
"#;

/// Corpus handle over a read-only pool / 语料库句柄
#[derive(Debug, Clone)]
pub struct Corpus {
    db: Pool<Sqlite>,
    path: PathBuf,
}

impl Corpus {
    /// Open an existing database file read-only / 以只读方式打开数据库
    pub async fn open(path: &Path, max_connections: u32) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false);

        let db = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        // Fail early on files that are not a corpus / 校验表结构
        sqlx::query("SELECT 1 FROM texts JOIN search_index USING (filename) LIMIT 1")
            .fetch_optional(&db)
            .await?;

        tracing::info!("Corpus database opened: {:?} (read-only)", path);
        Ok(Self {
            db,
            path: path.to_path_buf(),
        })
    }

    /// Pool still open and backing file still on disk / 数据库是否可用
    pub fn is_available(&self) -> bool {
        !self.db.is_closed() && self.path.exists()
    }

    /// Stream candidate rows by display name / 按显示名流式返回候选行
    ///
    /// For ASCII terms SQLite narrows the rows with `instr`; any other term
    /// streams every indexed text and the caller decides what matches.
    pub fn candidates<'a>(
        &'a self,
        folded_term: &'a str,
    ) -> BoxStream<'a, Result<TextRow, sqlx::Error>> {
        let prefilter = folded_term.is_ascii();
        sqlx::query_as::<_, TextRow>(CANDIDATE_QUERY)
            .bind(prefilter)
            .bind(folded_term)
            .fetch(&self.db)
    }

    /// Count texts and indexed texts / 统计文本数量
    pub async fn stats(&self) -> Result<CorpusStats, sqlx::Error> {
        let total_texts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM texts")
            .fetch_one(&self.db)
            .await?;
        let indexed_texts: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM search_index si JOIN texts t ON si.filename = t.filename",
        )
        .fetch_one(&self.db)
        .await?;

        let size = std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
        Ok(CorpusStats {
            total_texts,
            indexed_texts,
            database_size_mb: size as f64 / (1024.0 * 1024.0),
        })
    }

    /// Close the pool / 关闭连接池
    pub async fn close(&self) {
        self.db.close().await;
    }
}
