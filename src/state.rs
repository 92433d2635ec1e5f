use std::path::PathBuf;
use svapna_search::config::AppConfig;
use svapna_search::download::Provisioned;
use svapna_search::search::{Corpus, SearchLimits};

/// Shared, read-only application state / 共享只读应用状态
pub struct AppState {
    pub config: AppConfig,
    /// `None` means degraded mode / 为None时降级运行
    pub corpus: Option<Corpus>,
    /// Resolved database path, or the configured one when degraded / 数据库路径
    pub database_path: PathBuf,
}

impl AppState {
    /// Build state from the provisioning outcome / 根据准备结果构建状态
    ///
    /// A file that exists but cannot be opened as a corpus also leaves the
    /// service degraded.
    pub async fn initialize(config: AppConfig, provisioned: Provisioned) -> Self {
        let corpus = match &provisioned {
            Provisioned::Ready(path) => {
                match Corpus::open(path, config.database.max_connections).await {
                    Ok(corpus) => Some(corpus),
                    Err(e) => {
                        tracing::error!("Failed to open database {:?}: {}", path, e);
                        None
                    }
                }
            }
            Provisioned::Missing { reason, .. } => {
                tracing::warn!("Starting without database: {}", reason);
                None
            }
        };

        Self {
            database_path: provisioned.path().to_path_buf(),
            corpus,
            config,
        }
    }

    pub fn limits(&self) -> SearchLimits {
        SearchLimits::from(&self.config.search)
    }

    /// Connected only while the pool is open and the file is on disk / 数据库是否可用
    pub fn database_connected(&self) -> bool {
        self.corpus.as_ref().map(|c| c.is_available()).unwrap_or(false)
    }
}
