//! Application configuration module / 应用配置模块
//!
//! Configuration is read from config.json in the working directory and then
//! overridden by environment variables. A default config file is written on
//! first run. The resolved value is immutable and passed around explicitly.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable selecting the listening port / 监听端口环境变量
pub const ENV_PORT: &str = "PORT";
/// Environment variable overriding the primary database path / 数据库路径环境变量
pub const ENV_DATABASE_PATH: &str = "DATABASE_PATH";
/// Environment variable overriding the download URL / 数据库下载地址环境变量
pub const ENV_DOWNLOAD_URL: &str = "CORPUS_DOWNLOAD_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write config file {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },
}

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration / 服务器配置
    pub server: ServerConfig,
    /// Corpus database configuration / 语料数据库配置
    pub database: DatabaseConfig,
    /// Search configuration / 搜索配置
    pub search: SearchConfig,
}

/// Server configuration / 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address / 服务器监听地址
    pub host: String,
    /// Server port / 服务器端口
    pub port: u16,
}

/// Corpus database configuration / 语料数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Primary database file path, also the download target / 主数据库路径
    pub path: String,
    /// Local paths tried, in order, when the primary path is absent / 备用路径
    pub fallback_paths: Vec<String>,
    /// Remote URL fetched when no local copy exists / 远程下载地址
    pub download_url: String,
    /// Whole-download timeout in seconds / 下载超时（秒）
    pub download_timeout_secs: u64,
    /// Read-only pool size / 只读连接池大小
    pub max_connections: u32,
}

/// Search configuration / 搜索配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum matching documents per query / 每次查询最多返回的文档数
    pub max_results: u32,
    /// Maximum snippets per document / 每个文档最多片段数
    pub max_snippets: usize,
    /// Characters of context on each side of a match / 匹配两侧上下文字符数
    pub context_chars: usize,
    /// Label reported as `database_type` in search responses / 数据库类型标签
    pub database_type: String,
    /// Label reported as `type` by the health check / 健康检查类型标签
    pub health_type: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "/app/muktabodha_texts.db".to_string(),
            fallback_paths: vec!["/Users/mariaiontseva/muktabodha_texts.db".to_string()],
            download_url: "https://github.com/mariaiontseva/svapna-railway/releases/download/v1.0/muktabodha_texts.db".to_string(),
            download_timeout_secs: 600,
            max_connections: 4,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 100,
            max_snippets: 5,
            context_chars: 80,
            database_type: "FULL_149MB".to_string(),
            health_type: "FULL_DATABASE_149MB".to_string(),
        }
    }
}

impl AppConfig {
    /// Get the primary database path / 获取主数据库路径
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.database.path)
    }

    /// Get the server bind address / 获取服务器绑定地址
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Apply environment overrides through a lookup function / 应用环境变量覆盖
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_PORT,
                value: port.clone(),
            })?;
        }
        if let Some(path) = lookup(ENV_DATABASE_PATH).filter(|p| !p.trim().is_empty()) {
            self.database.path = path;
        }
        if let Some(url) = lookup(ENV_DOWNLOAD_URL).filter(|u| !u.trim().is_empty()) {
            self.database.download_url = url;
        }
        Ok(())
    }
}

/// Get the config file path / 获取配置文件路径
fn get_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from a file, creating it with defaults if absent / 加载配置文件
pub fn load_config_from(config_path: &Path) -> Result<AppConfig, ConfigError> {
    if config_path.exists() {
        let content = std::fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = serde_json::from_str(&content)?;
        tracing::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    } else {
        let config = AppConfig::default();
        save_config(config_path, &config)?;
        tracing::info!("Created default configuration at {:?}", config_path);
        Ok(config)
    }
}

/// Save configuration to file / 保存配置到文件
pub fn save_config(config_path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(config_path, content).map_err(|source| ConfigError::Write {
        path: config_path.to_path_buf(),
        source,
    })
}

/// Resolve the full configuration: file, then environment / 解析最终配置
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let mut config = load_config_from(&get_config_path())?;
    config.apply_env(|name| std::env::var(name).ok())?;
    Ok(config)
}
