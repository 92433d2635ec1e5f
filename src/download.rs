//! Corpus provisioning / 语料数据库准备
//!
//! On startup the corpus file must exist locally. The primary path is checked
//! first, then the fallback paths; if neither holds a database the file is
//! fetched once from the configured URL. A failed fetch leaves the service in
//! degraded mode instead of aborting startup.

use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::config::DatabaseConfig;

/// Progress is logged every this many percent / 进度日志间隔（百分比）
const PERCENT_STEP: u64 = 5;
/// Progress step when the size is unknown / 未知大小时的进度日志间隔
const UNKNOWN_SIZE_STEP: u64 = 8 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Download failed: HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("Downloaded file is empty")]
    Empty,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of provisioning / 准备结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provisioned {
    /// Database available at this path / 数据库可用
    Ready(PathBuf),
    /// No database; the service runs degraded / 无数据库，降级运行
    Missing { path: PathBuf, reason: String },
}

impl Provisioned {
    pub fn path(&self) -> &Path {
        match self {
            Provisioned::Ready(path) => path,
            Provisioned::Missing { path, .. } => path,
        }
    }
}

/// A path holds the database if it is a non-empty regular file / 是否为有效数据库文件
pub fn holds_database(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

/// Find an existing local copy: primary path first, then fallbacks / 查找本地数据库
pub fn locate_database(config: &DatabaseConfig) -> Option<PathBuf> {
    std::iter::once(&config.path)
        .chain(config.fallback_paths.iter())
        .map(PathBuf::from)
        .find(|path| holds_database(path))
}

/// Ensure the corpus exists locally, downloading it if needed / 确保数据库存在
pub async fn ensure_database(config: &DatabaseConfig) -> Provisioned {
    if let Some(path) = locate_database(config) {
        tracing::info!("Database found at {:?}", path);
        return Provisioned::Ready(path);
    }

    let target = PathBuf::from(&config.path);
    tracing::info!("Downloading database from {} to {:?}", config.download_url, target);

    let timeout = Duration::from_secs(config.download_timeout_secs);
    match download_database(&config.download_url, &target, timeout).await {
        Ok(bytes) => {
            tracing::info!(
                "Database downloaded successfully: {:.1} MB",
                bytes as f64 / (1024.0 * 1024.0)
            );
            Provisioned::Ready(target)
        }
        Err(e) => {
            tracing::error!("Error downloading database: {}; running without database", e);
            Provisioned::Missing {
                path: target,
                reason: e.to_string(),
            }
        }
    }
}

/// Temporary file used while downloading / 下载中的临时文件
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

/// Download `url` to `dest`, returning the number of bytes written.
///
/// The body is streamed into `<dest>.part` and renamed on success, so an
/// interrupted download never leaves a file that looks like a database.
pub async fn download_database(url: &str, dest: &Path, timeout: Duration) -> Result<u64, ProvisionError> {
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let partial = partial_path(dest);
    let result = async {
        let bytes = fetch_to_file(url, &partial, timeout).await?;
        tokio::fs::rename(&partial, dest).await?;
        Ok::<u64, ProvisionError>(bytes)
    }
    .await;

    if result.is_err() {
        tokio::fs::remove_file(&partial).await.ok();
    }
    result
}

async fn fetch_to_file(url: &str, path: &Path, timeout: Duration) -> Result<u64, ProvisionError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(ProvisionError::Status(response.status()));
    }

    let mut progress = DownloadProgress::new(response.content_length());
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        if progress.advance(chunk.len() as u64) {
            tracing::info!("Progress: {}", progress.describe());
        }
    }
    file.flush().await?;

    if progress.downloaded() == 0 {
        return Err(ProvisionError::Empty);
    }
    Ok(progress.downloaded())
}

/// Throttled download progress / 下载进度（节流）
#[derive(Debug)]
pub struct DownloadProgress {
    total: Option<u64>,
    downloaded: u64,
    next_report: u64,
}

impl DownloadProgress {
    pub fn new(total: Option<u64>) -> Self {
        let total = total.filter(|t| *t > 0);
        let next_report = if total.is_some() { PERCENT_STEP } else { UNKNOWN_SIZE_STEP };
        Self {
            total,
            downloaded: 0,
            next_report,
        }
    }

    pub fn downloaded(&self) -> u64 {
        self.downloaded
    }

    /// Percentage done, when the size is known / 完成百分比
    pub fn percent(&self) -> Option<f64> {
        self.total
            .map(|total| (self.downloaded as f64 * 100.0 / total as f64).min(100.0))
    }

    /// Record `bytes`; returns true when a progress line is due.
    pub fn advance(&mut self, bytes: u64) -> bool {
        self.downloaded += bytes;
        match self.percent() {
            Some(percent) => {
                let whole = percent as u64;
                if whole >= self.next_report {
                    self.next_report = (whole / PERCENT_STEP + 1) * PERCENT_STEP;
                    true
                } else {
                    false
                }
            }
            None => {
                if self.downloaded >= self.next_report {
                    self.next_report = self.downloaded + UNKNOWN_SIZE_STEP;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn describe(&self) -> String {
        match self.percent() {
            Some(percent) => format!("{:.1}%", percent),
            None => format!("{:.1} MB", self.downloaded as f64 / (1024.0 * 1024.0)),
        }
    }
}
