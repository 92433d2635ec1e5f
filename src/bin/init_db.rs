//! Download the corpus database ahead of deployment / 预先下载语料数据库
//!
//! Exits non-zero when the download fails, unlike the server which degrades.

use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use svapna_search::{config, download};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "svapna_search=info,svapna_init_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app_config = config::load_config()?;
    let target = app_config.database_path();

    if download::holds_database(&target) {
        tracing::info!("Database already exists at {:?}", target);
        return Ok(());
    }

    tracing::info!("Downloading database from {}", app_config.database.download_url);
    tracing::info!("Target: {:?}", target);

    let timeout = Duration::from_secs(app_config.database.download_timeout_secs);
    let bytes = download::download_database(&app_config.database.download_url, &target, timeout)
        .await
        .map_err(|e| {
            tracing::error!("Error downloading database: {}", e);
            e
        })?;

    tracing::info!(
        "Database downloaded successfully: {:.1} MB",
        bytes as f64 / (1024.0 * 1024.0)
    );
    Ok(())
}
