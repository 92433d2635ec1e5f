use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod state;

use state::AppState;
use svapna_search::{config, download};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "svapna_search=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration / 加载配置
    let app_config = config::load_config()?;
    tracing::info!("Server will listen on {}:{}", app_config.server.host, app_config.server.port);
    tracing::info!("Primary database path: {}", app_config.database.path);

    // Provision once before accepting traffic / 启动前准备数据库
    let provisioned = download::ensure_database(&app_config.database).await;
    let bind_addr = app_config.get_bind_address();

    let state = Arc::new(AppState::initialize(app_config, provisioned).await);
    if state.corpus.is_some() {
        tracing::info!("Database: {:?}", state.database_path);
    } else {
        tracing::warn!("Running in degraded mode: /search will answer 503");
    }

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
