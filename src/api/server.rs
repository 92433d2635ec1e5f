use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::state::AppState;

/// GET /health - 健康检查
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let database = if state.database_connected() { "connected" } else { "missing" };
    Json(json!({
        "status": "healthy",
        "database": database,
        "database_path": state.database_path.to_string_lossy(),
        "type": state.config.search.health_type,
    }))
}

/// GET /version - 获取版本信息
pub async fn version_info() -> Json<Value> {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "build_time": env!("BUILD_TIME"),
    }))
}
