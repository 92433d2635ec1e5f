pub mod frontend;
pub mod search;
pub mod server;
pub mod stats;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use svapna_search::search::SearchError;

/// Error returned by handlers, rendered as `{"error": message}` / 接口错误
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(e: SearchError) -> Self {
        let status = match e {
            SearchError::EmptyTerm => StatusCode::BAD_REQUEST,
            SearchError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            SearchError::Database(_) | SearchError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Build the application router / 构建路由
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(frontend::index))
        .route("/search", post(search::search))
        .route("/health", get(server::health_check))
        .route("/stats", get(stats::corpus_stats))
        .route("/version", get(server::version_info))
        .fallback(frontend::serve_embedded_file)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::path::{Path, PathBuf};
    use svapna_search::config::AppConfig;
    use svapna_search::download::Provisioned;
    use tower::ServiceExt;

    async fn create_corpus(dir: &Path) -> PathBuf {
        let path = dir.join("muktabodha_texts.db");
        let options = SqliteConnectOptions::new().filename(&path).create_if_missing(true);
        let db = SqlitePoolOptions::new().max_connections(1).connect_with(options).await.unwrap();
        sqlx::query("CREATE TABLE texts (filename TEXT PRIMARY KEY, display_name TEXT, tradition TEXT, author TEXT, period TEXT)")
            .execute(&db)
            .await
            .unwrap();
        sqlx::query("CREATE TABLE search_index (filename TEXT PRIMARY KEY, content TEXT)")
            .execute(&db)
            .await
            .unwrap();
        let texts = [
            ("mandukya.txt", "Māṇḍūkya Kārikā", Some("Advaita"), "The dreamer enters svapna and then svapna again"),
            ("vijnana.txt", "Vijñānabhairava", None, "svapna <b>bold</b> at the very start"),
            ("netra.txt", "Netratantra", Some("Śaiva"), "no dreams here"),
        ];
        for (filename, name, tradition, content) in texts {
            sqlx::query("INSERT INTO texts (filename, display_name, tradition) VALUES (?, ?, ?)")
                .bind(filename)
                .bind(name)
                .bind(tradition)
                .execute(&db)
                .await
                .unwrap();
            sqlx::query("INSERT INTO search_index (filename, content) VALUES (?, ?)")
                .bind(filename)
                .bind(content)
                .execute(&db)
                .await
                .unwrap();
        }
        db.close().await;
        path
    }

    async fn ready_app(dir: &Path) -> Router {
        let path = create_corpus(dir).await;
        let state = AppState::initialize(AppConfig::default(), Provisioned::Ready(path)).await;
        assert!(state.corpus.is_some());
        router(Arc::new(state))
    }

    async fn degraded_app() -> Router {
        let provisioned = Provisioned::Missing {
            path: PathBuf::from("/nonexistent/muktabodha_texts.db"),
            reason: "connection refused".to_string(),
        };
        let state = AppState::initialize(AppConfig::default(), provisioned).await;
        router(Arc::new(state))
    }

    async fn post_search(app: Router, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/search")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        send(app, request).await
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_search_returns_matches() {
        let dir = tempfile::tempdir().unwrap();
        let app = ready_app(dir.path()).await;

        let (status, body) = post_search(app, r#"{"search_term": "  SVAPNA "}"#).await;
        assert_eq!(status, StatusCode::OK);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["display_name"], "Māṇḍūkya Kārikā");
        assert_eq!(results[0]["count"], 2);
        assert_eq!(results[0]["tradition"], "Advaita");
        assert_eq!(results[0]["author"], "Unknown");
        assert_eq!(results[1]["tradition"], "Unknown");
        assert_eq!(body["total_matches"], 3);
        assert_eq!(body["database_type"], "FULL_149MB");
        assert!(body["search_time"].as_f64().unwrap() >= 0.0);

        let snippet = results[1]["snippets"][0].as_str().unwrap();
        assert!(snippet.starts_with("svapna"));
        assert!(!snippet.ends_with("..."));
    }

    #[tokio::test]
    async fn test_search_without_hits_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let app = ready_app(dir.path()).await;

        let (status, body) = post_search(app, r#"{"search_term": "suṣupti"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"], Value::Array(vec![]));
        assert_eq!(body["total_matches"], 0);
    }

    #[tokio::test]
    async fn test_empty_or_missing_term_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = ready_app(dir.path()).await;

        for body in [r#"{"search_term": "   "}"#, r#"{}"#, r#"{"search_term": null}"#] {
            let (status, json) = post_search(app.clone(), body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json["error"], "Search term required");
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (status, json) = post_search(degraded_app().await, "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_degraded_mode() {
        let app = degraded_app().await;

        let (status, json) = get_json(app.clone(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["database"], "missing");
        assert_eq!(json["database_path"], "/nonexistent/muktabodha_texts.db");
        assert_eq!(json["type"], "FULL_DATABASE_149MB");

        let (status, json) = post_search(app.clone(), r#"{"search_term": "svapna"}"#).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(json["error"].as_str().unwrap().contains("not available"));

        // Empty terms are still a client error / 空搜索词仍为客户端错误
        let (status, _) = post_search(app.clone(), r#"{"search_term": ""}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_json(app, "/stats").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_health_and_stats_when_connected() {
        let dir = tempfile::tempdir().unwrap();
        let app = ready_app(dir.path()).await;

        let (_, json) = get_json(app.clone(), "/health").await;
        assert_eq!(json["database"], "connected");
        assert!(json["database_path"].as_str().unwrap().ends_with("muktabodha_texts.db"));

        let (status, json) = get_json(app, "/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_texts"], 3);
        assert_eq!(json["indexed_texts"], 3);
    }

    #[tokio::test]
    async fn test_database_failure_is_internal_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = create_corpus(dir.path()).await;
        let state = AppState::initialize(AppConfig::default(), Provisioned::Ready(path)).await;
        let corpus = state.corpus.clone().unwrap();
        corpus.close().await;
        assert!(!state.database_connected());

        let (status, json) = post_search(router(Arc::new(state)), r#"{"search_term": "svapna"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let message = json["error"].as_str().unwrap();
        assert!(!message.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_file_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.db");
        std::fs::write(&path, b"this is not sqlite").unwrap();

        let state = AppState::initialize(AppConfig::default(), Provisioned::Ready(path)).await;
        assert!(state.corpus.is_none());
        assert!(!state.database_connected());
    }

    #[tokio::test]
    async fn test_index_page_is_served() {
        let response = degraded_app()
            .await
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/html"));
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(String::from_utf8_lossy(&bytes).contains("/search"));

        let (status, _) = get_json(degraded_app().await, "/missing.js").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_version_info() {
        let (status, json) = get_json(degraded_app().await, "/version").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }
}
