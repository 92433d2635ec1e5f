use axum::{
    body::Body,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

/// Embedded search page (compile-time embed from web/) / 嵌入的搜索页面
#[derive(RustEmbed)]
#[folder = "web"]
struct FrontendAssets;

fn asset_response(path: &str) -> Option<Response> {
    let content = FrontendAssets::get(path)?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Some(
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime.as_ref().to_string())],
            Body::from(content.data.into_owned()),
        )
            .into_response(),
    )
}

/// GET / - 搜索页面
pub async fn index() -> Response {
    asset_response("index.html").unwrap_or_else(|| (StatusCode::NOT_FOUND, "Not Found").into_response())
}

/// Handle other embedded static file requests / 处理嵌入的静态文件请求
pub async fn serve_embedded_file(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');
    asset_response(path).unwrap_or_else(|| (StatusCode::NOT_FOUND, "Not Found").into_response())
}
