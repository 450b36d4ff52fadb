//! Static file serving for the `/app` frontend.
//!
//! Files come straight from a directory on disk. Every request through
//! here increments the process-wide hit counter shown on
//! `/admin/metrics`.

use axum::{
    Router,
    extract::{Path as UrlPath, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

#[derive(Clone)]
pub struct AssetsState {
    pub root: Arc<PathBuf>,
    pub hits: Arc<AtomicI64>,
}

pub fn router(state: AssetsState) -> Router {
    Router::new()
        .route("/app", get(index_handler))
        .route("/app/", get(index_handler))
        .route("/app/{*path}", get(asset_handler))
        .with_state(state)
}

/// Get MIME type from file extension. Only supports types we actually serve.
fn mime_from_path(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("html") => "text/html; charset=utf-8",
        Some("js") => "text/javascript",
        Some("css") => "text/css",
        Some("png") => "image/png",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

/// Reject any path that escapes the asset root.
fn sanitize(path: &str) -> Option<PathBuf> {
    let rel = Path::new(path);
    if rel
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(rel.to_path_buf())
}

async fn serve(state: &AssetsState, rel: &str) -> Response {
    state.hits.fetch_add(1, Ordering::Relaxed);

    let Some(rel) = sanitize(rel) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let full = state.root.join(&rel);
    match tokio::fs::read(&full).await {
        Ok(bytes) => {
            let mime = mime_from_path(&rel.to_string_lossy());
            ([(header::CONTENT_TYPE, mime)], bytes).into_response()
        }
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn index_handler(State(state): State<AssetsState>) -> Response {
    serve(&state, "index.html").await
}

async fn asset_handler(State(state): State<AssetsState>, UrlPath(path): UrlPath<String>) -> Response {
    serve(&state, &path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_rejects_traversal() {
        assert!(sanitize("../etc/passwd").is_none());
        assert!(sanitize("/etc/passwd").is_none());
        assert!(sanitize("a/../../b").is_none());
        assert!(sanitize("index.html").is_some());
        assert!(sanitize("css/style.css").is_some());
    }

    #[test]
    fn test_mime_from_path() {
        assert_eq!(mime_from_path("app.js"), "text/javascript");
        assert_eq!(mime_from_path("index.html"), "text/html; charset=utf-8");
        assert_eq!(mime_from_path("data.bin"), "application/octet-stream");
    }
}
