//! Admin endpoints: hit-counter metrics and the dev-only reset.

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse},
    routing::{get, post},
};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use super::error::{ApiError, ResultExt};
use crate::db::Database;

#[derive(Clone)]
pub struct AdminState {
    pub db: Database,
    pub hits: Arc<AtomicI64>,
    /// Deployment platform; the reset endpoint only works on "dev"
    pub platform: Arc<str>,
}

pub fn router(state: AdminState) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/reset", post(reset))
        .with_state(state)
}

async fn metrics(State(state): State<AdminState>) -> Html<String> {
    let hits = state.hits.load(Ordering::Relaxed);
    Html(format!(
        "<html>\n  <body>\n    <h1>Welcome, Chirpy Admin</h1>\n    \
         <p>Chirpy has been visited {} times!</p>\n  </body>\n</html>",
        hits
    ))
}

/// Zero the hit counter and wipe all users. Dev environments only.
async fn reset(State(state): State<AdminState>) -> Result<impl IntoResponse, ApiError> {
    if &*state.platform != "dev" {
        return Err(ApiError::forbidden("reset is only allowed on dev"));
    }

    state.hits.store(0, Ordering::Relaxed);
    state
        .db
        .users()
        .delete_all()
        .await
        .db_err("Failed to delete users")?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "OK",
    ))
}
