mod admin;
mod chirps;
mod error;
mod tokens;
mod users;
mod webhooks;

use axum::{Router, http::header, response::IntoResponse, routing::get};
use std::sync::Arc;
use std::sync::atomic::AtomicI64;

use crate::db::Database;
use crate::jwt::JwtConfig;

pub use admin::AdminState;

/// Create the API router (everything under `/api`).
pub fn create_api_router(db: Database, jwt: Arc<JwtConfig>, polka_key: Arc<str>) -> Router {
    let users_state = users::UsersState {
        db: db.clone(),
        jwt: jwt.clone(),
    };

    let chirps_state = chirps::ChirpsState {
        db: db.clone(),
        jwt: jwt.clone(),
    };

    let tokens_state = tokens::TokensState {
        db: db.clone(),
        jwt,
    };

    let webhooks_state = webhooks::WebhooksState { db, polka_key };

    Router::new()
        .route("/healthz", get(readiness))
        .nest("/users", users::router(users_state))
        .nest("/chirps", chirps::router(chirps_state))
        .merge(tokens::router(tokens_state))
        .merge(webhooks::router(webhooks_state))
}

/// Create the admin router (everything under `/admin`).
pub fn create_admin_router(db: Database, hits: Arc<AtomicI64>, platform: Arc<str>) -> Router {
    admin::router(AdminState { db, hits, platform })
}

async fn readiness() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], "OK")
}
