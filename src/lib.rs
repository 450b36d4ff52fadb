pub mod api;
pub mod assets;
pub mod auth;
pub mod cli;
pub mod db;
pub mod jwt;

use api::{create_admin_router, create_api_router};
use assets::AssetsState;
use axum::Router;
use db::Database;
use jwt::JwtConfig;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicI64;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// Secret for signing access tokens
    pub jwt_secret: Vec<u8>,
    /// Shared key authenticating the Polka webhook caller
    pub polka_key: String,
    /// Deployment platform ("dev" enables the reset endpoint)
    pub platform: String,
    /// Directory served under /app
    pub asset_dir: PathBuf,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let jwt = Arc::new(JwtConfig::new(&config.jwt_secret));
    let polka_key: Arc<str> = Arc::from(config.polka_key.as_str());
    let platform: Arc<str> = Arc::from(config.platform.as_str());
    let hits = Arc::new(AtomicI64::new(0));

    let assets_state = AssetsState {
        root: Arc::new(config.asset_dir.clone()),
        hits: hits.clone(),
    };

    Router::new()
        .nest("/api", create_api_router(config.db.clone(), jwt, polka_key))
        .nest("/admin", create_admin_router(config.db.clone(), hits, platform))
        .merge(assets::router(assets_state))
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    axum::serve(listener, app).await
}
