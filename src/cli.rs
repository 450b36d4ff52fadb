//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::db::Database;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "Chirpy", about = "A small social-posting backend")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, default_value = "chirpy.db")]
    pub database: String,

    /// Directory served as the /app frontend
    #[arg(long, default_value = ".")]
    pub asset_dir: PathBuf,

    /// Deployment platform; "dev" enables the destructive /admin/reset endpoint
    #[arg(long, env = "PLATFORM")]
    pub platform: Option<String>,

    /// Path to file containing the JWT secret. Prefer the JWT_SECRET env var
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Path to file containing the Polka webhook key. Prefer the POLKA_KEY env var
    #[arg(long)]
    pub polka_key_file: Option<String>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load a secret from an environment variable (cleared after reading) or a
/// file. Returns None and logs an error if the secret cannot be loaded.
fn load_secret(env_var: &str, file: Option<&str>, flag: &str) -> Option<String> {
    if let Ok(secret) = std::env::var(env_var) {
        // Clear the environment variable to prevent leaking.
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var(env_var) };
        return Some(secret);
    }

    if let Some(path) = file {
        return match std::fs::read_to_string(path) {
            Ok(content) => Some(content.trim().to_string()),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read secret file");
                None
            }
        };
    }

    error!(
        "{} is required. Set the {} environment variable (recommended) or use {}",
        env_var, env_var, flag
    );
    None
}

/// Load the JWT signing secret; refuses secrets shorter than 32 bytes.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<String> {
    let secret = load_secret("JWT_SECRET", jwt_secret_file, "--jwt-secret-file")?;

    if secret.len() < MIN_JWT_SECRET_LENGTH {
        error!(
            "JWT secret is shorter than {} characters. Use a longer secret",
            MIN_JWT_SECRET_LENGTH
        );
        return None;
    }

    Some(secret)
}

/// Load the Polka webhook API key.
pub fn load_polka_key(polka_key_file: Option<&str>) -> Option<String> {
    let key = load_secret("POLKA_KEY", polka_key_file, "--polka-key-file")?;
    if key.is_empty() {
        error!("POLKA_KEY must not be empty");
        return None;
    }
    Some(key)
}

/// Resolve the platform setting, defaulting to "prod".
pub fn resolve_platform(platform: Option<String>) -> String {
    platform.unwrap_or_else(|| "prod".to_string())
}

/// Build ServerConfig from validated arguments.
pub fn build_config(
    db: Database,
    jwt_secret: String,
    polka_key: String,
    platform: String,
    asset_dir: PathBuf,
) -> ServerConfig {
    ServerConfig {
        db,
        jwt_secret: jwt_secret.into_bytes(),
        polka_key,
        platform,
        asset_dir,
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}
