//! Login, refresh, and revoke endpoints.
//!
//! - POST `/login` - Verify credentials, mint access + refresh tokens
//! - POST `/refresh` - Exchange a refresh token for a new access token
//! - POST `/revoke` - Revoke a refresh token
//!
//! Unknown email and wrong password collapse into one 401; unknown,
//! expired, and revoked refresh tokens collapse into another. The
//! distinctions exist internally (`RefreshError`) for logs and tests but
//! are never surfaced to the caller.

use axum::{Json, Router, extract::State, http::HeaderMap, http::StatusCode, routing::post};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

use super::error::{ApiError, ResultExt};
use crate::auth::{
    self, HasAuthState, bearer_token, issue_refresh_token, resolve_refresh_token,
    revoke_refresh_token, verify_password,
};
use crate::db::Database;
use crate::jwt::{ACCESS_TOKEN_TTL, JwtConfig};

#[derive(Clone)]
pub struct TokensState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

impl HasAuthState for TokensState {
    fn jwt(&self) -> &JwtConfig {
        &self.jwt
    }
}

pub fn router(state: TokensState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/revoke", post(revoke))
        .with_state(state)
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    id: String,
    created_at: String,
    updated_at: String,
    email: String,
    is_chirpy_red: bool,
    token: String,
    refresh_token: String,
}

/// Uniform login failure: never reveals whether the email or the
/// password was wrong.
fn bad_credentials() -> ApiError {
    ApiError::unauthorized("incorrect email or password")
}

async fn login(
    State(state): State<TokensState>,
    Json(payload): Json<LoginRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), ApiError> {
    let user = state
        .db
        .users()
        .get_by_email(&payload.email)
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(bad_credentials)?;

    let ok = verify_password(&payload.password, &user.hashed_password).map_err(|e| {
        error!("Stored password hash is invalid: {}", e);
        ApiError::internal("Authentication failure")
    })?;
    if !ok {
        return Err(bad_credentials());
    }

    let token = state.jwt.issue(&user.uuid, ACCESS_TOKEN_TTL).map_err(|e| {
        error!("Failed to issue access token: {}", e);
        ApiError::internal("couldn't create token")
    })?;

    let refresh = issue_refresh_token(&state.db, user.id).await.map_err(|e| {
        error!("Failed to issue refresh token: {}", e);
        ApiError::internal("couldn't create refresh token")
    })?;

    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            id: user.uuid,
            created_at: user.created_at,
            updated_at: user.updated_at,
            email: user.email,
            is_chirpy_red: user.is_chirpy_red,
            token,
            refresh_token: refresh.token,
        }),
    ))
}

#[derive(Serialize)]
struct RefreshResponse {
    token: String,
}

/// The refresh token arrives as a bearer credential even though it is an
/// opaque string, not a JWT.
async fn refresh(
    State(state): State<TokensState>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>, ApiError> {
    let refresh_token =
        bearer_token(&headers).map_err(|_| ApiError::unauthorized("invalid authorization header"))?;

    let user_id = resolve_refresh_token(&state.db, refresh_token)
        .await
        .map_err(|e| match e {
            auth::RefreshError::Database(e) => ApiError::db_error("Failed to resolve token", e),
            other => {
                debug!("Refresh rejected: {}", other);
                ApiError::unauthorized("invalid or expired refresh token")
            }
        })?;

    let user = state
        .db
        .users()
        .get_by_id(user_id)
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(|| ApiError::unauthorized("invalid or expired refresh token"))?;

    let token = state.jwt.issue(&user.uuid, ACCESS_TOKEN_TTL).map_err(|e| {
        error!("Failed to issue access token: {}", e);
        ApiError::internal("couldn't create token")
    })?;

    Ok(Json(RefreshResponse { token }))
}

async fn revoke(
    State(state): State<TokensState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let refresh_token =
        bearer_token(&headers).map_err(|_| ApiError::unauthorized("invalid authorization header"))?;

    revoke_refresh_token(&state.db, refresh_token)
        .await
        .map_err(|e| match e {
            auth::RefreshError::Database(e) => ApiError::db_error("Failed to revoke token", e),
            other => {
                debug!("Revoke rejected: {}", other);
                ApiError::unauthorized("invalid refresh token")
            }
        })?;

    Ok(StatusCode::NO_CONTENT)
}
