//! User account endpoints.
//!
//! - POST `/` - Create a user from email + password
//! - PUT `/` - Update the authenticated user's email and password

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{post, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use super::error::{ApiError, ResultExt};
use crate::auth::{Auth, HasAuthState, hash_password};
use crate::db::{Database, User};
use crate::jwt::JwtConfig;

#[derive(Clone)]
pub struct UsersState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

impl HasAuthState for UsersState {
    fn jwt(&self) -> &JwtConfig {
        &self.jwt
    }
}

pub fn router(state: UsersState) -> Router {
    Router::new()
        .route("/", post(create_user))
        .route("/", put(update_user))
        .with_state(state)
}

#[derive(Deserialize)]
struct CredentialsRequest {
    email: String,
    password: String,
}

/// Public user fields. Deliberately excludes the password hash.
#[derive(Serialize)]
struct UserResponse {
    id: String,
    created_at: String,
    updated_at: String,
    email: String,
    is_chirpy_red: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.uuid,
            created_at: user.created_at,
            updated_at: user.updated_at,
            email: user.email,
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}

fn validate_credentials(payload: &CredentialsRequest) -> Result<(), ApiError> {
    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        return Err(ApiError::bad_request("Invalid email address"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::bad_request("Password cannot be empty"));
    }
    Ok(())
}

fn hash_err(e: impl std::fmt::Display) -> ApiError {
    error!("Failed to hash password: {}", e);
    ApiError::internal("an error has occurred")
}

async fn create_user(
    State(state): State<UsersState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    validate_credentials(&payload)?;

    let hashed = hash_password(&payload.password).map_err(hash_err)?;
    let uuid = uuid::Uuid::new_v4().to_string();

    let id = state
        .db
        .users()
        .create(&uuid, payload.email.trim(), &hashed)
        .await
        .db_err("Failed to create user")?;

    let user = state
        .db
        .users()
        .get_by_id(id)
        .await
        .db_err("Failed to load created user")?
        .ok_or_else(|| ApiError::internal("User vanished after creation"))?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

async fn update_user(
    State(state): State<UsersState>,
    Auth(user_uuid): Auth,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    validate_credentials(&payload)?;

    let user = state
        .db
        .users()
        .get_by_uuid(&user_uuid)
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(|| ApiError::unauthorized("invalid or expired token"))?;

    let hashed = hash_password(&payload.password).map_err(hash_err)?;

    state
        .db
        .users()
        .update_credentials(user.id, payload.email.trim(), &hashed)
        .await
        .db_err("Failed to update user")?;

    let user = state
        .db
        .users()
        .get_by_id(user.id)
        .await
        .db_err("Failed to load updated user")?
        .ok_or_else(|| ApiError::internal("User vanished after update"))?;

    Ok(Json(UserResponse::from(user)))
}
