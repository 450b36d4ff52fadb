//! Chirp endpoints.
//!
//! - POST `/` - Create a chirp (authenticated, 140-char limit, profanity
//!   censored)
//! - GET `/` - List chirps, optional `author_id` filter and `sort` order
//! - GET `/{uuid}` - Get a single chirp
//! - DELETE `/{uuid}` - Delete own chirp (authenticated)

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{ApiError, ResultExt, validate_uuid};
use crate::auth::{Auth, HasAuthState};
use crate::db::{Chirp, Database};
use crate::jwt::JwtConfig;

/// Maximum chirp body length in bytes.
const MAX_CHIRP_LENGTH: usize = 140;

/// Words replaced with `****`, matched case-insensitively on whole
/// space-separated words.
const PROFANE_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

#[derive(Clone)]
pub struct ChirpsState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

impl HasAuthState for ChirpsState {
    fn jwt(&self) -> &JwtConfig {
        &self.jwt
    }
}

pub fn router(state: ChirpsState) -> Router {
    Router::new()
        .route("/", post(create_chirp))
        .route("/", get(list_chirps))
        .route("/{uuid}", get(get_chirp))
        .route("/{uuid}", delete(delete_chirp))
        .with_state(state)
}

#[derive(Deserialize)]
struct CreateChirpRequest {
    body: String,
}

#[derive(Serialize)]
struct ChirpResponse {
    id: String,
    created_at: String,
    updated_at: String,
    body: String,
    user_id: String,
}

impl From<Chirp> for ChirpResponse {
    fn from(chirp: Chirp) -> Self {
        Self {
            id: chirp.uuid,
            created_at: chirp.created_at,
            updated_at: chirp.updated_at,
            body: chirp.body,
            user_id: chirp.user_uuid,
        }
    }
}

fn censor_profanity(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            if PROFANE_WORDS.contains(&word.to_lowercase().as_str()) {
                "****"
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

async fn create_chirp(
    State(state): State<ChirpsState>,
    Auth(user_uuid): Auth,
    Json(payload): Json<CreateChirpRequest>,
) -> Result<(StatusCode, Json<ChirpResponse>), ApiError> {
    if payload.body.len() > MAX_CHIRP_LENGTH {
        return Err(ApiError::bad_request(
            "Chirp is too long, Limit 140 Characters",
        ));
    }

    let user = state
        .db
        .users()
        .get_by_uuid(&user_uuid)
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(|| ApiError::unauthorized("invalid or expired token"))?;

    let cleaned = censor_profanity(&payload.body);
    let uuid = uuid::Uuid::new_v4().to_string();

    state
        .db
        .chirps()
        .create(&uuid, user.id, &cleaned)
        .await
        .db_err("Failed to create chirp")?;

    let chirp = state
        .db
        .chirps()
        .get_by_uuid(&uuid)
        .await
        .db_err("Failed to load created chirp")?
        .ok_or_else(|| ApiError::internal("Chirp vanished after creation"))?;

    Ok((StatusCode::CREATED, Json(ChirpResponse::from(chirp))))
}

#[derive(Deserialize)]
struct ListChirpsQuery {
    author_id: Option<String>,
    sort: Option<String>,
}

async fn list_chirps(
    State(state): State<ChirpsState>,
    Query(query): Query<ListChirpsQuery>,
) -> Result<Json<Vec<ChirpResponse>>, ApiError> {
    if let Some(ref author_id) = query.author_id {
        validate_uuid(author_id)?;
    }

    let descending = match query.sort.as_deref() {
        None | Some("") | Some("asc") => false,
        Some("desc") => true,
        Some(other) => {
            return Err(ApiError::bad_request(format!("Invalid sort order: {}", other)));
        }
    };

    // The store returns oldest-first
    let mut chirps: Vec<ChirpResponse> = state
        .db
        .chirps()
        .list()
        .await
        .db_err("Failed to list chirps")?
        .into_iter()
        .filter(|c| {
            query
                .author_id
                .as_deref()
                .is_none_or(|author| c.user_uuid == author)
        })
        .map(ChirpResponse::from)
        .collect();

    if descending {
        chirps.reverse();
    }

    Ok(Json(chirps))
}

async fn get_chirp(
    State(state): State<ChirpsState>,
    Path(uuid): Path<String>,
) -> Result<Json<ChirpResponse>, ApiError> {
    validate_uuid(&uuid)?;

    let chirp = state
        .db
        .chirps()
        .get_by_uuid(&uuid)
        .await
        .db_err("Failed to get chirp")?
        .ok_or_else(|| ApiError::not_found("chirp not found"))?;

    Ok(Json(ChirpResponse::from(chirp)))
}

async fn delete_chirp(
    State(state): State<ChirpsState>,
    Auth(user_uuid): Auth,
    Path(uuid): Path<String>,
) -> Result<StatusCode, ApiError> {
    validate_uuid(&uuid)?;

    let chirp = state
        .db
        .chirps()
        .get_by_uuid(&uuid)
        .await
        .db_err("Failed to get chirp")?
        .ok_or_else(|| ApiError::not_found("chirp not found"))?;

    if chirp.user_uuid != user_uuid {
        return Err(ApiError::forbidden("cannot delete chirp"));
    }

    state
        .db
        .chirps()
        .delete_by_uuid(&uuid)
        .await
        .db_err("Failed to delete chirp")?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_censor_profanity() {
        assert_eq!(
            censor_profanity("This is a kerfuffle opinion"),
            "This is a **** opinion"
        );
        assert_eq!(censor_profanity("Sharbert!"), "Sharbert!");
        assert_eq!(censor_profanity("FORNAX sharbert"), "**** ****");
        assert_eq!(censor_profanity("clean message"), "clean message");
    }
}
