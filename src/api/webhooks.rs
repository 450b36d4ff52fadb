//! Polka webhook receiver.
//!
//! The single trusted external caller authenticates with
//! `Authorization: ApiKey <key>` checked against the process-wide Polka
//! key in constant time.

use axum::{Json, Router, extract::State, http::HeaderMap, http::StatusCode, routing::post};
use serde::Deserialize;
use std::sync::Arc;

use super::error::{ApiError, ResultExt};
use crate::auth::{api_key, api_key_matches};
use crate::db::Database;

#[derive(Clone)]
pub struct WebhooksState {
    pub db: Database,
    pub polka_key: Arc<str>,
}

pub fn router(state: WebhooksState) -> Router {
    Router::new()
        .route("/polka/webhooks", post(polka_webhook))
        .with_state(state)
}

#[derive(Deserialize)]
struct PolkaEvent {
    event: String,
    data: PolkaEventData,
}

#[derive(Deserialize)]
struct PolkaEventData {
    user_id: String,
}

async fn polka_webhook(
    State(state): State<WebhooksState>,
    headers: HeaderMap,
    Json(payload): Json<PolkaEvent>,
) -> Result<StatusCode, ApiError> {
    let key =
        api_key(&headers).map_err(|_| ApiError::unauthorized("invalid authorization header"))?;
    if !api_key_matches(key, &state.polka_key) {
        return Err(ApiError::unauthorized("unauthorized"));
    }

    if payload.event != "user.upgraded" {
        return Ok(StatusCode::NO_CONTENT);
    }

    let upgraded = state
        .db
        .users()
        .upgrade_by_uuid(&payload.data.user_id)
        .await
        .db_err("Failed to upgrade user")?;

    if !upgraded {
        return Err(ApiError::not_found("unable to upgrade user"));
    }

    Ok(StatusCode::NO_CONTENT)
}
