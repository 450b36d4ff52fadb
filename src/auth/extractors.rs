//! Axum extractor for bearer-authenticated endpoints.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};

use super::headers::{CredentialError, bearer_token};
use crate::jwt::JwtConfig;

/// Trait for state types that support access-token authentication.
pub trait HasAuthState {
    fn jwt(&self) -> &JwtConfig;
}

/// Extractor that validates the access token from the `Authorization`
/// header and yields the authenticated user's UUID.
///
/// Validation is purely cryptographic and time-based; no database
/// lookup. Handlers that need the user row resolve the UUID themselves.
pub struct Auth(pub String);

/// Authentication failure, reported uniformly as 401.
#[derive(Debug)]
pub enum AuthError {
    /// Missing or malformed `Authorization` header
    Credential(CredentialError),
    /// Token failed signature, issuer, or expiry checks
    InvalidToken,
}

impl AuthError {
    fn message(&self) -> &'static str {
        match self {
            AuthError::Credential(_) => "invalid or missing token",
            AuthError::InvalidToken => "invalid or expired token",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": self.message() })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for Auth
where
    S: HasAuthState + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).map_err(AuthError::Credential)?;

        let user_uuid = state
            .jwt()
            .validate(token)
            .map_err(|_| AuthError::InvalidToken)?;

        Ok(Auth(user_uuid))
    }
}
