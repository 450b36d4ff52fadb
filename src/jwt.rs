//! Access token generation and validation.
//!
//! Access tokens are stateless HS256 JWTs signed with a process-wide
//! secret. Validation never touches the database: a token is valid iff
//! its signature verifies, its issuer matches, and it has not expired.
//! Revocation lives entirely in the refresh-token tier (`auth::refresh`).

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Issuer claim embedded in every access token.
pub const TOKEN_ISSUER: &str = "chirpy";

/// Access token lifetime: 1 hour. Clients are expected to refresh,
/// not re-login.
pub const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer, always [`TOKEN_ISSUER`]
    pub iss: String,
    /// Subject (user UUID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Signing and verification keys derived from the shared secret.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtConfig {
    /// Create a new JWT configuration with the given secret.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Issue an access token for a user with the given time-to-live.
    pub fn issue(&self, user_uuid: &str, ttl: Duration) -> Result<String, JwtError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| JwtError::TimeError)?
            .as_secs();

        let claims = Claims {
            iss: TOKEN_ISSUER.to_string(),
            sub: user_uuid.to_string(),
            iat: now,
            exp: now + ttl.as_secs(),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)
    }

    /// Validate an access token and return the subject (user UUID).
    ///
    /// The signature is verified before any claim is inspected, so a bad
    /// signature is indistinguishable in timing from bad claims. No store
    /// lookup happens here; whether the subject still exists is the
    /// resource handler's concern.
    pub fn validate(&self, token: &str) -> Result<String, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        let token_data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => JwtError::Expired,
                    ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                    _ => JwtError::Malformed,
                }
            })?;

        Ok(token_data.claims.sub)
    }
}

/// Errors that can occur during token operations.
#[derive(Debug)]
pub enum JwtError {
    /// The token is past its expiration time
    Expired,
    /// The signature does not verify against the current secret
    InvalidSignature,
    /// Structurally invalid: not three parts, undecodable, missing
    /// claims, or wrong issuer
    Malformed,
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// System time error
    TimeError,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::Expired => write!(f, "Token has expired"),
            JwtError::InvalidSignature => write!(f, "Invalid token signature"),
            JwtError::Malformed => write!(f, "Malformed token"),
            JwtError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            JwtError::TimeError => write!(f, "System time error"),
        }
    }
}

impl std::error::Error for JwtError {}
