//! Refresh token policy: issuance, resolution, revocation.
//!
//! Refresh tokens are opaque 256-bit random strings stored server-side
//! (`refresh_tokens` table) so they can be revoked, unlike the stateless
//! access tokens. Resolution distinguishes unknown, expired, and revoked
//! tokens internally; handlers collapse all three into the same 401.

use rand::RngCore;
use std::fmt::Write;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::db::Database;

/// Refresh token lifetime: 60 days.
pub const REFRESH_TOKEN_TTL: Duration = Duration::from_secs(60 * 24 * 60 * 60);

/// A freshly issued refresh token.
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    /// The opaque token string handed to the client
    pub token: String,
    /// Expiration timestamp (Unix seconds)
    pub expires_at: i64,
}

/// Failure modes in the refresh token lifecycle.
#[derive(Debug)]
pub enum RefreshError {
    /// No record with this token exists
    NotFound,
    /// The record exists but its expiry has passed
    Expired,
    /// The record exists but has been revoked
    Revoked,
    /// Persistence failure
    Database(sqlx::Error),
    /// System time error
    TimeError,
}

impl std::fmt::Display for RefreshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshError::NotFound => write!(f, "Refresh token not found"),
            RefreshError::Expired => write!(f, "Refresh token has expired"),
            RefreshError::Revoked => write!(f, "Refresh token has been revoked"),
            RefreshError::Database(e) => write!(f, "Database error: {}", e),
            RefreshError::TimeError => write!(f, "System time error"),
        }
    }
}

impl std::error::Error for RefreshError {}

fn now_secs() -> Result<i64, RefreshError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .map_err(|_| RefreshError::TimeError)
}

/// Generate a 256-bit random token, hex-encoded.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    let mut out = String::with_capacity(64);
    for b in bytes {
        write!(out, "{:02x}", b).expect("writing to String cannot fail");
    }
    out
}

/// First few characters of a token, safe to log.
pub(crate) fn token_fingerprint(token: &str) -> &str {
    &token[..token.len().min(8)]
}

/// Issue a new refresh token for a user and persist it.
///
/// Uniqueness rests on the table's primary key; the astronomically
/// unlikely collision surfaces as a database error rather than being
/// retried.
pub async fn issue_refresh_token(
    db: &Database,
    user_id: i64,
) -> Result<IssuedRefreshToken, RefreshError> {
    let token = generate_token();
    let expires_at = now_secs()? + REFRESH_TOKEN_TTL.as_secs() as i64;

    db.refresh_tokens()
        .insert(&token, user_id, expires_at)
        .await
        .map_err(RefreshError::Database)?;

    Ok(IssuedRefreshToken { token, expires_at })
}

/// Resolve a refresh token to its owning user id.
///
/// Succeeds only for a token that exists, is unrevoked, and has not
/// expired. Revocation wins over expiry when both apply.
pub async fn resolve_refresh_token(db: &Database, token: &str) -> Result<i64, RefreshError> {
    let record = db
        .refresh_tokens()
        .get(token)
        .await
        .map_err(RefreshError::Database)?
        .ok_or(RefreshError::NotFound)?;

    if record.revoked_at.is_some() {
        return Err(RefreshError::Revoked);
    }
    if now_secs()? >= record.expires_at {
        return Err(RefreshError::Expired);
    }

    Ok(record.user_id)
}

/// Revoke a refresh token. Unknown tokens are an error, not a no-op.
///
/// Revoking an already-revoked token succeeds again (the conditional
/// update matches the row either way); it never re-activates one.
pub async fn revoke_refresh_token(db: &Database, token: &str) -> Result<(), RefreshError> {
    let when = now_secs()?;
    let affected = db
        .refresh_tokens()
        .set_revoked(token, when)
        .await
        .map_err(RefreshError::Database)?;

    if affected == 0 {
        return Err(RefreshError::NotFound);
    }

    tracing::debug!(token = %token_fingerprint(token), "Refresh token revoked");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_unique_hex() {
        let t1 = generate_token();
        let t2 = generate_token();
        assert_eq!(t1.len(), 64);
        assert!(t1.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(t1, t2);
    }

    #[test]
    fn test_fingerprint_truncates() {
        assert_eq!(token_fingerprint("abcdef0123456789"), "abcdef01");
        assert_eq!(token_fingerprint("abc"), "abc");
    }
}
