//! Refresh token persistence.
//!
//! Rows are created at login, read on refresh, and mutated exactly once
//! (setting `revoked_at`) on revocation. Policy — expiry windows,
//! validity checks — lives in [`crate::auth::refresh`]; this store only
//! moves rows.

use sqlx::sqlite::SqlitePool;

/// A persisted refresh token row.
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: i64,
    /// Expiration timestamp (Unix seconds)
    pub expires_at: i64,
    /// Revocation timestamp (Unix seconds), if revoked
    pub revoked_at: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(sqlx::FromRow)]
struct RefreshTokenRow {
    token: String,
    user_id: i64,
    expires_at: i64,
    revoked_at: Option<i64>,
    created_at: String,
    updated_at: String,
}

impl From<RefreshTokenRow> for RefreshTokenRecord {
    fn from(row: RefreshTokenRow) -> Self {
        Self {
            token: row.token,
            user_id: row.user_id,
            expires_at: row.expires_at,
            revoked_at: row.revoked_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct RefreshTokenStore {
    pool: SqlitePool,
}

impl RefreshTokenStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new token row. Fails on a duplicate token (primary key).
    pub async fn insert(
        &self,
        token: &str,
        user_id: i64,
        expires_at: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO refresh_tokens (token, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(token)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Look up a token row.
    pub async fn get(&self, token: &str) -> Result<Option<RefreshTokenRecord>, sqlx::Error> {
        let row: Option<RefreshTokenRow> = sqlx::query_as(
            "SELECT token, user_id, expires_at, revoked_at, created_at, updated_at \
             FROM refresh_tokens WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(RefreshTokenRecord::from))
    }

    /// Set `revoked_at` on the matching row. Returns rows affected (0 for
    /// an unknown token). An earlier revocation timestamp is kept.
    pub async fn set_revoked(&self, token: &str, when: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = COALESCE(revoked_at, ?), \
             updated_at = datetime('now') WHERE token = ?",
        )
        .bind(when)
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
