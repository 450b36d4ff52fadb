//! Chirp storage.

use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct ChirpStore {
    pool: SqlitePool,
}

/// A chirp joined with its author's public UUID.
#[derive(Debug, Clone)]
pub struct Chirp {
    pub uuid: String,
    pub user_id: i64,
    pub user_uuid: String,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(sqlx::FromRow)]
struct ChirpRow {
    uuid: String,
    user_id: i64,
    user_uuid: String,
    body: String,
    created_at: String,
    updated_at: String,
}

impl From<ChirpRow> for Chirp {
    fn from(row: ChirpRow) -> Self {
        Self {
            uuid: row.uuid,
            user_id: row.user_id,
            user_uuid: row.user_uuid,
            body: row.body,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const CHIRP_SELECT: &str = "SELECT c.uuid, c.user_id, u.uuid AS user_uuid, c.body, \
     c.created_at, c.updated_at FROM chirps c JOIN users u ON u.id = c.user_id";

impl ChirpStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new chirp. Returns the internal row ID.
    pub async fn create(&self, uuid: &str, user_id: i64, body: &str) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO chirps (uuid, user_id, body) VALUES (?, ?, ?)")
            .bind(uuid)
            .bind(user_id)
            .bind(body)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// List all chirps, oldest first.
    pub async fn list(&self) -> Result<Vec<Chirp>, sqlx::Error> {
        let rows: Vec<ChirpRow> =
            sqlx::query_as(&format!("{} ORDER BY c.created_at ASC, c.id ASC", CHIRP_SELECT))
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Chirp::from).collect())
    }

    /// Get a chirp by UUID.
    pub async fn get_by_uuid(&self, uuid: &str) -> Result<Option<Chirp>, sqlx::Error> {
        let row: Option<ChirpRow> =
            sqlx::query_as(&format!("{} WHERE c.uuid = ?", CHIRP_SELECT))
                .bind(uuid)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Chirp::from))
    }

    /// Delete a chirp by UUID.
    pub async fn delete_by_uuid(&self, uuid: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chirps WHERE uuid = ?")
            .bind(uuid)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
