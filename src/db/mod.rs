mod chirp;
mod refresh_token;
mod user;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

pub use chirp::{Chirp, ChirpStore};
pub use refresh_token::{RefreshTokenRecord, RefreshTokenStore};
pub use user::{User, UserStore};

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open or create a database at the given path.
    /// Use ":memory:" for an in-memory database.
    pub async fn open(path: &str) -> Result<Self, sqlx::Error> {
        let url = if path == ":memory:" {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite:{}?mode=rwc", path)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Get the current schema version.
    async fn get_version(&self) -> Result<i32, sqlx::Error> {
        let result: Option<(i32,)> = sqlx::query_as("SELECT version FROM schema_version LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(result.map(|r| r.0).unwrap_or(0))
    }

    /// Set the schema version within a transaction.
    async fn set_version(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        version: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM schema_version")
            .execute(&mut **tx)
            .await?;
        sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
            .bind(version)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Run database migrations.
    async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
            .execute(&self.pool)
            .await?;

        let version = self.get_version().await?;

        if version < 1 {
            self.migrate_v1().await?;
        }

        Ok(())
    }

    /// Execute a list of queries in a transaction, then set the version.
    async fn run_migration(
        &self,
        version: i32,
        queries: &[&'static str],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for query in queries {
            sqlx::query(*query).execute(&mut *tx).await?;
        }
        Self::set_version(&mut tx, version).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn migrate_v1(&self) -> Result<(), sqlx::Error> {
        self.run_migration(
            1,
            &[
                // Users table. The uuid is the public identifier (and JWT
                // subject); the integer id stays internal.
                "CREATE TABLE users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    uuid TEXT UNIQUE NOT NULL,
                    email TEXT UNIQUE NOT NULL COLLATE NOCASE,
                    hashed_password TEXT NOT NULL,
                    is_chirpy_red INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL DEFAULT (datetime('now')),
                    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
                )",
                "CREATE INDEX idx_users_uuid ON users(uuid)",
                "CREATE INDEX idx_users_email ON users(email)",
                // Chirps table
                "CREATE TABLE chirps (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    uuid TEXT UNIQUE NOT NULL,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    body TEXT NOT NULL,
                    created_at TEXT NOT NULL DEFAULT (datetime('now')),
                    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
                )",
                "CREATE INDEX idx_chirps_uuid ON chirps(uuid)",
                "CREATE INDEX idx_chirps_user_id ON chirps(user_id)",
                // Refresh tokens. The opaque token string is the primary
                // key; expiry and revocation are Unix-second timestamps.
                "CREATE TABLE refresh_tokens (
                    token TEXT PRIMARY KEY NOT NULL,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    expires_at INTEGER NOT NULL,
                    revoked_at INTEGER,
                    created_at TEXT NOT NULL DEFAULT (datetime('now')),
                    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
                )",
                "CREATE INDEX idx_refresh_tokens_user_id ON refresh_tokens(user_id)",
            ],
        )
        .await
    }

    /// Get the user store.
    pub fn users(&self) -> UserStore {
        UserStore::new(self.pool.clone())
    }

    /// Get the chirp store.
    pub fn chirps(&self) -> ChirpStore {
        ChirpStore::new(self.pool.clone())
    }

    /// Get the refresh token store.
    pub fn refresh_tokens(&self) -> RefreshTokenStore {
        RefreshTokenStore::new(self.pool.clone())
    }

    /// Get the underlying connection pool (for tests that need raw SQL access).
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get_user() {
        let db = Database::open(":memory:").await.unwrap();

        let id = db
            .users()
            .create("uuid-123", "alice@example.com", "hash")
            .await
            .unwrap();

        let user = db
            .users()
            .get_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.uuid, "uuid-123");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.hashed_password, "hash");
        assert!(!user.is_chirpy_red);

        let user = db.users().get_by_id(id).await.unwrap().unwrap();
        assert_eq!(user.id, id);

        let user = db.users().get_by_uuid("uuid-123").await.unwrap().unwrap();
        assert_eq!(user.id, id);
    }

    #[tokio::test]
    async fn test_duplicate_email_fails() {
        let db = Database::open(":memory:").await.unwrap();

        db.users()
            .create("uuid-1", "alice@example.com", "hash")
            .await
            .unwrap();
        let result = db
            .users()
            .create("uuid-2", "Alice@Example.com", "hash")
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_update_credentials() {
        let db = Database::open(":memory:").await.unwrap();

        let id = db
            .users()
            .create("uuid-1", "alice@example.com", "hash")
            .await
            .unwrap();

        let updated = db
            .users()
            .update_credentials(id, "alice2@example.com", "hash2")
            .await
            .unwrap();
        assert!(updated);

        let user = db.users().get_by_id(id).await.unwrap().unwrap();
        assert_eq!(user.email, "alice2@example.com");
        assert_eq!(user.hashed_password, "hash2");
    }

    #[tokio::test]
    async fn test_upgrade_user() {
        let db = Database::open(":memory:").await.unwrap();

        db.users()
            .create("uuid-1", "alice@example.com", "hash")
            .await
            .unwrap();

        assert!(db.users().upgrade_by_uuid("uuid-1").await.unwrap());
        assert!(!db.users().upgrade_by_uuid("uuid-missing").await.unwrap());

        let user = db.users().get_by_uuid("uuid-1").await.unwrap().unwrap();
        assert!(user.is_chirpy_red);
    }

    #[tokio::test]
    async fn test_duplicate_refresh_token_fails() {
        let db = Database::open(":memory:").await.unwrap();

        let id = db
            .users()
            .create("uuid-1", "alice@example.com", "hash")
            .await
            .unwrap();

        db.refresh_tokens()
            .insert("tok", id, 10_000)
            .await
            .unwrap();
        assert!(db.refresh_tokens().insert("tok", id, 10_000).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_all_users_cascades() {
        let db = Database::open(":memory:").await.unwrap();

        let id = db
            .users()
            .create("uuid-1", "alice@example.com", "hash")
            .await
            .unwrap();
        db.chirps().create("chirp-1", id, "hello").await.unwrap();

        db.users().delete_all().await.unwrap();
        assert!(db.users().get_by_id(id).await.unwrap().is_none());
        assert!(db.chirps().list().await.unwrap().is_empty());
    }
}
