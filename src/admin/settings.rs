/// Platform settings stored in the `settings` key/value table
use crate::error::{GateError, GateResult};
use sqlx::{Sqlite, SqlitePool, Transaction};

/// Argon2id hash of the admin secret
pub const ADMIN_SECRET_HASH: &str = "admin_secret_hash";
/// Bumped on every secret change; grants from older generations are void
pub const ADMIN_SECRET_GENERATION: &str = "admin_secret_generation";

/// Settings store
#[derive(Clone)]
pub struct PlatformSettings {
    db: SqlitePool,
}

impl PlatformSettings {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Insert a value unless the key already exists
    pub async fn insert_default(&self, key: &str, value: &str) -> GateResult<bool> {
        let result = sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)")
            .bind(key)
            .bind(value)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn get(&self, key: &str) -> GateResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.db)
            .await?;

        Ok(value)
    }

    /// Get a value that initialization must have seeded
    pub async fn require(&self, key: &str) -> GateResult<String> {
        self.get(key)
            .await?
            .ok_or_else(|| GateError::Internal(format!("Setting {} is not initialized", key)))
    }

    pub async fn generation(&self) -> GateResult<i64> {
        self.require(ADMIN_SECRET_GENERATION)
            .await?
            .parse()
            .map_err(|e| GateError::Internal(format!("Invalid secret generation: {}", e)))
    }

    /// Replace the admin secret hash and bump the generation atomically
    ///
    /// Returns the new generation.
    pub async fn rotate_admin_secret(&self, secret_hash: &str) -> GateResult<i64> {
        let mut tx: Transaction<'_, Sqlite> = self.db.begin().await?;

        sqlx::query("UPDATE settings SET value = ?1 WHERE key = ?2")
            .bind(secret_hash)
            .bind(ADMIN_SECRET_HASH)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE settings SET value = CAST(CAST(value AS INTEGER) + 1 AS TEXT) WHERE key = ?1",
        )
        .bind(ADMIN_SECRET_GENERATION)
        .execute(&mut *tx)
        .await?;

        let generation: String = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
            .bind(ADMIN_SECRET_GENERATION)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        generation
            .parse()
            .map_err(|e| GateError::Internal(format!("Invalid secret generation: {}", e)))
    }
}
