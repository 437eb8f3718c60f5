/// Usage counters stored in the `stats` table
///
/// Counters only ever increase. They record page views and lesson opens and
/// play no part in access decisions.

use crate::error::GateResult;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};

pub const VISITORS: &str = "visitors";
pub const LESSONS_WATCHED: &str = "lessons_watched";

/// Point-in-time counter values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    pub visitors: i64,
    pub lessons_watched: i64,
}

/// Usage counter service
#[derive(Clone)]
pub struct UsageCounters {
    db: SqlitePool,
}

impl UsageCounters {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Count a landing-page view
    pub async fn record_visit(&self) -> GateResult<()> {
        self.increment(VISITORS).await
    }

    /// Count an opened lesson link
    pub async fn record_lesson_watch(&self) -> GateResult<()> {
        self.increment(LESSONS_WATCHED).await
    }

    pub async fn snapshot(&self) -> GateResult<UsageSnapshot> {
        let rows = sqlx::query("SELECT key, value FROM stats")
            .fetch_all(&self.db)
            .await?;

        let mut snapshot = UsageSnapshot::default();
        for row in rows {
            let key: String = row.try_get("key")?;
            let value: i64 = row.try_get("value")?;
            match key.as_str() {
                VISITORS => snapshot.visitors = value,
                LESSONS_WATCHED => snapshot.lessons_watched = value,
                _ => {}
            }
        }

        Ok(snapshot)
    }

    async fn increment(&self, key: &str) -> GateResult<()> {
        // A missing row starts at 1
        sqlx::query(
            "INSERT INTO stats (key, value) VALUES (?1, 1)
             ON CONFLICT(key) DO UPDATE SET value = value + 1",
        )
        .bind(key)
        .execute(&self.db)
        .await?;

        tracing::trace!(counter = key, "Usage counter incremented");

        Ok(())
    }
}
