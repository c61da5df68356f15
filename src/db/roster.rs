//! Recognised-roster repository.

use crate::db::DbError;
use crate::hostmask::Fingerprint;
use sqlx::SqlitePool;

/// Repository for per-channel recognised fingerprints.
pub struct RosterRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RosterRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Load a roster, or `None` if the channel has never had one created.
    pub async fn load(&self, bot: &str, channel: &str) -> Result<Option<Vec<Fingerprint>>, DbError> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM rosters WHERE bot = ? AND channel = ?",
        )
        .bind(bot)
        .bind(channel)
        .fetch_one(self.pool)
        .await?;

        if exists == 0 {
            return Ok(None);
        }

        let rows = sqlx::query_scalar::<_, String>(
            r#"
            SELECT fingerprint FROM recognised
            WHERE bot = ? AND channel = ?
            ORDER BY added_at, fingerprint
            "#,
        )
        .bind(bot)
        .bind(channel)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(rows.into_iter().map(Fingerprint::from_stored).collect()))
    }

    /// Create an empty roster record. Existing records are left alone.
    pub async fn create(&self, bot: &str, channel: &str) -> Result<(), DbError> {
        sqlx::query("INSERT OR IGNORE INTO rosters (bot, channel, created_at) VALUES (?, ?, ?)")
            .bind(bot)
            .bind(channel)
            .bind(chrono::Utc::now().timestamp())
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Add a fingerprint, creating the roster record if needed.
    pub async fn add(&self, bot: &str, channel: &str, fingerprint: &Fingerprint) -> Result<(), DbError> {
        self.create(bot, channel).await?;
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO recognised (bot, channel, fingerprint, added_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(bot)
        .bind(channel)
        .bind(fingerprint.as_str())
        .bind(chrono::Utc::now().timestamp())
        .execute(self.pool)
        .await?;
        Ok(())
    }

    pub async fn remove(&self, bot: &str, channel: &str, fingerprint: &Fingerprint) -> Result<bool, DbError> {
        let result = sqlx::query(
            "DELETE FROM recognised WHERE bot = ? AND channel = ? AND fingerprint = ?",
        )
        .bind(bot)
        .bind(channel)
        .bind(fingerprint.as_str())
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
