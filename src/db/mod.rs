//! Persistent storage.
//!
//! The engine talks to storage through [`MotionStore`]. Two backends exist:
//! - [`Database`]: SQLite via SQLx, holding recognised rosters and archived
//!   meetings.
//! - [`NoOpStore`]: used when no database is configured. Rosters then live in
//!   memory only and meetings are not archived.

mod meetings;
mod noop;
mod roster;

pub use meetings::{ArchivedMeeting, MeetingRecord, MeetingRepository};
pub use noop::NoOpStore;
pub use roster::RosterRepository;

use crate::hostmask::Fingerprint;
use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

static MEMDB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Storage the engine writes through. Every call is keyed by the bot's
/// configured name so several bots can share one database.
#[async_trait]
pub trait MotionStore: Send + Sync {
    /// Load a channel's roster. `None` means no record exists yet.
    async fn load_roster(
        &self,
        bot: &str,
        channel: &str,
    ) -> Result<Option<Vec<Fingerprint>>, DbError>;

    /// Create an empty roster record.
    async fn create_roster(&self, bot: &str, channel: &str) -> Result<(), DbError>;

    async fn add_fingerprint(
        &self,
        bot: &str,
        channel: &str,
        fingerprint: &Fingerprint,
    ) -> Result<(), DbError>;

    /// Returns whether a row was removed.
    async fn remove_fingerprint(
        &self,
        bot: &str,
        channel: &str,
        fingerprint: &Fingerprint,
    ) -> Result<bool, DbError>;

    /// Archive a concluded meeting.
    async fn archive_meeting(&self, bot: &str, record: &MeetingRecord) -> Result<(), DbError>;
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS rosters (
        bot TEXT NOT NULL,
        channel TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        PRIMARY KEY (bot, channel)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS recognised (
        bot TEXT NOT NULL,
        channel TEXT NOT NULL,
        fingerprint TEXT NOT NULL,
        added_at INTEGER NOT NULL,
        PRIMARY KEY (bot, channel, fingerprint)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS meetings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        bot TEXT NOT NULL,
        channel TEXT NOT NULL,
        name TEXT NOT NULL,
        quorum INTEGER NOT NULL,
        started_at INTEGER,
        ended_at INTEGER NOT NULL,
        minutes TEXT NOT NULL
    )
    "#,
];

/// Database handle with connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connection acquire timeout.
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Maximum time a connection can remain idle before being closed.
    const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Open (or create) the database and make sure the schema exists.
    ///
    /// `":memory:"` gives a private in-memory database.
    pub async fn new(path: &str) -> Result<Self, DbError> {
        let pool = if path == ":memory:" {
            // Uniquely named shared-cache database so parallel tests don't collide.
            let id = MEMDB_COUNTER.fetch_add(1, Ordering::Relaxed);
            let memdb_uri = format!(
                "file:slirc-motions-memdb-{}-{}?mode=memory&cache=shared",
                std::process::id(),
                id
            );

            let options = SqliteConnectOptions::new()
                .filename(&memdb_uri)
                .shared_cache(true)
                .create_if_missing(true);

            SqlitePoolOptions::new()
                .max_connections(1)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .idle_timeout(Some(Self::IDLE_TIMEOUT))
                .connect_with(options)
                .await?
        } else {
            if let Some(parent) = Path::new(path).parent()
                && !parent.as_os_str().is_empty()
                && let Err(e) = std::fs::create_dir_all(parent)
            {
                tracing::warn!(path = %parent.display(), error = %e, "Failed to create database directory");
            }

            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true);

            SqlitePoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .idle_timeout(Some(Self::IDLE_TIMEOUT))
                .connect_with(options)
                .await?
        };

        info!(path = %path, "Database connected");
        Self::ensure_schema(&pool).await?;
        Ok(Self { pool })
    }

    async fn ensure_schema(pool: &SqlitePool) -> Result<(), DbError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(pool).await?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn rosters(&self) -> RosterRepository<'_> {
        RosterRepository::new(&self.pool)
    }

    pub fn meetings(&self) -> MeetingRepository<'_> {
        MeetingRepository::new(&self.pool)
    }
}

#[async_trait]
impl MotionStore for Database {
    async fn load_roster(
        &self,
        bot: &str,
        channel: &str,
    ) -> Result<Option<Vec<Fingerprint>>, DbError> {
        self.rosters().load(bot, channel).await
    }

    async fn create_roster(&self, bot: &str, channel: &str) -> Result<(), DbError> {
        self.rosters().create(bot, channel).await
    }

    async fn add_fingerprint(
        &self,
        bot: &str,
        channel: &str,
        fingerprint: &Fingerprint,
    ) -> Result<(), DbError> {
        self.rosters().add(bot, channel, fingerprint).await
    }

    async fn remove_fingerprint(
        &self,
        bot: &str,
        channel: &str,
        fingerprint: &Fingerprint,
    ) -> Result<bool, DbError> {
        self.rosters().remove(bot, channel, fingerprint).await
    }

    async fn archive_meeting(&self, bot: &str, record: &MeetingRecord) -> Result<(), DbError> {
        self.meetings().archive(bot, record).await.map(|_| ())
    }
}

/// Clamp an unsigned count into SQLite's signed integer range.
pub(crate) fn to_sql_int(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
