//! Meeting archive repository.

use crate::db::{DbError, to_sql_int};
use crate::state::MotionMinute;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

/// A concluded meeting, handed to the store when the meeting is stopped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeetingRecord {
    pub channel: String,
    pub name: String,
    pub quorum: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: DateTime<Utc>,
    pub minutes: Vec<MotionMinute>,
}

/// An archived meeting row as read back. Minutes stay as stored JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedMeeting {
    pub id: i64,
    pub channel: String,
    pub name: String,
    pub quorum: i64,
    pub started_at: Option<i64>,
    pub ended_at: i64,
    pub minutes: String,
}

/// Repository for archived meetings.
pub struct MeetingRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MeetingRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a meeting and return its row id.
    pub async fn archive(&self, bot: &str, record: &MeetingRecord) -> Result<i64, DbError> {
        let minutes = serde_json::to_string(&record.minutes)?;

        let result = sqlx::query(
            r#"
            INSERT INTO meetings (bot, channel, name, quorum, started_at, ended_at, minutes)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(bot)
        .bind(&record.channel)
        .bind(&record.name)
        .bind(to_sql_int(record.quorum))
        .bind(record.started_at.map(|t| t.timestamp()))
        .bind(record.ended_at.timestamp())
        .bind(minutes)
        .execute(self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Most recent meetings for a channel, newest first.
    pub async fn recent(&self, bot: &str, channel: &str, limit: u32) -> Result<Vec<ArchivedMeeting>, DbError> {
        let rows = sqlx::query_as::<_, (i64, String, String, i64, Option<i64>, i64, String)>(
            r#"
            SELECT id, channel, name, quorum, started_at, ended_at, minutes
            FROM meetings
            WHERE bot = ? AND channel = ?
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(bot)
        .bind(channel)
        .bind(i64::from(limit))
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(id, channel, name, quorum, started_at, ended_at, minutes)| ArchivedMeeting {
                    id,
                    channel,
                    name,
                    quorum,
                    started_at,
                    ended_at,
                    minutes,
                },
            )
            .collect())
    }
}
