//! No-op store that keeps nothing.
//!
//! Used when no database is configured. All operations succeed; rosters
//! always load as "no record" so the engine starts each channel empty.

use super::{DbError, MeetingRecord, MotionStore};
use crate::hostmask::Fingerprint;
use async_trait::async_trait;

pub struct NoOpStore;

#[async_trait]
impl MotionStore for NoOpStore {
    async fn load_roster(
        &self,
        _bot: &str,
        _channel: &str,
    ) -> Result<Option<Vec<Fingerprint>>, DbError> {
        Ok(None)
    }

    async fn create_roster(&self, _bot: &str, _channel: &str) -> Result<(), DbError> {
        Ok(())
    }

    async fn add_fingerprint(
        &self,
        _bot: &str,
        _channel: &str,
        _fingerprint: &Fingerprint,
    ) -> Result<(), DbError> {
        Ok(())
    }

    async fn remove_fingerprint(
        &self,
        _bot: &str,
        _channel: &str,
        _fingerprint: &Fingerprint,
    ) -> Result<bool, DbError> {
        Ok(false)
    }

    async fn archive_meeting(&self, _bot: &str, _record: &MeetingRecord) -> Result<(), DbError> {
        Ok(())
    }
}
