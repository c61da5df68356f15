//! Meeting lifecycle: quorum, name, start and stop.

use super::{Engine, parse_count};
use crate::db::MeetingRecord;
use crate::error::{MotionError, MotionResult, Requirement};
use chrono::Utc;
use tracing::{Instrument, debug, info, instrument, warn};

impl Engine {
    /// Set the meeting quorum. Admin only.
    #[instrument(skip(self))]
    pub async fn set_quorum(&self, actor: &str, channel: &str, raw: &str) -> MotionResult<u64> {
        let (_, state) = self.channel(channel)?;
        let mut state = state.lock().await;
        self.require_admin(actor, channel)?;

        let quorum = match parse_count("Quorum", raw) {
            Ok(n) => n,
            Err(e) => return self.fail(&state.name, e),
        };
        state.meeting.quorum = quorum;
        debug!(quorum, "Quorum set");
        self.notice(&state.name, format!("*** Quorum now set to: {quorum}"));
        Ok(quorum)
    }

    /// Announce the stored quorum. Anyone may ask.
    pub async fn quorum(&self, channel: &str) -> MotionResult<u64> {
        let (_, state) = self.channel(channel)?;
        let state = state.lock().await;
        let quorum = state.meeting.quorum;
        self.notice(&state.name, format!("*** Quorum is: {quorum}"));
        Ok(quorum)
    }

    #[instrument(skip(self, name))]
    pub async fn set_meeting_name(&self, actor: &str, channel: &str, name: &str) -> MotionResult<()> {
        let (_, state) = self.channel(channel)?;
        let mut state = state.lock().await;
        self.require_admin(actor, channel)?;

        state.meeting.name = name.to_string();
        debug!(name = %name, "Meeting named");
        self.notice(&state.name, format!("*** Meeting: {name}"));
        Ok(())
    }

    pub async fn meeting_name(&self, channel: &str) -> MotionResult<String> {
        let (_, state) = self.channel(channel)?;
        let state = state.lock().await;
        let name = state.meeting.name.clone();
        self.notice(&state.name, format!("*** Current meeting: {name}"));
        Ok(name)
    }

    /// Start the meeting. Starting a running meeting just re-announces it.
    #[instrument(skip(self))]
    pub async fn start_meeting(&self, actor: &str, channel: &str) -> MotionResult<()> {
        let (_, state) = self.channel(channel)?;
        let mut state = state.lock().await;
        self.require_admin(actor, channel)?;

        if !state.meeting.started {
            state.meeting.started = true;
            state.meeting.started_at = Some(Utc::now());
            info!(meeting = %state.meeting.name, "Meeting started");
        }
        self.notice(&state.name, "*** Meeting started.");
        Ok(())
    }

    /// Stop the meeting and archive it. Meeting and motion are cleared and
    /// deferred voice grants are released.
    pub async fn stop_meeting(&self, actor: &str, channel: &str) -> MotionResult<MeetingRecord> {
        let span = crate::telemetry::spans::operation("stop_meeting", channel, actor);
        async move {
            let (key, state) = self.channel(channel)?;
            let mut state = state.lock().await;
            self.require_admin(actor, channel)?;

            if !state.meeting.started {
                return self.fail(&state.name, MotionError::NotStarted(Requirement::Meeting));
            }

            let record = MeetingRecord {
                channel: key.clone(),
                name: state.meeting.name.clone(),
                quorum: state.meeting.quorum,
                started_at: state.meeting.started_at,
                ended_at: Utc::now(),
                minutes: std::mem::take(&mut state.meeting.minutes),
            };
            if let Err(e) = self
                .roster
                .store()
                .archive_meeting(self.roster.bot(), &record)
                .await
            {
                warn!(error = %e, "Failed to archive meeting");
            }

            state.reset_meeting();
            self.release_pending(&mut state);
            info!(motions = record.minutes.len(), "Meeting ended");
            self.notice(&state.name, "*** Meeting ended.");
            Ok(record)
        }
        .instrument(span)
        .await
    }
}
