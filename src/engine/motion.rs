//! Motion lifecycle and tally.

use super::{Engine, parse_count};
use crate::error::{MotionError, MotionResult, Requirement};
use crate::state::{ExternalVote, MotionMinute, Tally};
use chrono::Utc;
use tracing::{Instrument, debug, info, instrument};

impl Engine {
    /// Set the motion text; the actor becomes its proposer. Admin only.
    #[instrument(skip(self, text))]
    pub async fn set_motion_text(&self, actor: &str, channel: &str, text: &str) -> MotionResult<()> {
        let (_, state) = self.channel(channel)?;
        let mut state = state.lock().await;
        self.require_admin(actor, channel)?;

        state.motion.text = text.to_string();
        state.motion.proposer = actor.to_string();
        debug!("Motion text set");
        self.notice(&state.name, format!("*** Motion: {text}"));
        Ok(())
    }

    pub async fn motion_text(&self, channel: &str) -> MotionResult<String> {
        let (_, state) = self.channel(channel)?;
        let state = state.lock().await;
        let text = state.motion.text.clone();
        self.notice(&state.name, format!("*** Current motion: {text}"));
        Ok(text)
    }

    /// Set the ayes or nays cast outside the channel. Needs a running
    /// meeting and motion.
    #[instrument(skip(self))]
    pub async fn set_external_votes(
        &self,
        actor: &str,
        channel: &str,
        kind: ExternalVote,
        raw: &str,
    ) -> MotionResult<u64> {
        let (_, state) = self.channel(channel)?;
        let mut state = state.lock().await;
        self.require_admin(actor, channel)?;

        if !state.meeting.started {
            return self.fail(&state.name, MotionError::NotStarted(Requirement::Meeting));
        }
        if !state.motion.started {
            return self.fail(&state.name, MotionError::NotStarted(Requirement::Motion));
        }
        let count = match parse_count("Votes", raw) {
            Ok(n) => n,
            Err(e) => return self.fail(&state.name, e),
        };

        let label = match kind {
            ExternalVote::Ayes => {
                state.motion.external_ayes = count;
                "ayes"
            }
            ExternalVote::Nays => {
                state.motion.external_nays = count;
                "nays"
            }
        };
        debug!(kind = label, count, "External votes set");
        self.notice(&state.name, format!("*** Extra {label}: {count}"));
        Ok(count)
    }

    /// Open the motion for voting.
    #[instrument(skip(self))]
    pub async fn start_motion(&self, actor: &str, channel: &str) -> MotionResult<()> {
        let (_, state) = self.channel(channel)?;
        let mut state = state.lock().await;
        self.require_admin(actor, channel)?;

        if !state.meeting.started {
            return self.fail(&state.name, MotionError::NotStarted(Requirement::Meeting));
        }

        state.motion.started = true;
        info!(motion = %state.motion.text, proposer = %state.motion.proposer, "Motion started");
        self.notice(&state.name, format!("*** MOTION: {}", state.motion.text));
        self.notice(&state.name, format!("*** Put by: {}", state.motion.proposer));
        self.notice(
            &state.name,
            "*** Please now respond either \"aye\", \"nay\" or \"abstain\" to record a vote.",
        );
        Ok(())
    }

    /// Discard the motion without counting it. Works whether or not one
    /// was started, and releases any deferred voice grants.
    #[instrument(skip(self))]
    pub async fn cancel_motion(&self, actor: &str, channel: &str) -> MotionResult<()> {
        let (_, state) = self.channel(channel)?;
        let mut state = state.lock().await;
        self.require_admin(actor, channel)?;

        state.reset_motion();
        self.release_pending(&mut state);
        info!("Motion cancelled");
        self.notice(&state.name, "*** Motion cancelled.");
        Ok(())
    }

    /// Close the motion, count it and announce the result.
    ///
    /// Only voters still in the channel are counted. The concluded motion
    /// is added to the running meeting's minutes.
    pub async fn stop_motion(&self, actor: &str, channel: &str) -> MotionResult<Tally> {
        let span = crate::telemetry::spans::operation("stop_motion", channel, actor);
        async move {
            let (_, state) = self.channel(channel)?;
            let mut state = state.lock().await;
            self.require_admin(actor, channel)?;

            if !state.motion.started {
                return self.fail(&state.name, MotionError::NotStarted(Requirement::MotionToStop));
            }

            let tally = Tally::count(&state.motion, state.meeting.quorum, |nick| {
                self.permissions.is_member(nick, &state.name)
            });
            for line in tally.report() {
                self.notice(&state.name, line);
            }
            info!(
                ayes = tally.aye_count(),
                nays = tally.nay_count(),
                abstains = tally.abstain_count(),
                outcome = ?tally.outcome,
                "Motion concluded"
            );

            if state.meeting.started {
                let minute = MotionMinute {
                    text: state.motion.text.clone(),
                    proposer: state.motion.proposer.clone(),
                    ayes: tally.aye_count(),
                    nays: tally.nay_count(),
                    abstains: tally.abstain_count(),
                    in_favour: tally.in_favour(),
                    outcome: tally.outcome,
                    concluded_at: Utc::now(),
                };
                state.meeting.minutes.push(minute);
            }

            state.reset_motion();
            self.release_pending(&mut state);
            Ok(tally)
        }
        .instrument(span)
        .await
    }
}
