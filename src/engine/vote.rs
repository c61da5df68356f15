//! Vote casting.

use super::Engine;
use crate::error::MotionResult;
use crate::state::Vote;
use tracing::{debug, trace};

const NOT_RECOGNISED: &str = "You are not recognised; your vote has not been counted. \
                              If this a mistake, inform the operators.";

impl Engine {
    /// Handle a channel line that may be a vote.
    ///
    /// Only the first word matters. Returns the recorded vote, or `None` if
    /// the line was not a vote, no motion is running, or the voter isn't
    /// entitled to vote (they get a private notice in that case).
    pub async fn cast_vote(&self, voter: &str, channel: &str, line: &str) -> MotionResult<Option<Vote>> {
        let (_, state) = self.channel(channel)?;
        let mut state = state.lock().await;

        let Some(vote) = line.split_whitespace().next().and_then(Vote::parse) else {
            return Ok(None);
        };
        if !state.motion.started {
            trace!(voter = %voter, "Vote outside a motion ignored");
            return Ok(None);
        }
        if !self.permissions.can_vote(voter, channel) {
            debug!(voter = %voter, channel = %state.name, "Vote refused");
            self.private_notice(voter, NOT_RECOGNISED);
            return Ok(None);
        }

        let key = self.mapper.fold(voter);
        debug!(voter = %key, channel = %state.name, vote = ?vote, "Vote recorded");
        state.motion.votes.insert(key, vote);
        Ok(Some(vote))
    }
}
