//! Per-channel meeting, motion and vote state.

use super::tally::Outcome;
use crate::hostmask::Fingerprint;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A single recorded vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Aye,
    Nay,
    Abstain,
}

impl Vote {
    /// Match a vote word case-insensitively.
    pub fn parse(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("aye") {
            Some(Self::Aye)
        } else if word.eq_ignore_ascii_case("nay") {
            Some(Self::Nay)
        } else if word.eq_ignore_ascii_case("abstain") {
            Some(Self::Abstain)
        } else {
            None
        }
    }
}

/// Which external tally an admin is setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalVote {
    Ayes,
    Nays,
}

/// The meeting sub-object.
#[derive(Debug, Clone, Default)]
pub struct Meeting {
    pub name: String,
    pub started: bool,
    pub quorum: u64,
    pub started_at: Option<DateTime<Utc>>,
    /// Motions concluded (stopped, not cancelled) during this meeting.
    pub minutes: Vec<MotionMinute>,
}

/// The motion sub-object.
#[derive(Debug, Clone, Default)]
pub struct Motion {
    pub text: String,
    pub proposer: String,
    pub started: bool,
    /// Keyed by case-folded nick.
    pub votes: BTreeMap<String, Vote>,
    pub external_ayes: u64,
    pub external_nays: u64,
}

/// Record of one concluded motion, kept for the meeting archive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MotionMinute {
    pub text: String,
    pub proposer: String,
    pub ayes: u64,
    pub nays: u64,
    pub abstains: u64,
    pub in_favour: f64,
    pub outcome: Outcome,
    pub concluded_at: DateTime<Utc>,
}

/// Everything the engine tracks for one channel.
#[derive(Debug, Clone, Default)]
pub struct ChannelState {
    /// Channel name as we joined it.
    pub name: String,
    pub recognized: BTreeSet<Fingerprint>,
    /// Folded nicks waiting for voice until the running motion ends.
    pub pending_voice: Vec<String>,
    pub meeting: Meeting,
    pub motion: Motion,
}

impl ChannelState {
    pub fn new(name: impl Into<String>, recognized: BTreeSet<Fingerprint>) -> Self {
        Self {
            name: name.into(),
            recognized,
            ..Default::default()
        }
    }

    /// Clear the motion back to its empty form.
    pub fn reset_motion(&mut self) {
        self.motion = Motion::default();
    }

    /// Clear both meeting and motion.
    pub fn reset_meeting(&mut self) {
        self.meeting = Meeting::default();
        self.motion = Motion::default();
    }

    /// Queue a folded nick for a deferred voice grant. Already queued is a no-op.
    pub fn enqueue_pending(&mut self, nick: String) {
        if !self.pending_voice.contains(&nick) {
            self.pending_voice.push(nick);
        }
    }

    pub fn remove_pending(&mut self, nick: &str) -> bool {
        let before = self.pending_voice.len();
        self.pending_voice.retain(|n| n != nick);
        self.pending_voice.len() != before
    }

    /// Drain the queue, in the order nicks were added.
    pub fn take_pending(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending_voice)
    }

    /// Follow a nick change through the vote ledger and the pending queue.
    ///
    /// Both nicks are folded. Returns true if anything moved.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        if old == new {
            return false;
        }
        let mut moved = false;
        if let Some(vote) = self.motion.votes.remove(old) {
            self.motion.votes.insert(new.to_string(), vote);
            moved = true;
        }
        if self.remove_pending(old) {
            self.enqueue_pending(new.to_string());
            moved = true;
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_words_are_case_insensitive() {
        assert_eq!(Vote::parse("AYE"), Some(Vote::Aye));
        assert_eq!(Vote::parse("Nay"), Some(Vote::Nay));
        assert_eq!(Vote::parse("abstain"), Some(Vote::Abstain));
        assert_eq!(Vote::parse("yes"), None);
    }

    #[test]
    fn rename_moves_vote_and_pending_entry() {
        let mut state = ChannelState::new("#coop", BTreeSet::new());
        state.motion.votes.insert("alice".into(), Vote::Aye);
        state.enqueue_pending("bob".into());
        state.enqueue_pending("alice".into());

        assert!(state.rename("alice", "alicia"));
        assert_eq!(state.motion.votes.get("alicia"), Some(&Vote::Aye));
        assert!(!state.motion.votes.contains_key("alice"));
        assert_eq!(state.pending_voice, vec!["bob".to_string(), "alicia".to_string()]);

        assert!(!state.rename("nobody", "somebody"));
    }

    #[test]
    fn reset_meeting_clears_motion_but_not_roster() {
        let mut state = ChannelState::new(
            "#coop",
            BTreeSet::from([Fingerprint::new("al", "host")]),
        );
        state.meeting.started = true;
        state.meeting.quorum = 4;
        state.motion.text = "Buy a kettle".into();
        state.reset_meeting();

        assert!(!state.meeting.started);
        assert_eq!(state.meeting.quorum, 0);
        assert!(state.motion.text.is_empty());
        assert_eq!(state.recognized.len(), 1);
    }

    #[test]
    fn pending_queue_is_a_set() {
        let mut state = ChannelState::default();
        state.enqueue_pending("dave".into());
        state.enqueue_pending("dave".into());
        assert_eq!(state.take_pending(), vec!["dave".to_string()]);
        assert!(state.pending_voice.is_empty());
    }
}
