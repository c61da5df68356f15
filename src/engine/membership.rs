//! Membership event routing: join, part, quit, nick change, and the
//! channel lifecycle they imply.

use super::Engine;
use crate::error::MotionResult;
use crate::hostmask::Hostmask;
use crate::state::ChannelState;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{Instrument, debug, info, trace};

/// What a join led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// We joined; the channel is now tracked with its roster loaded.
    Tracked,
    /// Someone not on the roster joined.
    Unrecognized,
    /// A recognised user joined and was voiced.
    Voiced,
    /// A recognised user joined mid-motion and was queued for voice.
    Deferred,
}

impl Engine {
    /// Route a JOIN.
    pub async fn on_join(&self, who: &Hostmask, channel: &str) -> MotionResult<JoinOutcome> {
        let span = crate::telemetry::spans::membership("join", &who.nick);
        async move {
            trace!(hostmask = %who, channel = %channel, "JOIN");

            if self.is_self(&who.nick) {
                // Reset in place: callers already queued on this lock must see the fresh state.
                let key = self.mapper.fold(channel);
                let state = Arc::clone(
                    self.channels
                        .entry(key.clone())
                        .or_insert_with(|| Arc::new(Mutex::new(ChannelState::new(channel, BTreeSet::new()))))
                        .value(),
                );
                let mut state = state.lock().await;
                let recognized = self.roster.load(&key).await;
                *state = ChannelState::new(channel, recognized);
                info!(channel = %channel, "Tracking channel");
                return Ok(JoinOutcome::Tracked);
            }

            let (_, state) = self.channel(channel)?;
            let mut state = state.lock().await;

            if !state.recognized.contains(&who.fingerprint()) {
                return Ok(JoinOutcome::Unrecognized);
            }
            if state.motion.started {
                debug!(channel = %state.name, "Motion running, deferring voice");
                state.enqueue_pending(self.mapper.fold(&who.nick));
                return Ok(JoinOutcome::Deferred);
            }
            self.voice(&state.name, &who.nick);
            Ok(JoinOutcome::Voiced)
        }
        .instrument(span)
        .await
    }

    /// Route a PART. Our own part is left to the transport, which calls
    /// [`Engine::leave_channel`] when it means it.
    pub async fn on_part(&self, nick: &str, channel: &str) -> MotionResult<()> {
        trace!(nick = %nick, channel = %channel, "PART");
        if self.is_self(nick) {
            return Ok(());
        }

        let (_, state) = self.channel(channel)?;
        let mut state = state.lock().await;
        if state.remove_pending(&self.mapper.fold(nick)) {
            debug!(nick = %nick, channel = %state.name, "Dropped deferred voice on part");
        }
        Ok(())
    }

    /// Route a QUIT: the nick leaves every channel's voice queue.
    pub async fn on_quit(&self, nick: &str) {
        let span = crate::telemetry::spans::membership("quit", nick);
        async move {
            trace!("QUIT");
            let folded = self.mapper.fold(nick);
            for state in self.all_channels() {
                let mut state = state.lock().await;
                if state.remove_pending(&folded) {
                    debug!(channel = %state.name, "Dropped deferred voice on quit");
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Route a NICK change through every channel's votes and voice queue.
    pub async fn on_rename(&self, old: &str, new: &str) {
        let span = crate::telemetry::spans::membership("nick", old);
        async move {
            trace!(new = %new, "NICK");
            if self.is_self(old) {
                self.set_nick(new);
                debug!(nick = %new, "Own nick changed");
            }

            let (old, new) = (self.mapper.fold(old), self.mapper.fold(new));
            for state in self.all_channels() {
                let mut state = state.lock().await;
                if state.rename(&old, &new) {
                    debug!(channel = %state.name, from = %old, to = %new, "Followed nick change");
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Stop tracking a channel. Returns whether it was tracked.
    pub fn leave_channel(&self, channel: &str) -> bool {
        let removed = self.channels.remove(&self.mapper.fold(channel)).is_some();
        if removed {
            info!(channel = %channel, "No longer tracking channel");
        }
        removed
    }

    /// Return a channel to its freshly joined form, keeping the roster.
    pub async fn reset_channel(&self, channel: &str) -> MotionResult<()> {
        let (_, state) = self.channel(channel)?;
        let mut state = state.lock().await;
        let name = std::mem::take(&mut state.name);
        let recognized = std::mem::take(&mut state.recognized);
        *state = ChannelState::new(name, recognized);
        debug!(channel = %state.name, "Channel state reset");
        Ok(())
    }
}
