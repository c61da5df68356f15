//! Adding and removing recognised users.
//!
//! Both commands resolve the nick through the [`IdentityResolver`] while
//! the channel lock is held, so nothing else can touch the channel until
//! the roster write has been applied. A failed lookup changes nothing.
//!
//! [`IdentityResolver`]: super::IdentityResolver

use super::{Engine, Outbound};
use crate::error::{MotionError, MotionResult, RosterChange};
use tracing::{Instrument, debug, info};

impl Engine {
    /// Recognise `nick`, voicing them if they have no rank yet. Nothing is
    /// sent unless the lookup succeeds.
    ///
    /// Returns whether the fingerprint was newly added.
    pub async fn recognize(&self, actor: &str, channel: &str, nick: &str) -> MotionResult<bool> {
        let span = crate::telemetry::spans::operation("recognize", channel, actor);
        async move {
            let (key, state) = self.channel(channel)?;
            let mut state = state.lock().await;
            self.require_admin(actor, channel)?;

            let reply = self.resolver.whois(nick).await;
            let Some(fingerprint) = reply.fingerprint() else {
                return self.fail(
                    &state.name,
                    MotionError::LookupFailed {
                        nick: nick.to_string(),
                        change: RosterChange::Add,
                    },
                );
            };

            if !self.permissions.can_vote(nick, channel) {
                if self.permissions.is_admin(&self.nick(), channel) {
                    self.voice(&state.name, nick);
                } else {
                    self.notice(&state.name, "*** I am not opped and cannot voice user.");
                }
            }

            let added = self
                .roster
                .recognize(&key, &mut state.recognized, fingerprint)
                .await;
            if added {
                info!(nick = %nick, "User recognised");
            }
            Ok(added)
        }
        .instrument(span)
        .await
    }

    /// Stop recognising `nick`: drop their fingerprint, devoice them and
    /// cancel any deferred voice grant.
    ///
    /// Returns whether the fingerprint had been recognised.
    pub async fn forget(&self, actor: &str, channel: &str, nick: &str) -> MotionResult<bool> {
        let span = crate::telemetry::spans::operation("forget", channel, actor);
        async move {
            let (key, state) = self.channel(channel)?;
            let mut state = state.lock().await;
            self.require_admin(actor, channel)?;

            let reply = self.resolver.whois(nick).await;
            let Some(fingerprint) = reply.fingerprint() else {
                return self.fail(
                    &state.name,
                    MotionError::LookupFailed {
                        nick: nick.to_string(),
                        change: RosterChange::Remove,
                    },
                );
            };

            let removed = self
                .roster
                .forget(&key, &mut state.recognized, &fingerprint)
                .await;
            if state.remove_pending(&self.mapper.fold(nick)) {
                debug!(nick = %nick, "Dropped deferred voice");
            }
            if self.permissions.is_voice(nick, channel) {
                self.emit(Outbound::Devoice {
                    channel: state.name.clone(),
                    nick: nick.to_string(),
                });
            }
            if removed {
                info!(nick = %nick, "User no longer recognised");
            }
            Ok(removed)
        }
        .instrument(span)
        .await
    }
}
