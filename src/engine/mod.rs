//! The motion engine.
//!
//! [`Engine`] owns every tracked channel's [`ChannelState`] and exposes the
//! meeting, motion, vote, recognition and membership operations. The
//! command layer calls these with already-parsed arguments; privilege checks
//! happen here.
//!
//! # Concurrency
//!
//! Channels live in a `DashMap` keyed by folded name, each behind its own
//! `tokio::sync::Mutex`. Every operation holds that lock for its whole
//! read-modify-write, including across the WHOIS round trip in
//! [`Engine::recognize`], so a tally always sees one consistent snapshot.
//! Operations on different channels never wait on each other.
//!
//! # Output
//!
//! Notices and voice requests are sent as [`Outbound`] values on the
//! channel returned by [`Engine::new`]. Sends never block.

mod meeting;
mod membership;
mod motion;
mod recognize;
mod vote;

pub use membership::JoinOutcome;

use crate::casemap::CaseMapper;
use crate::config::Config;
use crate::db::{Database, MotionStore, NoOpStore};
use crate::error::{MotionError, MotionResult};
use crate::hostmask::Fingerprint;
use crate::isupport::{Isupport, PrefixSpec};
use crate::permissions::{DEFAULT_PREFIX, PermissionOracle};
use crate::roster::RecognitionRoster;
use crate::state::{ChannelState, MembershipView};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, trace, warn};

/// Something the transport should send or do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// NOTICE to the channel.
    ChannelNotice { channel: String, text: String },
    /// NOTICE to one nick.
    PrivateNotice { nick: String, text: String },
    /// Request `+v nick` in the channel.
    Voice { channel: String, nick: String },
    /// Request `-v nick` in the channel.
    Devoice { channel: String, nick: String },
}

/// Result of resolving a nick on the network (WHOIS).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhoisReply {
    pub success: bool,
    pub username: String,
    pub host: String,
}

impl WhoisReply {
    pub fn found(username: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            success: true,
            username: username.into(),
            host: host.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn fingerprint(&self) -> Option<Fingerprint> {
        self.success
            .then(|| Fingerprint::new(&self.username, &self.host))
    }
}

/// Resolves a nick to the identity behind it.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn whois(&self, nick: &str) -> WhoisReply;
}

/// Collaborators the engine is built from.
pub struct EngineParams<'a> {
    pub config: &'a Config,
    /// Shared with the membership table so both fold identically.
    pub mapper: Arc<CaseMapper>,
    pub membership: Arc<dyn MembershipView>,
    pub resolver: Arc<dyn IdentityResolver>,
    pub store: Arc<dyn MotionStore>,
}

pub struct Engine {
    mapper: Arc<CaseMapper>,
    permissions: PermissionOracle,
    roster: RecognitionRoster,
    resolver: Arc<dyn IdentityResolver>,
    /// Tracked channels, keyed by folded name.
    channels: DashMap<String, Arc<Mutex<ChannelState>>>,
    chantypes: RwLock<String>,
    nick: RwLock<String>,
    outbound: mpsc::UnboundedSender<Outbound>,
}

impl Engine {
    pub fn new(params: EngineParams<'_>) -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let EngineParams {
            config,
            mapper,
            membership,
            resolver,
            store,
        } = params;

        mapper.configure(config.server.casemapping);

        let prefix = PrefixSpec::parse(&config.server.prefix)
            .or_else(|| PrefixSpec::parse(DEFAULT_PREFIX))
            .unwrap_or(PrefixSpec {
                modes: "ov",
                prefixes: "@+",
            });
        let permissions = PermissionOracle::new(
            Arc::clone(&mapper),
            membership,
            config.permissions.admin_markers.clone(),
            config.permissions.voice_mode,
            &prefix,
        );

        let (tx, rx) = mpsc::unbounded_channel();
        let engine = Self {
            mapper,
            permissions,
            roster: RecognitionRoster::new(config.bot.name.clone(), store),
            resolver,
            channels: DashMap::new(),
            chantypes: RwLock::new(config.server.chantypes.clone()),
            nick: RwLock::new(config.bot.nick().to_string()),
            outbound: tx,
        };
        (engine, rx)
    }

    /// Open the configured store, falling back to in-memory operation if
    /// there is none or it can't be opened.
    pub async fn open_store(config: &Config) -> Arc<dyn MotionStore> {
        let Some(db) = config.database.as_ref() else {
            info!("No database configured, recognised rosters are in-memory only");
            return Arc::new(NoOpStore);
        };
        match Database::new(&db.path).await {
            Ok(database) => Arc::new(database),
            Err(e) => {
                warn!(path = %db.path, error = %e, "Failed to open database, continuing without persistence");
                Arc::new(NoOpStore)
            }
        }
    }

    // ------------------------------------------------------------------
    // Server announcements and identity
    // ------------------------------------------------------------------

    /// Apply an `RPL_ISUPPORT` announcement.
    ///
    /// Rebuilds the casefold table and the rank table whenever the
    /// announcement carries `CASEMAPPING` or `PREFIX`.
    pub fn announce(&self, isupport: &Isupport<'_>) {
        if let Some(value) = isupport.casemapping() {
            match value.parse() {
                Ok(mapping) => {
                    self.mapper.configure(mapping);
                    debug!(casemapping = %mapping, "Casefold table rebuilt");
                }
                Err(e) => warn!(error = %e, "Keeping previous casemapping"),
            }
        }
        if let Some(prefix) = isupport.prefix() {
            self.permissions.configure(&prefix);
        }
        if let Some(chantypes) = isupport.chantypes()
            && !chantypes.is_empty()
        {
            *self.chantypes.write() = chantypes.to_string();
        }
    }

    /// Our current nickname.
    pub fn nick(&self) -> String {
        self.nick.read().clone()
    }

    pub fn set_nick(&self, nick: impl Into<String>) {
        *self.nick.write() = nick.into();
    }

    pub fn mapper(&self) -> &Arc<CaseMapper> {
        &self.mapper
    }

    pub fn permissions(&self) -> &PermissionOracle {
        &self.permissions
    }

    fn is_self(&self, nick: &str) -> bool {
        self.mapper.irc_eq(nick, &self.nick.read())
    }

    /// Whether `target` names a channel rather than a nick.
    pub fn is_channel_name(&self, target: &str) -> bool {
        target
            .chars()
            .next()
            .is_some_and(|c| self.chantypes.read().contains(c))
    }

    // ------------------------------------------------------------------
    // Channel access
    // ------------------------------------------------------------------

    /// Folded names of every tracked channel.
    pub fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// A copy of a channel's current state.
    pub async fn snapshot(&self, channel: &str) -> Option<ChannelState> {
        let (_, state) = self.channel(channel).ok()?;
        let state = state.lock().await;
        Some(state.clone())
    }

    /// Look up a tracked channel. Private targets and untracked channels
    /// are both `UnknownChannel`.
    fn channel(&self, target: &str) -> MotionResult<(String, Arc<Mutex<ChannelState>>)> {
        if !self.is_channel_name(target) {
            return Err(MotionError::UnknownChannel(target.to_string()));
        }
        let key = self.mapper.fold(target);
        let state = self
            .channels
            .get(&key)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| MotionError::UnknownChannel(target.to_string()))?;
        Ok((key, state))
    }

    /// Every tracked channel's lock, cloned out so no map guard is held
    /// across an await.
    fn all_channels(&self) -> Vec<Arc<Mutex<ChannelState>>> {
        self.channels
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    fn require_admin(&self, actor: &str, channel: &str) -> MotionResult<()> {
        if self.permissions.is_admin(actor, channel) {
            Ok(())
        } else {
            Err(MotionError::PermissionDenied)
        }
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    fn emit(&self, out: Outbound) {
        if self.outbound.send(out).is_err() {
            trace!("Outbound receiver dropped");
        }
    }

    fn notice(&self, channel: &str, text: impl Into<String>) {
        self.emit(Outbound::ChannelNotice {
            channel: channel.to_string(),
            text: text.into(),
        });
    }

    fn private_notice(&self, nick: &str, text: impl Into<String>) {
        self.emit(Outbound::PrivateNotice {
            nick: nick.to_string(),
            text: text.into(),
        });
    }

    fn voice(&self, channel: &str, nick: &str) {
        self.emit(Outbound::Voice {
            channel: channel.to_string(),
            nick: nick.to_string(),
        });
    }

    /// Announce `err` (if it has a notice) and return it.
    fn fail<T>(&self, channel: &str, err: MotionError) -> MotionResult<T> {
        debug!(channel = %channel, error_code = err.error_code(), "Operation failed");
        if let Some(text) = err.notice() {
            self.notice(channel, text);
        }
        Err(err)
    }

    /// Voice everyone queued while the motion ran, then clear the queue.
    fn release_pending(&self, state: &mut ChannelState) {
        for nick in state.take_pending() {
            debug!(channel = %state.name, nick = %nick, "Releasing deferred voice");
            self.voice(&state.name, &nick);
        }
    }
}

/// Parse a non-negative integer argument, at most `u32::MAX`.
fn parse_count(field: &'static str, raw: &str) -> MotionResult<u64> {
    raw.trim()
        .parse::<u32>()
        .map(u64::from)
        .map_err(|_| MotionError::invalid(field, raw))
}
