//! Recognition roster.
//!
//! A channel's roster is the set of fingerprints (`user!host`) whose owners
//! get voice when they join. The in-memory set inside
//! [`ChannelState`](crate::state::ChannelState) is authoritative; the store
//! only mirrors it. Store failures are logged and otherwise ignored, so the
//! roster keeps working with no database at all.

use crate::db::MotionStore;
use crate::hostmask::Fingerprint;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct RecognitionRoster {
    bot: String,
    store: Arc<dyn MotionStore>,
}

impl RecognitionRoster {
    /// `bot` namespaces this bot's records in a shared store.
    pub fn new(bot: impl Into<String>, store: Arc<dyn MotionStore>) -> Self {
        Self {
            bot: bot.into(),
            store,
        }
    }

    pub fn bot(&self) -> &str {
        &self.bot
    }

    pub fn store(&self) -> &Arc<dyn MotionStore> {
        &self.store
    }

    /// Load the roster for a (folded) channel name, creating an empty
    /// record if none exists.
    pub async fn load(&self, channel: &str) -> BTreeSet<Fingerprint> {
        match self.store.load_roster(&self.bot, channel).await {
            Ok(Some(fingerprints)) => {
                debug!(channel = %channel, count = fingerprints.len(), "Loaded recognised roster");
                fingerprints.into_iter().collect()
            }
            Ok(None) => {
                if let Err(e) = self.store.create_roster(&self.bot, channel).await {
                    warn!(channel = %channel, error = %e, "Failed to create roster record");
                }
                BTreeSet::new()
            }
            Err(e) => {
                warn!(channel = %channel, error = %e, "Failed to load roster, starting empty");
                BTreeSet::new()
            }
        }
    }

    /// Add a fingerprint. Returns false (and writes nothing) if it was
    /// already recognised.
    pub async fn recognize(
        &self,
        channel: &str,
        recognized: &mut BTreeSet<Fingerprint>,
        fingerprint: Fingerprint,
    ) -> bool {
        if recognized.contains(&fingerprint) {
            return false;
        }
        if let Err(e) = self
            .store
            .add_fingerprint(&self.bot, channel, &fingerprint)
            .await
        {
            warn!(channel = %channel, fingerprint = %fingerprint, error = %e, "Failed to persist recognition");
        }
        debug!(channel = %channel, fingerprint = %fingerprint, "Recognised");
        recognized.insert(fingerprint);
        true
    }

    /// Remove a fingerprint. Returns whether it was present.
    pub async fn forget(
        &self,
        channel: &str,
        recognized: &mut BTreeSet<Fingerprint>,
        fingerprint: &Fingerprint,
    ) -> bool {
        if !recognized.remove(fingerprint) {
            return false;
        }
        if let Err(e) = self
            .store
            .remove_fingerprint(&self.bot, channel, fingerprint)
            .await
        {
            warn!(channel = %channel, fingerprint = %fingerprint, error = %e, "Failed to persist removal");
        }
        debug!(channel = %channel, fingerprint = %fingerprint, "Forgot recognition");
        true
    }
}
