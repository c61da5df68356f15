//! A WHOIS resolver answering from a fixed table.

use async_trait::async_trait;
use parking_lot::Mutex;
use slirc_motions::{IdentityResolver, WhoisReply};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Default)]
pub struct StaticResolver {
    known: Mutex<HashMap<String, (String, String)>>,
    lookups: Mutex<Vec<String>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

#[allow(dead_code)]
impl StaticResolver {
    pub fn insert(&self, nick: &str, user: &str, host: &str) {
        self.known
            .lock()
            .insert(nick.to_ascii_lowercase(), (user.to_string(), host.to_string()));
    }

    /// Make every later lookup wait for a permit on the returned gate.
    pub fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    /// Nicks looked up so far, in order.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().clone()
    }
}

#[async_trait]
impl IdentityResolver for StaticResolver {
    async fn whois(&self, nick: &str) -> WhoisReply {
        self.lookups.lock().push(nick.to_string());
        // Yield so the lookup really suspends like a network round trip.
        tokio::task::yield_now().await;
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        match self.known.lock().get(&nick.to_ascii_lowercase()) {
            Some((user, host)) => WhoisReply::found(user.clone(), host.clone()),
            None => WhoisReply::not_found(),
        }
    }
}
