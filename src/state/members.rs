//! Channel membership snapshot.
//!
//! The transport keeps this current from JOIN/PART/QUIT/NICK/MODE and NAMES
//! replies; the engine only reads it, through [`MembershipView`].

use crate::casemap::CaseMapper;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Read access to who is in a channel and which prefixes they hold.
///
/// Channel and nick arguments are already case-folded. Unknown channels
/// answer `false` to everything.
pub trait MembershipView: Send + Sync {
    fn is_member(&self, channel: &str, nick: &str) -> bool;

    fn has_prefix(&self, channel: &str, nick: &str, prefix: char) -> bool;
}

#[derive(Debug, Clone, Default)]
struct Member {
    nick: String,
    prefixes: Vec<char>,
}

/// A concurrent membership table, keyed by folded channel then folded nick.
pub struct MemberTable {
    mapper: Arc<CaseMapper>,
    channels: DashMap<String, HashMap<String, Member>>,
}

impl MemberTable {
    pub fn new(mapper: Arc<CaseMapper>) -> Self {
        Self {
            mapper,
            channels: DashMap::new(),
        }
    }

    /// Add (or refresh) a member with the prefixes from a NAMES entry or a
    /// JOIN (`""`).
    pub fn add_member(&self, channel: &str, nick: &str, prefixes: &str) {
        let table = self.mapper.table();
        self.channels
            .entry(table.fold(channel))
            .or_default()
            .insert(
                table.fold(nick),
                Member {
                    nick: nick.to_string(),
                    prefixes: prefixes.chars().collect(),
                },
            );
    }

    pub fn remove_member(&self, channel: &str, nick: &str) -> bool {
        let table = self.mapper.table();
        self.channels
            .get_mut(&table.fold(channel))
            .is_some_and(|mut members| members.remove(&table.fold(nick)).is_some())
    }

    /// Drop a nick from every channel (QUIT).
    pub fn remove_everywhere(&self, nick: &str) {
        let folded = self.mapper.fold(nick);
        for mut members in self.channels.iter_mut() {
            members.remove(&folded);
        }
    }

    /// Move a member to a new nick in every channel, keeping their prefixes.
    pub fn rename(&self, old: &str, new: &str) {
        let table = self.mapper.table();
        let (old_key, new_key) = (table.fold(old), table.fold(new));
        for mut members in self.channels.iter_mut() {
            if let Some(mut member) = members.remove(&old_key) {
                member.nick = new.to_string();
                members.insert(new_key.clone(), member);
            }
        }
    }

    /// Apply a `+x`/`-x` prefix mode change to a member.
    pub fn set_prefix(&self, channel: &str, nick: &str, prefix: char, on: bool) {
        let table = self.mapper.table();
        if let Some(mut members) = self.channels.get_mut(&table.fold(channel))
            && let Some(member) = members.get_mut(&table.fold(nick))
        {
            member.prefixes.retain(|&p| p != prefix);
            if on {
                member.prefixes.push(prefix);
            }
        }
    }

    /// Forget a channel entirely (we left it).
    pub fn clear_channel(&self, channel: &str) {
        self.channels.remove(&self.mapper.fold(channel));
    }

    /// Display nicks currently in a channel, sorted.
    pub fn members(&self, channel: &str) -> Vec<String> {
        let mut nicks: Vec<String> = self
            .channels
            .get(&self.mapper.fold(channel))
            .map(|members| members.values().map(|m| m.nick.clone()).collect())
            .unwrap_or_default();
        nicks.sort();
        nicks
    }
}

impl MembershipView for MemberTable {
    fn is_member(&self, channel: &str, nick: &str) -> bool {
        self.channels
            .get(channel)
            .is_some_and(|members| members.contains_key(nick))
    }

    fn has_prefix(&self, channel: &str, nick: &str, prefix: char) -> bool {
        self.channels
            .get(channel)
            .and_then(|members| members.get(nick).map(|m| m.prefixes.contains(&prefix)))
            .unwrap_or(false)
    }
}
