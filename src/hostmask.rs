//! `nick!user@host` masks and the durable fingerprints derived from them.

use std::fmt;

/// A parsed `nick!user@host` source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hostmask {
    pub nick: String,
    pub user: String,
    pub host: String,
}

impl Hostmask {
    pub fn new(nick: impl Into<String>, user: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            user: user.into(),
            host: host.into(),
        }
    }

    /// Parse `nick!user@host`, with or without a leading `:`.
    ///
    /// Returns `None` unless all three parts are present and non-empty.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.strip_prefix(':').unwrap_or(s);
        let (nick, rest) = s.split_once('!')?;
        let (user, host) = rest.split_once('@')?;
        if nick.is_empty() || user.is_empty() || host.is_empty() {
            return None;
        }
        Some(Self::new(nick, user, host))
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::new(&self.user, &self.host)
    }
}

impl fmt::Display for Hostmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}@{}", self.nick, self.user, self.host)
    }
}

/// A participant's durable identity: `username!host`.
///
/// Survives nickname changes, which is why the recognition roster stores
/// these rather than nicks.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(user: &str, host: &str) -> Self {
        Self(format!("{user}!{host}"))
    }

    /// Wrap a fingerprint read back from storage.
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
