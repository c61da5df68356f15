//! IRC case-mapping.
//!
//! IRC compares nicknames and channel names case-insensitively, but what
//! "case" means is up to the server: the `CASEMAPPING` ISUPPORT token picks
//! one of the rules below. Under `rfc1459` the characters `[]\^` are the
//! upper-case forms of `{}|~`; `rfc1459-strict` leaves `^`/`~` alone; `ascii`
//! only folds `A-Z`.
//!
//! Every identity comparison in this crate goes through a [`CaseMapper`],
//! which holds the table for the currently announced rule and can be
//! reconfigured at any time.

use parking_lot::RwLock;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Case-mapping rules a server can announce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Casemapping {
    /// Only `A-Z` fold to `a-z`.
    Ascii,
    /// `A-Z` plus `[]\^` folding to `{}|~`.
    #[default]
    Rfc1459,
    /// `A-Z` plus `[]\` folding to `{}|`.
    Rfc1459Strict,
}

/// Returned when a server announces a casemapping we don't implement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown casemapping: {0}")]
pub struct UnknownCasemapping(pub String);

impl Casemapping {
    /// The value as it appears in `CASEMAPPING=<value>`.
    pub fn as_isupport_value(self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Rfc1459 => "rfc1459",
            Self::Rfc1459Strict => "rfc1459-strict",
        }
    }

    /// The non-alphabetic upper-case characters this rule folds.
    ///
    /// Each one folds to the character 32 code points above it.
    fn extra_upper(self) -> &'static [u8] {
        match self {
            Self::Ascii => b"",
            Self::Rfc1459 => b"[\\]^",
            Self::Rfc1459Strict => b"[\\]",
        }
    }
}

impl FromStr for Casemapping {
    type Err = UnknownCasemapping;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ascii" => Ok(Self::Ascii),
            "rfc1459" => Ok(Self::Rfc1459),
            "rfc1459-strict" => Ok(Self::Rfc1459Strict),
            _ => Err(UnknownCasemapping(s.to_string())),
        }
    }
}

impl fmt::Display for Casemapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_isupport_value())
    }
}

/// An immutable translation table for one casemapping rule.
///
/// Only ASCII code points are ever translated; everything else passes
/// through unchanged.
#[derive(Clone, PartialEq, Eq)]
pub struct CaseFoldTable {
    mapping: Casemapping,
    lower: [u8; 128],
}

impl CaseFoldTable {
    /// Build the table for `mapping`.
    pub fn new(mapping: Casemapping) -> Self {
        let mut lower = [0u8; 128];
        for (i, slot) in lower.iter_mut().enumerate() {
            *slot = i as u8;
        }
        for c in b'A'..=b'Z' {
            lower[c as usize] = c + 32;
        }
        for &c in mapping.extra_upper() {
            lower[c as usize] = c + 32;
        }
        Self { mapping, lower }
    }

    /// The rule this table implements.
    pub fn mapping(&self) -> Casemapping {
        self.mapping
    }

    /// Fold a single character.
    #[inline]
    pub fn fold_char(&self, c: char) -> char {
        if c.is_ascii() {
            self.lower[c as usize] as char
        } else {
            c
        }
    }

    /// Fold a string to its canonical comparison form.
    pub fn fold(&self, s: &str) -> String {
        s.chars().map(|c| self.fold_char(c)).collect()
    }

    /// Compare two strings under this table.
    pub fn irc_eq(&self, a: &str, b: &str) -> bool {
        a.len() == b.len()
            && a.chars()
                .zip(b.chars())
                .all(|(ca, cb)| self.fold_char(ca) == self.fold_char(cb))
    }
}

impl fmt::Debug for CaseFoldTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaseFoldTable")
            .field("mapping", &self.mapping)
            .finish()
    }
}

impl Default for CaseFoldTable {
    fn default() -> Self {
        Self::new(Casemapping::default())
    }
}

/// The active case-fold table, swappable when the server re-announces
/// `CASEMAPPING`.
///
/// Folds take a snapshot of the current table, so a fold running during
/// [`configure`](Self::configure) sees either the old table or the new one.
#[derive(Debug, Default)]
pub struct CaseMapper {
    table: RwLock<Arc<CaseFoldTable>>,
}

impl CaseMapper {
    pub fn new(mapping: Casemapping) -> Self {
        Self {
            table: RwLock::new(Arc::new(CaseFoldTable::new(mapping))),
        }
    }

    /// Replace the active table. Rebuilding with the same rule is harmless.
    pub fn configure(&self, mapping: Casemapping) {
        let table = Arc::new(CaseFoldTable::new(mapping));
        *self.table.write() = table;
    }

    /// Snapshot of the active table.
    pub fn table(&self) -> Arc<CaseFoldTable> {
        Arc::clone(&self.table.read())
    }

    pub fn mapping(&self) -> Casemapping {
        self.table.read().mapping()
    }

    pub fn fold(&self, s: &str) -> String {
        self.table().fold(s)
    }

    pub fn irc_eq(&self, a: &str, b: &str) -> bool {
        self.table().irc_eq(a, b)
    }
}
