//! ISUPPORT (RPL_ISUPPORT / 005) parsing.
//!
//! Only the tokens the motion engine reacts to get accessors here:
//! `CASEMAPPING`, `PREFIX` and `CHANTYPES`. Servers may send 005 several
//! times (and again after a rehash), so every parsed announcement is applied
//! as it arrives.
//!
//! # Reference
//! - Modern IRC documentation: <https://modern.ircdocs.horse/isupport.html>

/// A single ISUPPORT key-value entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IsupportEntry<'a> {
    /// The token key (e.g., `PREFIX`).
    pub key: &'a str,
    /// The optional value (e.g., `(ov)@+`).
    pub value: Option<&'a str>,
}

/// Parsed ISUPPORT tokens from one `RPL_ISUPPORT` line.
///
/// # Example
///
/// ```
/// use slirc_motions::isupport::parse_params;
///
/// let isupport = parse_params(&["CASEMAPPING=ascii", "PREFIX=(qaohv)~&@%+"]);
/// assert_eq!(isupport.casemapping(), Some("ascii"));
/// assert_eq!(isupport.prefix().unwrap().prefixes, "~&@%+");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Isupport<'a> {
    entries: Vec<IsupportEntry<'a>>,
}

impl<'a> Isupport<'a> {
    /// Get the value for a key.
    ///
    /// Returns `Some(Some(value))` if the key has a value, `Some(None)` for a
    /// bare key, and `None` if the key is absent. The last occurrence wins.
    pub fn get(&self, key: &str) -> Option<Option<&'a str>> {
        self.entries
            .iter()
            .rfind(|e| e.key.eq_ignore_ascii_case(key))
            .map(|e| e.value)
    }

    /// The `CASEMAPPING` value (e.g., `rfc1459`).
    pub fn casemapping(&self) -> Option<&'a str> {
        self.get("CASEMAPPING").flatten()
    }

    /// The `CHANTYPES` value (e.g., `#&`).
    pub fn chantypes(&self) -> Option<&'a str> {
        self.get("CHANTYPES").flatten()
    }

    /// The parsed `PREFIX` token.
    pub fn prefix(&self) -> Option<PrefixSpec<'a>> {
        self.get("PREFIX").flatten().and_then(PrefixSpec::parse)
    }
}

/// Parse ISUPPORT tokens from a slice of parameters.
///
/// Tokens are `KEY` or `KEY=VALUE`; parsing stops at a `:`-prefixed
/// trailing parameter. Negated tokens (`-KEY`) are skipped.
pub fn parse_params<'a>(params: &[&'a str]) -> Isupport<'a> {
    let mut entries = Vec::with_capacity(params.len());
    for &p in params {
        if p.starts_with(':') {
            break;
        }
        if p.is_empty() || p.starts_with('-') {
            continue;
        }
        let (key, value) = match p.split_once('=') {
            Some((k, v)) => (k, Some(v)),
            None => (p, None),
        };
        entries.push(IsupportEntry { key, value });
    }
    Isupport { entries }
}

/// Parsed `PREFIX` token.
///
/// Maps channel membership modes (`o`, `v`) to their prefix symbols (`@`,
/// `+`). Both strings are ordered from the highest rank down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrefixSpec<'a> {
    /// Mode characters (e.g., `ov`).
    pub modes: &'a str,
    /// Prefix symbols (e.g., `@+`).
    pub prefixes: &'a str,
}

impl<'a> PrefixSpec<'a> {
    /// Parse a `PREFIX` value like `(ov)@+`.
    ///
    /// A value without the parenthesised mode list is accepted and yields
    /// empty `modes`.
    pub fn parse(s: &'a str) -> Option<Self> {
        if let Some(open) = s.find('(') {
            let close = open + 1 + s[open + 1..].find(')')?;
            let modes = &s[open + 1..close];
            let prefixes = &s[close + 1..];
            if !modes.is_empty() && !prefixes.is_empty() {
                return Some(PrefixSpec { modes, prefixes });
            }
        } else if !s.is_empty() {
            return Some(PrefixSpec {
                modes: "",
                prefixes: s,
            });
        }
        None
    }

    /// The prefix symbol for a mode character (`o` → `@`).
    #[inline]
    pub fn prefix_for_mode(&self, mode: char) -> Option<char> {
        self.modes
            .chars()
            .position(|c| c == mode)
            .and_then(|i| self.prefixes.chars().nth(i))
    }
}
