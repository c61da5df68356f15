//! Channel privilege checks.
//!
//! Whether someone may run meeting commands or cast a vote depends on the
//! membership prefixes they hold in the channel (`@`, `%`, `+`, ...). The
//! ordering of those prefixes comes from the server's `PREFIX` token, so
//! the rank table is rebuilt on every announcement and cached between them.

use crate::casemap::CaseMapper;
use crate::isupport::PrefixSpec;
use crate::state::MembershipView;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// `PREFIX` assumed until the server announces one.
pub const DEFAULT_PREFIX: &str = "(ov)@+";

/// Prefix ranks ordered from highest to lowest, with the admin threshold
/// already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankTable {
    ranks: Vec<char>,
    admin_depth: usize,
    voice: Option<char>,
}

impl RankTable {
    /// Build the table for an announced `PREFIX`.
    ///
    /// The admin threshold is the first of `admin_markers` present in the
    /// ranks; every rank from the top down to it is admin-equivalent. With
    /// no marker present only the top rank is.
    pub fn compute(spec: &PrefixSpec<'_>, admin_markers: &[char], voice_mode: char) -> Self {
        let ranks: Vec<char> = spec.prefixes.chars().collect();

        let admin_depth = admin_markers
            .iter()
            .find_map(|marker| ranks.iter().position(|r| r == marker))
            .map(|idx| idx + 1)
            .unwrap_or(ranks.len().min(1));

        let voice = spec
            .prefix_for_mode(voice_mode)
            .or_else(|| ranks.contains(&'+').then_some('+'));

        Self {
            ranks,
            admin_depth,
            voice,
        }
    }

    /// All ranks, highest first.
    pub fn ranks(&self) -> &[char] {
        &self.ranks
    }

    /// The admin-equivalent ranks, highest first.
    pub fn admin_prefixes(&self) -> &[char] {
        &self.ranks[..self.admin_depth]
    }

    pub fn voice_prefix(&self) -> Option<char> {
        self.voice
    }
}

/// Answers "is this nick an admin / voiced in this channel?" from the
/// transport's membership snapshot.
pub struct PermissionOracle {
    mapper: Arc<CaseMapper>,
    membership: Arc<dyn MembershipView>,
    ranks: RwLock<Arc<RankTable>>,
    admin_markers: Vec<char>,
    voice_mode: char,
}

impl PermissionOracle {
    pub fn new(
        mapper: Arc<CaseMapper>,
        membership: Arc<dyn MembershipView>,
        admin_markers: Vec<char>,
        voice_mode: char,
        prefix: &PrefixSpec<'_>,
    ) -> Self {
        let ranks = RankTable::compute(prefix, &admin_markers, voice_mode);
        Self {
            mapper,
            membership,
            ranks: RwLock::new(Arc::new(ranks)),
            admin_markers,
            voice_mode,
        }
    }

    /// Recompute the rank table from a (re)announced `PREFIX`.
    pub fn configure(&self, prefix: &PrefixSpec<'_>) {
        let table = RankTable::compute(prefix, &self.admin_markers, self.voice_mode);
        debug!(
            ranks = %table.ranks.iter().collect::<String>(),
            admin = %table.admin_prefixes().iter().collect::<String>(),
            "Rank table recomputed"
        );
        *self.ranks.write() = Arc::new(table);
    }

    /// Snapshot of the cached rank table.
    pub fn ranks(&self) -> Arc<RankTable> {
        Arc::clone(&self.ranks.read())
    }

    /// Holds any rank at or above the admin threshold.
    pub fn is_admin(&self, nick: &str, channel: &str) -> bool {
        let table = self.mapper.table();
        let (nick, channel) = (table.fold(nick), table.fold(channel));
        self.ranks()
            .admin_prefixes()
            .iter()
            .any(|&p| self.membership.has_prefix(&channel, &nick, p))
    }

    /// Holds the voice rank.
    pub fn is_voice(&self, nick: &str, channel: &str) -> bool {
        let Some(voice) = self.ranks().voice_prefix() else {
            return false;
        };
        let table = self.mapper.table();
        self.membership
            .has_prefix(&table.fold(channel), &table.fold(nick), voice)
    }

    /// Voice- or admin-equivalent: entitled to have a vote counted.
    pub fn can_vote(&self, nick: &str, channel: &str) -> bool {
        self.is_voice(nick, channel) || self.is_admin(nick, channel)
    }

    pub fn is_member(&self, nick: &str, channel: &str) -> bool {
        let table = self.mapper.table();
        self.membership
            .is_member(&table.fold(channel), &table.fold(nick))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::casemap::Casemapping;
    use crate::state::MemberTable;

    fn spec(s: &str) -> PrefixSpec<'_> {
        PrefixSpec::parse(s).unwrap()
    }

    #[test]
    fn halfop_is_threshold_when_present() {
        let table = RankTable::compute(&spec("(qaohv)~&@%+"), &['%', '@'], 'v');
        assert_eq!(table.admin_prefixes(), &['~', '&', '@', '%']);
        assert_eq!(table.voice_prefix(), Some('+'));
    }

    #[test]
    fn op_is_threshold_without_halfop() {
        let table = RankTable::compute(&spec("(ov)@+"), &['%', '@'], 'v');
        assert_eq!(table.admin_prefixes(), &['@']);
    }

    #[test]
    fn missing_markers_fall_back_to_top_rank() {
        let table = RankTable::compute(&spec("(yv)!+"), &['%', '@'], 'v');
        assert_eq!(table.admin_prefixes(), &['!']);
    }

    #[test]
    fn bare_prefix_still_finds_voice() {
        let table = RankTable::compute(&spec("@+"), &['@'], 'v');
        assert_eq!(table.voice_prefix(), Some('+'));
    }

    #[test]
    fn oracle_follows_reannounced_prefix() {
        let mapper = Arc::new(CaseMapper::new(Casemapping::Rfc1459));
        let members = Arc::new(MemberTable::new(Arc::clone(&mapper)));
        members.add_member("#Coop", "Helper", "%");
        members.add_member("#Coop", "Voter[1]", "+");

        let oracle = PermissionOracle::new(
            Arc::clone(&mapper),
            members.clone(),
            vec!['%', '@'],
            'v',
            &spec("(ov)@+"),
        );
        assert!(!oracle.is_admin("helper", "#coop"));

        oracle.configure(&spec("(ohv)@%+"));
        assert!(oracle.is_admin("HELPER", "#COOP"));
        assert!(oracle.is_voice("voter{1}", "#coop"));
        assert!(oracle.can_vote("Voter[1]", "#coop"));
        assert!(!oracle.is_admin("Voter[1]", "#coop"));
    }

    #[test]
    fn unknown_channel_is_unprivileged() {
        let mapper = Arc::new(CaseMapper::default());
        let members = Arc::new(MemberTable::new(Arc::clone(&mapper)));
        let oracle = PermissionOracle::new(mapper, members, vec!['@'], 'v', &spec(DEFAULT_PREFIX));
        assert!(!oracle.is_admin("nobody", "#nowhere"));
        assert!(!oracle.is_voice("nobody", "#nowhere"));
    }
}
