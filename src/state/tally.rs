//! Motion tally.
//!
//! Counts the recorded votes of members still present, adds the external
//! counts, and decides the result against the meeting quorum:
//!
//! 1. `total < quorum` lapses for want of quorum;
//! 2. otherwise a strictly positive aye-minus-nay margin carries;
//! 3. anything else lapses.
//!
//! Percentage in favour is `ayes / (ayes + nays) * 100`, reported as 0.00
//! when nobody voted either way.

use super::channel::{Motion, Vote};
use serde::Serialize;

/// How a motion ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    QuorumNotMet,
    Carried,
    Lapsed,
}

/// A counted motion, ready to announce.
#[derive(Debug, Clone, PartialEq)]
pub struct Tally {
    /// Folded nicks, in key order.
    pub ayes: Vec<String>,
    pub nays: Vec<String>,
    pub abstains: Vec<String>,
    pub external_ayes: u64,
    pub external_nays: u64,
    pub quorum: u64,
    pub outcome: Outcome,
}

impl Tally {
    /// Count `motion`'s ledger, skipping voters for whom `present` is false.
    ///
    /// Skipped votes stay in the ledger; they are only left out of this count.
    pub fn count(motion: &Motion, quorum: u64, present: impl Fn(&str) -> bool) -> Self {
        let mut tally = Self {
            ayes: Vec::new(),
            nays: Vec::new(),
            abstains: Vec::new(),
            external_ayes: motion.external_ayes,
            external_nays: motion.external_nays,
            quorum,
            outcome: Outcome::Lapsed,
        };

        for (nick, vote) in &motion.votes {
            if !present(nick) {
                continue;
            }
            match vote {
                Vote::Aye => tally.ayes.push(nick.clone()),
                Vote::Nay => tally.nays.push(nick.clone()),
                Vote::Abstain => tally.abstains.push(nick.clone()),
            }
        }

        tally.outcome = if tally.total() < quorum {
            Outcome::QuorumNotMet
        } else if tally.aye_count() > tally.nay_count() {
            Outcome::Carried
        } else {
            Outcome::Lapsed
        };
        tally
    }

    pub fn aye_count(&self) -> u64 {
        (self.ayes.len() as u64).saturating_add(self.external_ayes)
    }

    pub fn nay_count(&self) -> u64 {
        (self.nays.len() as u64).saturating_add(self.external_nays)
    }

    pub fn abstain_count(&self) -> u64 {
        self.abstains.len() as u64
    }

    pub fn total(&self) -> u64 {
        self.aye_count()
            .saturating_add(self.nay_count())
            .saturating_add(self.abstain_count())
    }

    /// Percentage of ayes among ayes and nays; 0 when both are zero.
    pub fn in_favour(&self) -> f64 {
        let decided = self.aye_count().saturating_add(self.nay_count());
        if decided == 0 {
            return 0.0;
        }
        self.aye_count() as f64 / decided as f64 * 100.0
    }

    pub fn carried(&self) -> bool {
        self.outcome == Outcome::Carried
    }

    /// The announcement lines, in order.
    pub fn report(&self) -> Vec<String> {
        let mut lines = vec![
            "*** Votes".to_string(),
            format!(
                "Ayes: {}; Nays: {}; Abstains: {}",
                list_or_none(&self.ayes),
                list_or_none(&self.nays),
                list_or_none(&self.abstains),
            ),
        ];

        if self.external_ayes > 0 || self.external_nays > 0 {
            lines.push(format!(
                "[+] External ayes: {}; External nays: {}",
                self.external_ayes, self.external_nays
            ));
        }

        lines.push("*** Tally".to_string());
        lines.push(format!(
            "Ayes: {}; Nays: {}; Abstains: {}; TOTAL: {}",
            self.aye_count(),
            self.nay_count(),
            self.abstain_count(),
            self.total()
        ));
        lines.push(self.result_line());
        lines
    }

    pub fn result_line(&self) -> String {
        match self.outcome {
            Outcome::QuorumNotMet => format!(
                "*** Result: Motion lapses. Quorum of {} not met.",
                self.quorum
            ),
            Outcome::Carried => format!(
                "*** Result: Motion carries. {:.2}% in favour.",
                self.in_favour()
            ),
            Outcome::Lapsed => format!(
                "*** Result: Motion lapses. {:.2}% in favour.",
                self.in_favour()
            ),
        }
    }
}

fn list_or_none(nicks: &[String]) -> String {
    if nicks.is_empty() {
        "none".to_string()
    } else {
        nicks.join(", ")
    }
}
