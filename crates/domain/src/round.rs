//! One full night+day cycle and its resolution rules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::belief::BeliefReport;

/// Timeline of a single round.
///
/// `players` is the alive list: snapshotted at round start and mutated only
/// by removal as the night and day resolutions land. The optional outcome
/// fields are each set at most once per round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Round {
    /// Players alive at round start, shrinking with in-round removals.
    pub players: Vec<String>,
    /// Werewolves' elimination target.
    #[serde(default)]
    pub eliminated: Option<String>,
    /// Doctor's protection target.
    #[serde(default)]
    pub protected: Option<String>,
    /// Seer's investigation target.
    #[serde(default)]
    pub unmasked: Option<String>,
    /// Who the day vote removed, if a majority was reached.
    #[serde(default)]
    pub exiled: Option<String>,
    /// Public (speaker, dialogue) transcript.
    #[serde(default)]
    pub debate: Vec<(String, String)>,
    /// One voter -> target tally per vote collection.
    #[serde(default)]
    pub votes: Vec<BTreeMap<String, String>>,
    /// One bidder -> bid tally per debate turn.
    #[serde(default)]
    pub bids: Vec<BTreeMap<String, u8>>,
    /// Belief reports collected right after the night resolution.
    #[serde(default)]
    pub role_assessments_post_night: BTreeMap<String, BeliefReport>,
    /// Belief reports collected after each debate turn.
    #[serde(default)]
    pub role_assessments_during_debate: Vec<BTreeMap<String, BeliefReport>>,
    /// Whether the round ran to completion without errors.
    #[serde(default)]
    pub success: bool,
}

impl Round {
    pub fn new(players: Vec<String>) -> Self {
        Self {
            players,
            ..Self::default()
        }
    }

    pub fn is_alive(&self, name: &str) -> bool {
        self.players.iter().any(|p| p == name)
    }

    /// Removes a player from the alive list. Returns false if absent.
    pub fn remove_player(&mut self, name: &str) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p != name);
        self.players.len() < before
    }

    /// Night resolution rule: the elimination target survives iff the doctor
    /// protected exactly that player.
    pub fn night_target_survives(&self) -> bool {
        self.eliminated.is_some() && self.eliminated == self.protected
    }

    /// The most recently collected vote tally, if any.
    pub fn latest_votes(&self) -> Option<&BTreeMap<String, String>> {
        self.votes.last()
    }

    /// Applies the exile rule to a tally: the plurality target is exiled iff
    /// its vote count is a strict majority of `alive_count`.
    ///
    /// `alive_count` is the number of players alive at vote time (after any
    /// earlier in-round removals), not at round start.
    pub fn exile_target(
        tally: &BTreeMap<String, String>,
        alive_count: usize,
    ) -> Option<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for target in tally.values() {
            *counts.entry(target.as_str()).or_default() += 1;
        }
        let (target, votes) = counts.into_iter().max_by_key(|&(name, n)| (n, name))?;
        // Strict majority: a winning count can belong to only one target.
        (votes * 2 > alive_count).then(|| target.to_string())
    }

    /// All bidders tied for the highest bid in a tally.
    pub fn top_bidders(bids: &BTreeMap<String, u8>) -> Vec<String> {
        let Some(max) = bids.values().max().copied() else {
            return Vec::new();
        };
        bids.iter()
            .filter(|(_, &b)| b == max)
            .map(|(name, _)| name.clone())
            .collect()
    }
}
