//! Per-round audit logs mirroring the round timeline.
//!
//! Where a `Round` stores resolved values (who was eliminated, the vote
//! tallies), the matching `RoundLog` stores the raw generation records that
//! produced them, for full reproducibility. Exactly one `RoundLog` exists
//! per round, index-aligned with `State.rounds`.

use serde::{Deserialize, Serialize};

use crate::generation::LmLog;

/// A single player's vote together with the generation record behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteLog {
    pub player: String,
    pub voted_for: Option<String>,
    pub log: LmLog,
}

/// All generation records for one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RoundLog {
    /// Werewolf elimination decision.
    #[serde(default)]
    pub eliminate: Option<LmLog>,
    /// Seer investigation decision.
    #[serde(default)]
    pub investigate: Option<LmLog>,
    /// Doctor protection decision.
    #[serde(default)]
    pub protect: Option<LmLog>,
    /// Per debate turn: every bidder's record.
    #[serde(default)]
    pub bid: Vec<Vec<(String, LmLog)>>,
    /// One record per debate statement.
    #[serde(default)]
    pub debate: Vec<(String, LmLog)>,
    /// Per vote collection: every voter's record.
    #[serde(default)]
    pub votes: Vec<Vec<VoteLog>>,
    /// End-of-round reflections.
    #[serde(default)]
    pub summaries: Vec<(String, LmLog)>,
    #[serde(default)]
    pub role_assessments_post_night: Vec<(String, LmLog)>,
    #[serde(default)]
    pub role_assessments_during_debate: Vec<Vec<(String, LmLog)>>,
}
