//! Per-player projection of the shared game state.

use serde::{Deserialize, Serialize};

/// The subset of the game one player can see.
///
/// Exactly one `GameView` exists per player. It is created when the roster is
/// assembled and reinitialized (not recreated) at round boundaries: the round
/// number is bumped and the debate transcript cleared, while the remaining
/// player list carries forward. `current_players` only ever shrinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub round_number: usize,
    pub current_players: Vec<String>,
    /// (speaker, dialogue) pairs for the current round's debate.
    #[serde(default)]
    pub debate: Vec<(String, String)>,
    /// The partner werewolf's name. Present only on werewolf views.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_wolf: Option<String>,
}

impl GameView {
    pub fn new(round_number: usize, current_players: Vec<String>, other_wolf: Option<String>) -> Self {
        Self {
            round_number,
            current_players,
            debate: Vec::new(),
            other_wolf,
        }
    }

    /// Appends a new debate entry from a speaker.
    pub fn update_debate(&mut self, author: impl Into<String>, dialogue: impl Into<String>) {
        self.debate.push((author.into(), dialogue.into()));
    }

    pub fn clear_debate(&mut self) {
        self.debate.clear();
    }

    /// Removes a player from the visible player list.
    ///
    /// Returns false when the player was not present, which callers may log;
    /// the list never re-admits a removed player.
    pub fn remove_player(&mut self, player: &str) -> bool {
        let before = self.current_players.len();
        self.current_players.retain(|p| p != player);
        self.current_players.len() < before
    }

    /// Round-boundary reset: next round number, fresh transcript.
    pub fn advance_round(&mut self) {
        self.round_number += 1;
        self.debate.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> GameView {
        GameView::new(
            0,
            vec!["Derek".into(), "Scott".into(), "Hayley".into()],
            None,
        )
    }

    #[test]
    fn debate_accumulates_in_order() {
        let mut v = view();
        v.update_debate("Derek", "I suspect Scott.");
        v.update_debate("Scott", "That is absurd.");
        assert_eq!(v.debate.len(), 2);
        assert_eq!(v.debate[0].0, "Derek");
    }

    #[test]
    fn remove_player_is_idempotent() {
        let mut v = view();
        assert!(v.remove_player("Scott"));
        assert!(!v.remove_player("Scott"));
        assert_eq!(v.current_players, vec!["Derek", "Hayley"]);
    }

    #[test]
    fn advance_round_clears_debate_and_bumps_round() {
        let mut v = view();
        v.update_debate("Derek", "hello");
        v.advance_round();
        assert_eq!(v.round_number, 1);
        assert!(v.debate.is_empty());
    }
}
