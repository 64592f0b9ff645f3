//! Whole-session state: roster, rounds, outcome.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::player::Player;
use crate::role::{Role, Team};
use crate::round::Round;

/// The complete state of one Werewolf session.
///
/// The state is the single owner of every player and round. Rounds refer to
/// players by name only; the four-role partition of the roster is derived
/// from each player's role tag rather than stored twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub session_id: String,
    pub players: BTreeMap<String, Player>,
    #[serde(default)]
    pub rounds: Vec<Round>,
    /// Non-empty when the game failed or was interrupted; such a session is
    /// resumable.
    #[serde(default)]
    pub error_message: String,
    /// Winning team, set exactly once. Terminal.
    #[serde(default)]
    pub winner: Option<Team>,
}

impl State {
    /// Builds a session from a roster, enforcing the fixed composition:
    /// 2 Werewolves, 1 Seer, 1 Doctor, at least 1 Villager, unique names.
    pub fn new(session_id: impl Into<String>, roster: Vec<Player>) -> Result<Self, DomainError> {
        let mut players = BTreeMap::new();
        for player in roster {
            if players.insert(player.name.clone(), player).is_some() {
                return Err(DomainError::validation("duplicate player name in roster"));
            }
        }

        let count = |role: Role| players.values().filter(|p| p.role == role).count();
        if count(Role::Werewolf) != 2 {
            return Err(DomainError::validation("roster requires exactly 2 werewolves"));
        }
        if count(Role::Seer) != 1 {
            return Err(DomainError::validation("roster requires exactly 1 seer"));
        }
        if count(Role::Doctor) != 1 {
            return Err(DomainError::validation("roster requires exactly 1 doctor"));
        }
        if count(Role::Villager) == 0 {
            return Err(DomainError::validation("roster requires at least 1 villager"));
        }

        Ok(Self {
            session_id: session_id.into(),
            players,
            rounds: Vec::new(),
            error_message: String::new(),
            winner: None,
        })
    }

    pub fn player(&self, name: &str) -> Result<&Player, DomainError> {
        self.players
            .get(name)
            .ok_or_else(|| DomainError::UnknownPlayer(name.to_string()))
    }

    pub fn player_mut(&mut self, name: &str) -> Result<&mut Player, DomainError> {
        self.players
            .get_mut(name)
            .ok_or_else(|| DomainError::UnknownPlayer(name.to_string()))
    }

    pub fn player_names(&self) -> Vec<String> {
        self.players.keys().cloned().collect()
    }

    pub fn werewolves(&self) -> impl Iterator<Item = &Player> {
        self.players.values().filter(|p| p.role == Role::Werewolf)
    }

    pub fn seer(&self) -> Option<&Player> {
        self.players.values().find(|p| p.role == Role::Seer)
    }

    pub fn doctor(&self) -> Option<&Player> {
        self.players.values().find(|p| p.role == Role::Doctor)
    }

    pub fn villagers(&self) -> impl Iterator<Item = &Player> {
        self.players.values().filter(|p| p.role == Role::Villager)
    }

    /// Win rule over an alive-player list: Werewolves win when they match or
    /// outnumber everyone else; Villagers win when no werewolf remains.
    pub fn winner_for(&self, alive: &[String]) -> Option<Team> {
        let wolves = alive
            .iter()
            .filter(|name| {
                self.players
                    .get(*name)
                    .is_some_and(|p| p.role.is_werewolf())
            })
            .count();
        let others = alive.len() - wolves;

        if wolves == 0 {
            Some(Team::Villagers)
        } else if wolves >= others {
            Some(Team::Werewolves)
        } else {
            None
        }
    }

    pub fn last_round(&self) -> Option<&Round> {
        self.rounds.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<Player> {
        vec![
            Player::new("Derek", Role::Werewolf),
            Player::new("Scott", Role::Werewolf),
            Player::new("Hayley", Role::Seer),
            Player::new("David", Role::Doctor),
            Player::new("Ginger", Role::Villager),
            Player::new("Jacob", Role::Villager),
            Player::new("Isaac", Role::Villager),
        ]
    }

    fn state() -> State {
        State::new("session-1", roster()).expect("valid roster")
    }

    #[test]
    fn roster_composition_is_enforced() {
        let mut bad = roster();
        bad.pop(); // still fine: 2 villagers left
        assert!(State::new("s", bad.clone()).is_ok());
        bad.retain(|p| p.role != Role::Seer);
        assert!(State::new("s", bad).is_err());

        let dupes = vec![
            Player::new("Derek", Role::Werewolf),
            Player::new("Derek", Role::Werewolf),
            Player::new("Hayley", Role::Seer),
            Player::new("David", Role::Doctor),
            Player::new("Ginger", Role::Villager),
        ];
        assert!(State::new("s", dupes).is_err());
    }

    #[test]
    fn werewolves_win_when_they_match_the_rest() {
        let s = state();
        let alive = vec![
            "Derek".to_string(),
            "Scott".to_string(),
            "Ginger".to_string(),
            "Jacob".to_string(),
        ];
        assert_eq!(s.winner_for(&alive), Some(Team::Werewolves));
    }

    #[test]
    fn villagers_win_when_no_wolves_remain() {
        let s = state();
        let alive = vec![
            "Hayley".to_string(),
            "Ginger".to_string(),
            "Jacob".to_string(),
        ];
        assert_eq!(s.winner_for(&alive), Some(Team::Villagers));
    }

    #[test]
    fn one_wolf_against_three_is_no_winner_yet() {
        let s = state();
        let alive = vec![
            "Derek".to_string(),
            "Hayley".to_string(),
            "Ginger".to_string(),
            "Jacob".to_string(),
        ];
        assert_eq!(s.winner_for(&alive), None);
    }

    #[test]
    fn state_round_trips_through_json() {
        let mut s = state();
        for name in s.player_names() {
            let others = s.player_names();
            s.player_mut(&name)
                .expect("player")
                .initialize_game_view(0, others, None);
        }
        let mut round = Round::new(s.player_names());
        round.eliminated = Some("Ginger".into());
        round.debate.push(("Derek".into(), "I saw nothing.".into()));
        round
            .votes
            .push([("Derek".to_string(), "Jacob".to_string())].into_iter().collect());
        round
            .bids
            .push([("Derek".to_string(), 3u8)].into_iter().collect());
        round.success = true;
        s.rounds.push(round);
        s.winner = Some(Team::Werewolves);

        let json = serde_json::to_string_pretty(&s).expect("serialize");
        let back: State = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, s);
    }
}
