//! Player entity - identity, private memory, and per-role data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::role::Role;
use crate::view::GameView;

/// A single participant in the session.
///
/// All four roles share this entity; role-specific behavior is dispatched on
/// the `role` tag by the engine's actor layer. Observations are private to
/// the player and append-only: each entry is tagged with the round it
/// occurred in and nothing is ever rewritten or shared across players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub role: Role,
    /// Identifier of the language model that plays this seat.
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub personality: String,
    /// Private game history visible only to this player.
    #[serde(default)]
    pub observations: Vec<String>,
    /// Why this player last wanted to speak. Overwritten every debate turn.
    #[serde(default)]
    pub bidding_rationale: String,
    /// This player's view of the shared state. None until the roster is
    /// assembled; accessing it before then is a contract violation.
    #[serde(default)]
    pub gamestate: Option<GameView>,
    /// Investigation results, populated only for the Seer. Append-only:
    /// a revealed role is never overwritten.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub previously_unmasked: BTreeMap<String, Role>,
}

impl Player {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
            model: String::new(),
            personality: String::new(),
            observations: Vec::new(),
            bidding_rationale: String::new(),
            gamestate: None,
            previously_unmasked: BTreeMap::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_personality(mut self, personality: impl Into<String>) -> Self {
        self.personality = personality.into();
        self
    }

    /// Sets up (or resets) this player's view of the game.
    pub fn initialize_game_view(
        &mut self,
        round_number: usize,
        current_players: Vec<String>,
        other_wolf: Option<String>,
    ) {
        self.gamestate = Some(GameView::new(round_number, current_players, other_wolf));
    }

    pub fn view(&self) -> Result<&GameView, DomainError> {
        self.gamestate
            .as_ref()
            .ok_or_else(|| DomainError::ViewUninitialized(self.name.clone()))
    }

    pub fn view_mut(&mut self) -> Result<&mut GameView, DomainError> {
        self.gamestate
            .as_mut()
            .ok_or_else(|| DomainError::ViewUninitialized(self.name.clone()))
    }

    /// Appends an observation to the private history, tagged with the
    /// current round from this player's view.
    pub fn add_observation(&mut self, observation: impl AsRef<str>) -> Result<(), DomainError> {
        let round = self.view()?.round_number;
        self.observations
            .push(format!("Round {}: {}", round, observation.as_ref()));
        Ok(())
    }

    /// Appends a moderator announcement to the private history.
    pub fn add_announcement(&mut self, announcement: impl AsRef<str>) -> Result<(), DomainError> {
        self.add_observation(format!("Moderator Announcement: {}", announcement.as_ref()))
    }

    /// Seer only: permanently records a revealed role plus the matching
    /// observation. Existing revelations are never overwritten.
    pub fn reveal_and_update(
        &mut self,
        player: impl Into<String>,
        role: Role,
    ) -> Result<(), DomainError> {
        let player = player.into();
        self.add_observation(format!(
            "During the night, I decided to investigate {} and learned they are a {}",
            player, role
        ))?;
        self.previously_unmasked.entry(player).or_insert(role);
        Ok(())
    }

    /// Drops every observation tagged with `round`. Used on resume to forget
    /// a discarded, incomplete round.
    pub fn strip_round_observations(&mut self, round: usize) {
        let prefix = format!("Round {}:", round);
        self.observations.retain(|o| !o.starts_with(&prefix));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_with_view(round: usize) -> Player {
        let mut p = Player::new("Hayley", Role::Seer);
        p.initialize_game_view(round, vec!["Hayley".into(), "Derek".into()], None);
        p
    }

    #[test]
    fn observations_are_tagged_with_the_view_round() {
        let mut p = player_with_view(3);
        p.add_observation("something happened").expect("observe");
        assert_eq!(p.observations, vec!["Round 3: something happened"]);
    }

    #[test]
    fn observing_without_a_view_is_fatal() {
        let mut p = Player::new("Derek", Role::Villager);
        assert!(matches!(
            p.add_observation("too early"),
            Err(DomainError::ViewUninitialized(_))
        ));
    }

    #[test]
    fn announcements_are_prefixed() {
        let mut p = player_with_view(1);
        p.add_announcement("No one was removed from the game during the night")
            .expect("announce");
        assert!(p.observations[0].starts_with("Round 1: Moderator Announcement:"));
    }

    #[test]
    fn reveal_records_role_and_never_overwrites() {
        let mut p = player_with_view(0);
        p.reveal_and_update("Derek", Role::Werewolf).expect("reveal");
        p.reveal_and_update("Derek", Role::Villager).expect("reveal");
        assert_eq!(p.previously_unmasked.get("Derek"), Some(&Role::Werewolf));
    }

    #[test]
    fn strip_round_observations_only_touches_that_round() {
        let mut p = player_with_view(1);
        p.add_observation("kept").expect("observe");
        p.view_mut().expect("view").advance_round();
        p.add_observation("dropped").expect("observe");
        p.strip_round_observations(2);
        assert_eq!(p.observations, vec!["Round 1: kept"]);
    }
}
