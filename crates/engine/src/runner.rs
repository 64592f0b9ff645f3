//! Session lifecycle: roster setup, running a game, resuming saved ones.
//!
//! Every exit path - victory, error, or Ctrl-C - ends in a best-effort save,
//! so no completed round is ever silently lost. Resume loads the latest
//! saved state, discards an incomplete trailing round, and rebuilds the
//! per-player views before handing the game back to the orchestrator.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::seq::SliceRandom;
use uuid::Uuid;

use werewolf_domain::{Player, Role, State, Team};

use crate::config::GameConfig;
use crate::error::GameError;
use crate::infrastructure::ports::LlmPort;
use crate::logs::RoundLog;
use crate::orchestrator::GameMaster;
use crate::persistence;

/// Where a finished (or interrupted) session ended up.
#[derive(Debug)]
pub struct SessionOutcome {
    /// None when the game was interrupted or failed; the directory then
    /// holds a resumable partial state.
    pub winner: Option<Team>,
    pub directory: PathBuf,
}

/// Batch resume results, split by what happened to each directory.
#[derive(Debug, Default)]
pub struct ResumeReport {
    pub successful: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
    /// Directories holding no resumable game at all.
    pub invalid: Vec<PathBuf>,
}

/// Samples a roster from the name pool and assigns roles: one seer, one
/// doctor, two werewolves, villagers for the rest. Every player gets a
/// fresh view of the full roster; werewolves learn their partner.
pub fn initialize_players(
    config: &GameConfig,
    villager_model: &str,
    werewolf_model: &str,
) -> Result<Vec<Player>, GameError> {
    let mut rng = rand::thread_rng();
    let mut names = config.sample_names(&mut rng);
    names.shuffle(&mut rng);
    if names.len() < 5 {
        return Err(GameError::Domain(werewolf_domain::DomainError::validation(
            "player pool must provide at least 5 names",
        )));
    }

    let mut players = Vec::with_capacity(names.len());
    let mut next = || names.pop().unwrap_or_default();

    players.push(
        Player::new(next(), Role::Seer)
            .with_model(villager_model)
            .with_personality("You are cunning."),
    );
    players.push(
        Player::new(next(), Role::Doctor)
            .with_model(villager_model)
            .with_personality("You are a doctor."),
    );
    players.push(Player::new(next(), Role::Werewolf).with_model(werewolf_model));
    players.push(Player::new(next(), Role::Werewolf).with_model(werewolf_model));
    for name in names.drain(..) {
        players.push(Player::new(name, Role::Villager).with_model(villager_model));
    }

    let all_names: Vec<String> = players.iter().map(|p| p.name.clone()).collect();
    let wolf_names: Vec<String> = players
        .iter()
        .filter(|p| p.role.is_werewolf())
        .map(|p| p.name.clone())
        .collect();
    for player in &mut players {
        let other_wolf = if player.role.is_werewolf() {
            wolf_names.iter().find(|w| **w != player.name).cloned()
        } else {
            None
        };
        tracing::info!(player = %player.name, role = %player.role, "assigned role");
        player.initialize_game_view(0, all_names.clone(), other_wolf);
    }
    Ok(players)
}

/// Runs one full game in a fresh timestamped session directory.
pub async fn run_session(
    config: GameConfig,
    llm: Arc<dyn LlmPort>,
    villager_model: &str,
    werewolf_model: &str,
) -> Result<SessionOutcome, GameError> {
    let roster = initialize_players(&config, villager_model, werewolf_model)?;
    let state = State::new(Uuid::new_v4().to_string(), roster)?;
    let directory = persistence::log_directory();

    let mut game = GameMaster::new(state, Vec::new(), config, llm, Some(directory.clone()));
    persistence::save_game(game.state(), game.logs(), &directory)?;
    tracing::info!(directory = %directory.display(), "game started, auto-saving after every round");

    let winner = drive(&mut game).await;

    persistence::save_game(game.state(), game.logs(), &directory)?;
    tracing::info!(directory = %directory.display(), "game logs saved");
    Ok(SessionOutcome { winner, directory })
}

/// Resumes a single saved session. Returns whether it ran to completion
/// without a new error.
pub async fn resume_game(
    directory: &Path,
    config: GameConfig,
    llm: Arc<dyn LlmPort>,
) -> Result<bool, GameError> {
    let (mut state, mut logs) = persistence::load_game(directory)?;
    prepare_resume(&mut state, &mut logs)?;

    let mut game = GameMaster::new(state, logs, config, llm, Some(directory.to_path_buf()));
    drive(&mut game).await;
    persistence::save_game(game.state(), game.logs(), directory)?;
    Ok(game.state().error_message.is_empty())
}

/// Resumes a batch of session directories, tolerating per-directory
/// failures and classifying each outcome.
pub async fn resume_games(
    directories: &[PathBuf],
    config: &GameConfig,
    llm: Arc<dyn LlmPort>,
) -> ResumeReport {
    let mut report = ResumeReport::default();
    for directory in directories {
        match resume_game(directory, config.clone(), Arc::clone(&llm)).await {
            Ok(true) => report.successful.push(directory.clone()),
            Ok(false) => report.failed.push(directory.clone()),
            Err(GameError::NoResumableGame(_)) => {
                tracing::warn!(directory = %directory.display(), "no resumable game found");
                report.invalid.push(directory.clone());
            }
            Err(e) => {
                tracing::error!(directory = %directory.display(), error = %e, "error encountered during resume");
                report.failed.push(directory.clone());
            }
        }
    }
    tracing::info!(
        successful = report.successful.len(),
        failed = report.failed.len(),
        invalid = report.invalid.len(),
        "batch resume complete"
    );
    report
}

/// Races the game against Ctrl-C. Either way the caller saves afterwards:
/// interrupted and failed games persist with an error message and stay
/// resumable.
async fn drive(game: &mut GameMaster) -> Option<Team> {
    let outcome = tokio::select! {
        result = game.run_game() => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };
    match outcome {
        Some(Ok(winner)) => Some(winner),
        Some(Err(e)) => {
            tracing::error!(error = %e, "error encountered during game");
            game.state_mut().error_message = e.to_string();
            None
        }
        None => {
            tracing::warn!("game interrupted, saving current state");
            game.state_mut().error_message = GameError::Interrupted.to_string();
            None
        }
    }
}

/// Makes a loaded session runnable again: drops an incomplete trailing
/// round (and its paired log), clears the error flag, and rebuilds every
/// surviving player's view from the reconstructed alive list.
pub fn prepare_resume(state: &mut State, logs: &mut Vec<RoundLog>) -> Result<(), GameError> {
    if state.rounds.last().is_some_and(|r| !r.success) {
        state.rounds.pop();
        logs.pop();
    }
    state.error_message.clear();
    rebuild_views(state)
}

fn rebuild_views(state: &mut State) -> Result<(), GameError> {
    if state.rounds.is_empty() {
        // Nothing completed: restart from a clean slate.
        let names = state.player_names();
        for name in &names {
            let player = state.player_mut(name)?;
            player.initialize_game_view(0, names.clone(), None);
            player.observations.clear();
            player.bidding_rationale.clear();
            if player.role == Role::Seer {
                player.previously_unmasked.clear();
            }
        }
    } else {
        let round_number = state.rounds.len();
        let alive = state.rounds[round_number - 1].players.clone();

        // The seer's investigation history is replayed from the completed
        // rounds against true roles rather than trusted from the save.
        let mut history: BTreeMap<String, Role> = BTreeMap::new();
        for round in &state.rounds {
            if let Some(unmasked) = &round.unmasked {
                if let Some(player) = state.players.get(unmasked) {
                    history.insert(unmasked.clone(), player.role);
                }
            }
        }

        for name in &alive {
            let Some(player) = state.players.get_mut(name) else {
                continue;
            };
            player.initialize_game_view(round_number, alive.clone(), None);
            player.strip_round_observations(round_number);
            if player.role == Role::Seer {
                player.previously_unmasked = history.clone();
            }
        }
    }

    // Re-pair werewolf partner back-references.
    let roster: Vec<String> = match state.rounds.last() {
        Some(round) => round.players.clone(),
        None => state.player_names(),
    };
    let wolves: Vec<String> = roster
        .into_iter()
        .filter(|name| {
            state
                .players
                .get(name)
                .is_some_and(|p| p.role.is_werewolf())
        })
        .collect();
    if wolves.len() == 2 {
        state.player_mut(&wolves[0])?.view_mut()?.other_wolf = Some(wolves[1].clone());
        state.player_mut(&wolves[1])?.view_mut()?.other_wolf = Some(wolves[0].clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use werewolf_domain::Round;

    fn saved_state() -> (State, Vec<RoundLog>) {
        let roster = vec![
            Player::new("Derek", Role::Werewolf),
            Player::new("Scott", Role::Werewolf),
            Player::new("Hayley", Role::Seer),
            Player::new("David", Role::Doctor),
            Player::new("Ginger", Role::Villager),
        ];
        let mut state = State::new("resume-test", roster).expect("valid roster");
        let names = state.player_names();
        for name in &names {
            state
                .player_mut(name)
                .expect("player")
                .initialize_game_view(0, names.clone(), None);
        }

        // Round 0 completed: Ginger was removed, the seer unmasked Scott.
        let mut first = Round::new(names.clone());
        first.eliminated = Some("Ginger".into());
        first.unmasked = Some("Scott".into());
        first.remove_player("Ginger");
        first.success = true;
        state.rounds.push(first);

        for name in ["Derek", "Scott", "Hayley", "David"] {
            state
                .player_mut(name)
                .expect("player")
                .add_observation("round zero memory")
                .expect("observe");
        }

        // Round 1 failed mid-flight: it must be discarded on resume.
        let survivors = state.rounds[0].players.clone();
        let mut failed = Round::new(survivors);
        failed.eliminated = Some("David".into());
        state.rounds.push(failed);
        state.error_message = "Scott did not return a valid bid".into();

        for name in ["Derek", "Scott", "Hayley", "David"] {
            let player = state.player_mut(name).expect("player");
            player.view_mut().expect("view").advance_round();
            player
                .add_observation("round one memory that must vanish")
                .expect("observe");
        }

        let logs = vec![RoundLog::default(), RoundLog::default()];
        (state, logs)
    }

    #[test]
    fn resume_discards_exactly_the_failed_round() {
        let (mut state, mut logs) = saved_state();
        prepare_resume(&mut state, &mut logs).expect("prepare");

        assert_eq!(state.rounds.len(), 1);
        assert_eq!(state.rounds.len(), logs.len());
        assert!(state.error_message.is_empty());

        // Views rebuilt to the round after the last completed one.
        let seer = state.player("Hayley").expect("seer");
        let view = seer.view().expect("view");
        assert_eq!(view.round_number, 1);
        assert_eq!(view.current_players, state.rounds[0].players);
        assert!(view.debate.is_empty());

        // The discarded round's observations are gone; earlier ones stay.
        assert!(seer.observations.iter().any(|o| o.contains("round zero memory")));
        assert!(!seer.observations.iter().any(|o| o.contains("must vanish")));

        // Investigation history replayed against true roles.
        assert_eq!(seer.previously_unmasked.len(), 1);
        assert_eq!(seer.previously_unmasked.get("Scott"), Some(&Role::Werewolf));

        // Werewolf back-references re-paired.
        let derek = state.player("Derek").expect("wolf");
        assert_eq!(
            derek.view().expect("view").other_wolf.as_deref(),
            Some("Scott")
        );
    }

    #[test]
    fn resume_with_no_completed_rounds_restarts_cleanly() {
        let (mut state, mut logs) = saved_state();
        // Both rounds failed this time.
        state.rounds[0].success = false;
        state.rounds.truncate(1);
        logs.truncate(1);

        prepare_resume(&mut state, &mut logs).expect("prepare");
        assert!(state.rounds.is_empty());
        assert!(logs.is_empty());

        let seer = state.player("Hayley").expect("seer");
        assert!(seer.observations.is_empty());
        assert!(seer.previously_unmasked.is_empty());
        let view = seer.view().expect("view");
        assert_eq!(view.round_number, 0);
        assert_eq!(view.current_players.len(), 5);
    }

    #[tokio::test]
    async fn batch_resume_reports_empty_directories_as_invalid() {
        struct NoLlm;
        #[async_trait::async_trait]
        impl LlmPort for NoLlm {
            async fn generate(
                &self,
                _request: crate::infrastructure::ports::LlmRequest,
            ) -> Result<crate::infrastructure::ports::LlmResponse, crate::infrastructure::ports::LlmError>
            {
                Err(crate::infrastructure::ports::LlmError::RequestFailed(
                    "unused".into(),
                ))
            }
        }

        let empty = tempfile::tempdir().expect("tempdir");
        let report = resume_games(
            &[empty.path().to_path_buf()],
            &GameConfig::default(),
            Arc::new(NoLlm),
        )
        .await;
        assert_eq!(report.invalid.len(), 1);
        assert!(report.successful.is_empty());
        assert!(report.failed.is_empty());
    }

    #[test]
    fn initialized_rosters_have_the_fixed_role_composition() {
        let config = GameConfig::default();
        let players =
            initialize_players(&config, "villager-model", "wolf-model").expect("players");
        assert_eq!(players.len(), config.num_players);

        let count = |role: Role| players.iter().filter(|p| p.role == role).count();
        assert_eq!(count(Role::Werewolf), 2);
        assert_eq!(count(Role::Seer), 1);
        assert_eq!(count(Role::Doctor), 1);
        assert_eq!(count(Role::Villager), config.num_players - 4);

        for player in &players {
            let view = player.view().expect("view");
            assert_eq!(view.current_players.len(), config.num_players);
            if player.role.is_werewolf() {
                let partner = view.other_wolf.as_ref().expect("partner");
                assert_ne!(partner, &player.name);
            } else {
                assert!(view.other_wolf.is_none());
            }
        }

        let wolf = players.iter().find(|p| p.role.is_werewolf()).expect("wolf");
        assert_eq!(wolf.model, "wolf-model");
        let seer = players.iter().find(|p| p.role == Role::Seer).expect("seer");
        assert_eq!(seer.model, "villager-model");
    }
}
