//! Game orchestration: the round state machine.
//!
//! `GameMaster` drives one round at a time through a fixed phase sequence:
//! night actions, night resolution, a post-night win check, the debate/vote
//! loop, exile, a post-day win check, and end-of-round summaries. Within a
//! phase, per-player decisions fan out over a bounded worker pool and join
//! at a barrier before any shared state is touched; phases themselves are
//! strictly sequential.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use rand::seq::SliceRandom;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use werewolf_domain::{Round, State, Team};

use crate::actor::{ActorContext, PlayerActor};
use crate::config::GameConfig;
use crate::error::GameError;
use crate::infrastructure::ports::LlmPort;
use crate::logs::{RoundLog, VoteLog};
use crate::persistence;

pub struct GameMaster {
    state: State,
    logs: Vec<RoundLog>,
    config: GameConfig,
    llm: Arc<dyn LlmPort>,
    /// When set, state and logs are saved here after every round.
    log_directory: Option<PathBuf>,
    current_round: usize,
}

impl GameMaster {
    /// `logs` must be index-aligned with `state.rounds`; pass the loaded
    /// logs when resuming and an empty vec for a fresh game.
    pub fn new(
        state: State,
        logs: Vec<RoundLog>,
        config: GameConfig,
        llm: Arc<dyn LlmPort>,
        log_directory: Option<PathBuf>,
    ) -> Self {
        let current_round = state.rounds.len();
        Self {
            state,
            logs,
            config,
            llm,
            log_directory,
            current_round,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    pub fn logs(&self) -> &[RoundLog] {
        &self.logs
    }

    /// Runs rounds until a winner is set.
    pub async fn run_game(&mut self) -> Result<Team, GameError> {
        loop {
            if let Some(winner) = self.state.winner {
                tracing::info!(%winner, "game is complete");
                return Ok(winner);
            }

            tracing::info!(round = self.current_round, "starting round");
            self.run_round().await?;
            self.auto_save();

            // Re-synchronize surviving views for the next round. This is the
            // only state carried forward implicitly.
            let survivors = self.this_round().players.clone();
            for name in survivors {
                let player = self.state.player_mut(&name)?;
                if player.gamestate.is_some() {
                    player.view_mut()?.advance_round();
                }
            }
            self.current_round += 1;
        }
    }

    /// Runs a single round through the full phase sequence. A win check
    /// that fires ends the round early but still marks it successful.
    pub async fn run_round(&mut self) -> Result<(), GameError> {
        let players = if self.current_round == 0 {
            self.state.player_names()
        } else {
            self.state.rounds[self.current_round - 1].players.clone()
        };
        self.state.rounds.push(Round::new(players));
        self.logs.push(RoundLog::default());

        tracing::info!("the werewolves are picking someone to remove from the game");
        self.eliminate().await?;
        tracing::info!("the doctor is protecting someone");
        self.protect().await?;
        tracing::info!("the seer is investigating someone");
        self.unmask().await?;
        self.resolve_night_phase()?;
        self.collect_role_assessments_post_night().await?;

        self.check_for_winner();
        if self.state.winner.is_some() {
            return self.finish_round();
        }

        tracing::info!("the players are debating and voting");
        self.run_day_phase().await?;
        self.exile()?;

        self.check_for_winner();
        if self.state.winner.is_some() {
            return self.finish_round();
        }

        tracing::info!("the players are summarizing the debate");
        self.run_summaries().await?;
        self.finish_round()
    }

    fn finish_round(&mut self) -> Result<(), GameError> {
        self.this_round_mut().success = true;
        tracing::info!(round = self.current_round, "round complete");
        Ok(())
    }

    // =========================================================================
    // Night phases
    // =========================================================================

    /// A random alive werewolf picks the elimination target. Failure here is
    /// fatal: the night cannot resolve without a target.
    async fn eliminate(&mut self) -> Result<(), GameError> {
        let alive_wolves: Vec<String> = self
            .state
            .werewolves()
            .map(|w| w.name.clone())
            .filter(|name| self.this_round().is_alive(name))
            .collect();
        let Some(wolf_name) = alive_wolves.choose(&mut rand::thread_rng()).cloned() else {
            return Ok(());
        };

        let (choice, log) = self.actor(&wolf_name)?.eliminate().await?;
        self.this_round_log_mut().eliminate = Some(log);

        let Some(eliminated) = choice else {
            return Err(GameError::InvalidDecision {
                player: wolf_name,
                action: "elimination target",
            });
        };
        tracing::info!(wolf = %wolf_name, target = %eliminated, "werewolves chose their target");
        self.this_round_mut().eliminated = Some(eliminated.clone());

        let observation = format!(
            "During the night, {} decided to eliminate {}",
            if alive_wolves.len() > 1 { "we" } else { "I" },
            eliminated
        );
        for wolf in alive_wolves {
            self.state.player_mut(&wolf)?.add_observation(&observation)?;
        }
        Ok(())
    }

    /// The doctor chooses someone to protect. A failed decision falls back
    /// to a uniformly random alive player.
    async fn protect(&mut self) -> Result<(), GameError> {
        let Some(doctor_name) = self.state.doctor().map(|d| d.name.clone()) else {
            return Ok(());
        };
        if !self.this_round().is_alive(&doctor_name) {
            return Ok(());
        }

        let (choice, log) = self.actor(&doctor_name)?.save().await?;
        self.this_round_log_mut().protect = Some(log);

        let protected = match choice {
            Some(target) => {
                tracing::info!(doctor = %doctor_name, target = %target, "doctor chose a patient");
                self.state.player_mut(&doctor_name)?.add_observation(format!(
                    "During the night, I chose to protect {}",
                    target
                ))?;
                target
            }
            None => {
                let players = self.this_round().players.clone();
                let Some(fallback) = players.choose(&mut rand::thread_rng()).cloned() else {
                    return Ok(());
                };
                tracing::warn!(target = %fallback, "doctor action failed, protecting at random");
                fallback
            }
        };
        self.this_round_mut().protected = Some(protected);
        Ok(())
    }

    /// The seer investigates one player, permanently learning their role.
    /// A failed decision falls back to a random uninvestigated player.
    async fn unmask(&mut self) -> Result<(), GameError> {
        let Some(seer_name) = self.state.seer().map(|s| s.name.clone()) else {
            return Ok(());
        };
        if !self.this_round().is_alive(&seer_name) {
            return Ok(());
        }

        let (choice, log) = self.actor(&seer_name)?.unmask().await?;
        self.this_round_log_mut().investigate = Some(log);

        let target = match choice {
            Some(target) => Some(target),
            None => {
                let seer = self.state.player(&seer_name)?;
                let options: Vec<String> = self
                    .this_round()
                    .players
                    .iter()
                    .filter(|p| {
                        p.as_str() != seer_name && !seer.previously_unmasked.contains_key(p.as_str())
                    })
                    .cloned()
                    .collect();
                let fallback = options.choose(&mut rand::thread_rng()).cloned();
                if let Some(target) = &fallback {
                    tracing::warn!(%target, "seer action failed, investigating at random");
                }
                fallback
            }
        };

        if let Some(target) = target {
            self.this_round_mut().unmasked = Some(target.clone());
            let role = self.state.player(&target)?.role;
            self.state
                .player_mut(&seer_name)?
                .reveal_and_update(&target, role)?;
        }
        Ok(())
    }

    /// The elimination target survives iff the doctor protected exactly
    /// that player; otherwise they are removed and everyone learns of it.
    fn resolve_night_phase(&mut self) -> Result<(), GameError> {
        let eliminated = self.this_round().eliminated.clone();
        let removed = match (&eliminated, self.this_round().night_target_survives()) {
            (Some(target), false) => {
                self.this_round_mut().remove_player(target);
                Some(target.clone())
            }
            _ => None,
        };
        let announcement = match &removed {
            Some(target) => format!(
                "The Werewolves removed {} from the game during the night",
                target
            ),
            None => "No one was removed from the game during the night".to_string(),
        };
        tracing::info!(%announcement);

        let survivors = self.this_round().players.clone();
        for name in survivors {
            let player = self.state.player_mut(&name)?;
            if let Some(target) = &removed {
                if !player.view_mut()?.remove_player(target) {
                    tracing::warn!(viewer = %name, %target, "removed player was not in view");
                }
            }
            player.add_announcement(&announcement)?;
        }
        Ok(())
    }

    // =========================================================================
    // Day phases
    // =========================================================================

    /// Runs exactly `max_debate_turns` debate turns: bid for the floor,
    /// speak, collect belief reports, and (by configuration) a vote tally.
    async fn run_day_phase(&mut self) -> Result<(), GameError> {
        for turn in 0..self.config.max_debate_turns {
            let speaker = self.next_speaker().await?;

            let (dialogue, log) = self.actor(&speaker)?.debate().await?;
            self.this_round_log_mut().debate.push((speaker.clone(), log));
            let Some(dialogue) = dialogue else {
                return Err(GameError::InvalidDecision {
                    player: speaker,
                    action: "debate statement",
                });
            };
            let role = self.state.player(&speaker)?.role;
            tracing::info!(speaker = %speaker, %role, %dialogue, "debate");
            self.this_round_mut()
                .debate
                .push((speaker.clone(), dialogue.clone()));

            let players = self.this_round().players.clone();
            for name in &players {
                self.state
                    .player_mut(name)?
                    .view_mut()?
                    .update_debate(&speaker, &dialogue);
            }

            self.collect_role_assessments_during_debate().await?;

            // Vote every turn for dense metrics, or only on the final turn.
            if turn == self.config.max_debate_turns - 1 || self.config.synthetic_votes {
                self.run_voting().await?;
            }
        }

        if let Some(tally) = self.this_round().latest_votes() {
            for (voter, target) in tally {
                tracing::info!(%voter, %target, "final vote");
            }
        }
        Ok(())
    }

    /// Collects bids from everyone but the previous speaker and picks the
    /// highest bidder. Ties prefer bidders addressed in the previous
    /// dialogue; remaining ties break uniformly at random.
    async fn next_speaker(&mut self) -> Result<String, GameError> {
        let (previous_speaker, previous_dialogue) = match self.this_round().debate.last() {
            Some((speaker, dialogue)) => (Some(speaker.clone()), Some(dialogue.clone())),
            None => (None, None),
        };

        let bidders: Vec<String> = self
            .this_round()
            .players
            .iter()
            .filter(|p| previous_speaker.as_deref() != Some(p.as_str()))
            .cloned()
            .collect();
        let results = self
            .fan_out(&bidders, |actor| async move { actor.bid().await })
            .await?;

        let mut bids: BTreeMap<String, u8> = BTreeMap::new();
        let mut bid_logs = Vec::new();
        for (name, (bid, log)) in results {
            let Some(bid) = bid else {
                return Err(GameError::InvalidDecision {
                    player: name,
                    action: "bid",
                });
            };
            if let Some(reasoning) = log
                .result
                .as_ref()
                .and_then(|r| r.get("reasoning"))
                .and_then(|r| r.as_str())
            {
                self.state.player_mut(&name)?.bidding_rationale = reasoning.to_string();
            }
            if bid > 1 {
                tracing::info!(player = %name, bid, "notable bid");
            }
            bids.insert(name.clone(), bid);
            bid_logs.push((name, log));
        }
        self.this_round_mut().bids.push(bids.clone());
        self.this_round_log_mut().bid.push(bid_logs);

        let candidates = speaker_candidates(Round::top_bidders(&bids), previous_dialogue.as_deref());
        candidates
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or(GameError::NoSpeaker)
    }

    /// Collects one vote from every alive player. Any voter failing to
    /// produce a valid vote is fatal, but the partial tally and all logs
    /// are recorded first.
    async fn run_voting(&mut self) -> Result<(), GameError> {
        let players = self.this_round().players.clone();
        let transcript_full = self.this_round().debate.len() == self.config.max_debate_turns;
        let results = self
            .fan_out(&players, |actor| async move { actor.vote().await })
            .await?;

        let mut tally: BTreeMap<String, String> = BTreeMap::new();
        let mut vote_logs = Vec::new();
        let mut failed: Option<String> = None;
        for (name, (vote, log)) in results {
            vote_logs.push(VoteLog {
                player: name.clone(),
                voted_for: vote.clone(),
                log,
            });
            match vote {
                Some(target) => {
                    if transcript_full {
                        self.state.player_mut(&name)?.add_observation(format!(
                            "After the debate, I voted to remove {} from the game",
                            target
                        ))?;
                    }
                    tally.insert(name, target);
                }
                None => {
                    failed.get_or_insert(name);
                }
            }
        }
        self.this_round_mut().votes.push(tally);
        self.this_round_log_mut().votes.push(vote_logs);

        match failed {
            Some(player) => Err(GameError::InvalidDecision {
                player,
                action: "vote",
            }),
            None => Ok(()),
        }
    }

    /// Applies the final tally: the plurality target is exiled iff their
    /// count is a strict majority of players alive at vote time.
    fn exile(&mut self) -> Result<(), GameError> {
        let alive_count = self.this_round().players.len();
        let target = self
            .this_round()
            .latest_votes()
            .and_then(|tally| Round::exile_target(tally, alive_count));
        if let Some(target) = &target {
            self.this_round_mut().exiled = Some(target.clone());
            self.this_round_mut().remove_player(target);
        }

        let announcement = match &target {
            Some(exiled) => format!("The majority voted to remove {} from the game", exiled),
            None => {
                "A majority vote was not reached, so no one was removed from the game".to_string()
            }
        };
        tracing::info!(%announcement);

        let survivors = self.this_round().players.clone();
        for name in survivors {
            let player = self.state.player_mut(&name)?;
            if let Some(exiled) = &target {
                player.view_mut()?.remove_player(exiled);
            }
            player.add_announcement(&announcement)?;
        }
        Ok(())
    }

    // =========================================================================
    // Metrics and reflection phases
    // =========================================================================

    async fn collect_role_assessments_post_night(&mut self) -> Result<(), GameError> {
        let players = self.this_round().players.clone();
        let results = self
            .fan_out(&players, |actor| async move { actor.assess_roles().await })
            .await?;
        for (name, (report, log)) in results {
            match report {
                Some(report) => {
                    self.this_round_mut()
                        .role_assessments_post_night
                        .insert(name.clone(), report);
                    self.this_round_log_mut()
                        .role_assessments_post_night
                        .push((name, log));
                }
                None => tracing::warn!(player = %name, "failed to provide a role assessment"),
            }
        }
        Ok(())
    }

    async fn collect_role_assessments_during_debate(&mut self) -> Result<(), GameError> {
        let players = self.this_round().players.clone();
        let results = self
            .fan_out(&players, |actor| async move { actor.assess_roles().await })
            .await?;
        let mut reports = BTreeMap::new();
        let mut report_logs = Vec::new();
        for (name, (report, log)) in results {
            match report {
                Some(report) => {
                    reports.insert(name.clone(), report);
                    report_logs.push((name, log));
                }
                None => tracing::warn!(player = %name, "failed to provide a role assessment"),
            }
        }
        self.this_round_mut()
            .role_assessments_during_debate
            .push(reports);
        self.this_round_log_mut()
            .role_assessments_during_debate
            .push(report_logs);
        Ok(())
    }

    /// End-of-round reflections; failures are tolerated.
    async fn run_summaries(&mut self) -> Result<(), GameError> {
        let players = self.this_round().players.clone();
        let results = self
            .fan_out(&players, |actor| async move { actor.summarize().await })
            .await?;
        for (name, (summary, log)) in results {
            if let Some(summary) = &summary {
                tracing::info!(player = %name, %summary, "round summary");
                self.state
                    .player_mut(&name)?
                    .add_observation(format!("Summary: {}", summary))?;
            }
            self.this_round_log_mut().summaries.push((name, log));
        }
        Ok(())
    }

    fn check_for_winner(&mut self) {
        if self.state.winner.is_some() {
            return;
        }
        let alive = self.this_round().players.clone();
        if let Some(team) = self.state.winner_for(&alive) {
            tracing::info!(winner = %team, "the game has a winner");
            self.state.winner = Some(team);
        }
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    /// Fans one decision out over every named player, bounded by the worker
    /// pool, and joins all results before returning. Result order is
    /// unspecified; callers aggregate into maps.
    async fn fan_out<T, F, Fut>(
        &self,
        names: &[String],
        run: F,
    ) -> Result<Vec<(String, T)>, GameError>
    where
        T: Send + 'static,
        F: Fn(PlayerActor) -> Fut,
        Fut: std::future::Future<Output = Result<T, GameError>> + Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.config.workers.max(1)));
        let mut tasks: JoinSet<(String, Result<T, GameError>)> = JoinSet::new();
        for name in names {
            let actor = self.actor(name)?;
            let semaphore = Arc::clone(&semaphore);
            let future = run(actor);
            let name = name.clone();
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                (name, future.await)
            });
        }

        let mut results = Vec::with_capacity(names.len());
        while let Some(joined) = tasks.join_next().await {
            let (name, result) = joined.map_err(|e| GameError::Join(e.to_string()))?;
            results.push((name, result?));
        }
        Ok(results)
    }

    fn actor(&self, name: &str) -> Result<PlayerActor, GameError> {
        let player = self.state.player(name)?.clone();
        Ok(PlayerActor::new(
            player,
            Arc::clone(&self.llm),
            ActorContext::from(&self.config),
        ))
    }

    fn this_round(&self) -> &Round {
        &self.state.rounds[self.current_round]
    }

    fn this_round_mut(&mut self) -> &mut Round {
        &mut self.state.rounds[self.current_round]
    }

    fn this_round_log_mut(&mut self) -> &mut RoundLog {
        &mut self.logs[self.current_round]
    }

    fn auto_save(&self) {
        if let Some(directory) = &self.log_directory {
            match persistence::save_game(&self.state, &self.logs, directory) {
                Ok(()) => tracing::debug!("auto-saved game state"),
                Err(e) => tracing::warn!(error = %e, "could not auto-save"),
            }
        }
    }
}

/// Narrows tied top bidders to those addressed in the previous dialogue.
/// With no previous dialogue, or none of them mentioned, all stay eligible.
fn speaker_candidates(top_bidders: Vec<String>, previous_dialogue: Option<&str>) -> Vec<String> {
    if let Some(dialogue) = previous_dialogue {
        let mentioned: Vec<String> = top_bidders
            .iter()
            .filter(|name| dialogue.contains(name.as_str()))
            .cloned()
            .collect();
        if !mentioned.is_empty() {
            return mentioned;
        }
    }
    top_bidders
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{LlmError, LlmRequest, LlmResponse};
    use async_trait::async_trait;
    use werewolf_domain::{Player, Role};

    #[test]
    fn mentioned_tied_bidder_is_strictly_preferred() {
        let top = vec!["Derek".to_string(), "Scott".to_string()];
        let candidates = speaker_candidates(top.clone(), Some("I think Derek is lying."));
        assert_eq!(candidates, vec!["Derek".to_string()]);

        // No dialogue yet: every tied bidder stays eligible.
        assert_eq!(speaker_candidates(top.clone(), None), top);

        // Neither mentioned: same.
        assert_eq!(
            speaker_candidates(top.clone(), Some("Someone here is lying.")),
            top
        );
    }

    /// Routes each prompt to a canned response by action marker, so a whole
    /// game can run against a deterministic script.
    struct ScriptedLlm;

    fn choose_from(prompt: &str) -> Vec<String> {
        prompt
            .split("Choose from: ")
            .nth(1)
            .and_then(|rest| rest.lines().next())
            .unwrap_or("")
            .split(", ")
            .map(|s| s.to_string())
            .collect()
    }

    fn choice(key: &str, value: &str) -> String {
        format!("{{\"reasoning\": \"scripted\", \"{}\": \"{}\"}}", key, value)
    }

    #[async_trait]
    impl LlmPort for ScriptedLlm {
        async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
            let prompt = &request.prompt;
            let round_zero = prompt.contains("It is currently Round 0.");
            let text = if prompt.contains("choose who to remove") {
                choice("remove", if round_zero { "Hayley" } else { "Ginger" })
            } else if prompt.contains("choose who to protect") {
                if round_zero {
                    choice("protect", "Hayley")
                } else {
                    // Unusable answer: exercises the random fallback.
                    "not even json".to_string()
                }
            } else if prompt.contains("choose who to investigate") {
                choice("investigate", "Scott")
            } else if prompt.contains("place a bid to speak next") {
                let bid = if prompt.contains("You are Hayley the Seer") {
                    "4"
                } else {
                    "0"
                };
                choice("bid", bid)
            } else if prompt.contains("You are speaking next as") {
                choice("say", "I am certain Scott is a Werewolf. Vote with me.")
            } else if prompt.contains("Decide who to vote out") {
                let options = choose_from(prompt);
                let target = ["Derek", "Scott", "Hayley"]
                    .iter()
                    .find(|name| options.iter().any(|o| o == *name))
                    .expect("a scripted vote target");
                choice("vote", target)
            } else if prompt.contains("Reflect on the round's debate") {
                choice("summary", "A tense day; I trust Hayley.")
            } else if prompt.contains("assess whether each other player") {
                r#"{"reasoning": "scripted", "assessments": []}"#.to_string()
            } else {
                return Err(LlmError::InvalidResponse("unmatched prompt".to_string()));
            };
            Ok(LlmResponse { text })
        }
    }

    /// Wolves eliminate the villager on night one and pull even: the game
    /// must end at the post-night win check with the remaining phases
    /// skipped and the round still marked successful.
    struct NightWinLlm;

    #[async_trait]
    impl LlmPort for NightWinLlm {
        async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
            let prompt = &request.prompt;
            let text = if prompt.contains("choose who to remove") {
                choice("remove", "Ginger")
            } else if prompt.contains("choose who to protect") {
                choice("protect", "David")
            } else if prompt.contains("choose who to investigate") {
                choice("investigate", "Derek")
            } else if prompt.contains("assess whether each other player") {
                r#"{"reasoning": "scripted", "assessments": []}"#.to_string()
            } else {
                return Err(LlmError::InvalidResponse("unmatched prompt".to_string()));
            };
            Ok(LlmResponse { text })
        }
    }

    fn roster() -> Vec<Player> {
        vec![
            Player::new("Derek", Role::Werewolf).with_model("test-model"),
            Player::new("Scott", Role::Werewolf).with_model("test-model"),
            Player::new("Hayley", Role::Seer).with_model("test-model"),
            Player::new("David", Role::Doctor).with_model("test-model"),
            Player::new("Ginger", Role::Villager).with_model("test-model"),
        ]
    }

    fn game(llm: Arc<dyn LlmPort>) -> GameMaster {
        let mut state = State::new("test-session", roster()).expect("valid roster");
        let names = state.player_names();
        for name in &names {
            let other_wolf = match name.as_str() {
                "Derek" => Some("Scott".to_string()),
                "Scott" => Some("Derek".to_string()),
                _ => None,
            };
            state
                .player_mut(name)
                .expect("player")
                .initialize_game_view(0, names.clone(), other_wolf);
        }
        let config = GameConfig {
            num_players: 5,
            max_debate_turns: 1,
            ..GameConfig::default()
        };
        GameMaster::new(state, Vec::new(), config, llm, None)
    }

    #[tokio::test(start_paused = true)]
    async fn werewolves_win_at_the_post_night_check() {
        let mut gm = game(Arc::new(NightWinLlm));
        let winner = gm.run_game().await.expect("game runs");
        assert_eq!(winner, Team::Werewolves);

        let state = gm.state();
        assert_eq!(state.rounds.len(), 1);
        let round = &state.rounds[0];
        assert!(round.success);
        assert_eq!(round.eliminated.as_deref(), Some("Ginger"));
        assert_eq!(round.protected.as_deref(), Some("David"));
        assert_eq!(round.unmasked.as_deref(), Some("Derek"));
        // Ginger removed, 2 wolves vs 2 others; no debate ever happened.
        assert_eq!(round.players.len(), 4);
        assert!(round.debate.is_empty());
        assert!(round.votes.is_empty());
        assert_eq!(round.role_assessments_post_night.len(), 4);

        // The seer permanently learned Derek's role.
        let seer = state.player("Hayley").expect("seer");
        assert_eq!(
            seer.previously_unmasked.get("Derek"),
            Some(&Role::Werewolf)
        );

        // Both wolves privately observed the decision.
        let wolf = state.player("Scott").expect("wolf");
        assert!(wolf
            .observations
            .iter()
            .any(|o| o.contains("we decided to eliminate Ginger")));

        // Log mirror is index-aligned and carries the night decisions.
        assert_eq!(gm.logs().len(), 1);
        assert!(gm.logs()[0].eliminate.is_some());
        assert!(gm.logs()[0].protect.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn villagers_win_by_exiling_both_wolves() {
        let mut gm = game(Arc::new(ScriptedLlm));
        let winner = gm.run_game().await.expect("game runs");
        assert_eq!(winner, Team::Villagers);

        let state = gm.state();
        assert_eq!(state.rounds.len(), 2);
        assert!(state.rounds.iter().all(|r| r.success));

        // Round 0: the doctor blocked the kill, then Derek was exiled 4-1.
        let first = &state.rounds[0];
        assert_eq!(first.eliminated.as_deref(), Some("Hayley"));
        assert_eq!(first.protected.as_deref(), Some("Hayley"));
        assert_eq!(first.exiled.as_deref(), Some("Derek"));
        assert!(first.players.iter().all(|p| p != "Derek"));
        assert!(first.players.iter().any(|p| p == "Hayley"));
        assert_eq!(first.votes.last().expect("tally").len(), 5);
        assert_eq!(first.bids.len(), 1);
        assert_eq!(first.debate.len(), 1);

        // Round 1: doctor decision failed but a random fallback still
        // protected someone; Scott was exiled and no wolves remain.
        let second = &state.rounds[1];
        assert!(second.protected.is_some());
        assert_eq!(second.exiled.as_deref(), Some("Scott"));
        assert!(second.players.iter().all(|p| p != "Scott"));

        // Voters recorded their final-vote reflections.
        let doctor = state.player("David").expect("doctor");
        assert!(doctor
            .observations
            .iter()
            .any(|o| o.contains("After the debate, I voted to remove")));

        // Seer history replayed both nights, one of them via fallback.
        let seer = state.player("Hayley").expect("seer");
        assert_eq!(seer.previously_unmasked.get("Scott"), Some(&Role::Werewolf));
        assert_eq!(seer.previously_unmasked.len(), 2);

        assert_eq!(gm.logs().len(), 2);
        assert_eq!(gm.logs()[0].votes.len(), 1);
        assert_eq!(gm.logs()[0].votes[0].len(), 5);
    }

    /// A werewolf decision failure is fatal and leaves the round marked
    /// unsuccessful, ready to be discarded on resume.
    struct FailingLlm;

    #[async_trait]
    impl LlmPort for FailingLlm {
        async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse, LlmError> {
            Ok(LlmResponse {
                text: "no json here".to_string(),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failed_elimination_aborts_the_round() {
        let mut gm = game(Arc::new(FailingLlm));
        let result = gm.run_game().await;
        assert!(matches!(
            result,
            Err(GameError::InvalidDecision { action: "elimination target", .. })
        ));
        assert_eq!(gm.state().rounds.len(), 1);
        assert!(!gm.state().rounds[0].success);
        assert_eq!(gm.logs().len(), 1);
    }
}
