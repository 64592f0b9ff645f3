//! Actor layer: turns a player snapshot into model-backed decisions.
//!
//! A `PlayerActor` wraps a read-only clone of one player together with the
//! shared LLM port. Role-specific behavior is dispatched on the player's
//! role tag: each decision narrows the legal option set, renders the prompt
//! from the player's view, and runs the generation service. Actors never
//! write shared state; observations and other side effects are applied by
//! the orchestrator after each phase barrier.

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::seq::SliceRandom;
use serde_json::Value;

use werewolf_domain::{BeliefReport, DomainError, GameView, Player, Role};

use crate::config::GameConfig;
use crate::error::GameError;
use crate::generation::{self, GenerationConfig, GenerationRequest, LmLog};
use crate::infrastructure::ports::LlmPort;
use crate::prompts::{Action, PromptContext};

/// The slice of game configuration actors need for prompting and retries.
#[derive(Debug, Clone)]
pub struct ActorContext {
    pub max_debate_turns: usize,
    pub num_players: usize,
    pub generation: GenerationConfig,
}

impl From<&GameConfig> for ActorContext {
    fn from(config: &GameConfig) -> Self {
        Self {
            max_debate_turns: config.max_debate_turns,
            num_players: config.num_players,
            generation: GenerationConfig {
                retries: config.retries,
                ..GenerationConfig::default()
            },
        }
    }
}

pub struct PlayerActor {
    player: Player,
    llm: Arc<dyn LlmPort>,
    ctx: ActorContext,
}

impl PlayerActor {
    pub fn new(player: Player, llm: Arc<dyn LlmPort>, ctx: ActorContext) -> Self {
        Self { player, llm, ctx }
    }

    pub fn name(&self) -> &str {
        &self.player.name
    }

    /// Chooses an exile target from all other alive players.
    pub async fn vote(&self) -> Result<(Option<String>, LmLog), GameError> {
        let options = vote_options(&self.player)?;
        let (value, log) = self.generate_action(Action::Vote, options).await?;
        Ok((as_string(value), log))
    }

    /// Bids 0-4 for the right to speak next.
    pub async fn bid(&self) -> Result<(Option<u8>, LmLog), GameError> {
        let options = (0u8..=4).map(|b| b.to_string()).collect();
        let (value, log) = self.generate_action(Action::Bid, options).await?;
        let bid = value
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok());
        Ok((bid, log))
    }

    /// Produces a public debate statement.
    pub async fn debate(&self) -> Result<(Option<String>, LmLog), GameError> {
        let (value, log) = self.generate_action(Action::Debate, Vec::new()).await?;
        let say = value
            .and_then(|v| v.get("say").and_then(Value::as_str).map(str::to_string));
        Ok((say, log))
    }

    /// Produces a private end-of-round reflection.
    pub async fn summarize(&self) -> Result<(Option<String>, LmLog), GameError> {
        let (value, log) = self.generate_action(Action::Summarize, Vec::new()).await?;
        let summary = value.and_then(|v| {
            v.get("summary")
                .and_then(Value::as_str)
                .map(|s| s.trim_matches('"').to_string())
        });
        Ok((summary, log))
    }

    /// Reports who this player believes everyone else is. Metrics only.
    pub async fn assess_roles(&self) -> Result<(Option<BeliefReport>, LmLog), GameError> {
        let (value, log) = self.generate_action(Action::AssessRoles, Vec::new()).await?;
        let report = value
            .and_then(|v| serde_json::from_value::<BeliefReport>(v).ok())
            .filter(|r| r.validate().is_ok());
        Ok((report, log))
    }

    /// Werewolf only: chooses the night's elimination target.
    pub async fn eliminate(&self) -> Result<(Option<String>, LmLog), GameError> {
        let options = eliminate_options(&self.player)?;
        let (value, log) = self.generate_action(Action::Eliminate, options).await?;
        Ok((as_string(value), log))
    }

    /// Seer only: chooses who to investigate tonight.
    pub async fn unmask(&self) -> Result<(Option<String>, LmLog), GameError> {
        let options = unmask_options(&self.player)?;
        let (value, log) = self.generate_action(Action::Investigate, options).await?;
        Ok((as_string(value), log))
    }

    /// Doctor only: chooses who to protect tonight.
    pub async fn save(&self) -> Result<(Option<String>, LmLog), GameError> {
        let options = save_options(&self.player)?;
        let (value, log) = self.generate_action(Action::Protect, options).await?;
        Ok((as_string(value), log))
    }

    async fn generate_action(
        &self,
        action: Action,
        mut options: Vec<String>,
    ) -> Result<(Option<Value>, LmLog), GameError> {
        options.shuffle(&mut rand::thread_rng());
        let context = self.prompt_context(&options)?;
        let request = GenerationRequest {
            model: self.player.model.clone(),
            prompt: context.render(action),
            schema: action.schema(),
            temperature: action.temperature(),
            allowed_values: action.result_key().is_some().then(|| options.clone()),
            result_key: action.result_key(),
        };
        Ok(generation::generate(self.llm.as_ref(), request, &self.ctx.generation).await)
    }

    fn prompt_context(&self, options: &[String]) -> Result<PromptContext, DomainError> {
        let view = self.player.view()?;

        let mut remaining: Vec<String> = view
            .current_players
            .iter()
            .map(|p| {
                if *p == self.player.name {
                    format!("{} (You)", p)
                } else {
                    p.clone()
                }
            })
            .collect();
        remaining.shuffle(&mut rand::thread_rng());

        let debate = view
            .debate
            .iter()
            .map(|(author, dialogue)| {
                if *author == self.player.name {
                    format!("{} (You): {}", author, dialogue)
                } else {
                    format!("{}: {}", author, dialogue)
                }
            })
            .collect();

        Ok(PromptContext {
            name: self.player.name.clone(),
            role: self.player.role,
            round: view.round_number,
            personality: self.player.personality.clone(),
            observations: group_observations(&self.player.observations),
            remaining_players: remaining.join(", "),
            debate,
            bidding_rationale: self.player.bidding_rationale.clone(),
            debate_turns_left: self.ctx.max_debate_turns.saturating_sub(view.debate.len()),
            num_players: self.ctx.num_players,
            num_villagers: self.ctx.num_players.saturating_sub(4),
            werewolf_context: werewolf_context(&self.player, view),
            options: options.join(", "),
        })
    }
}

/// Exile vote: anyone alive except yourself.
pub fn vote_options(player: &Player) -> Result<Vec<String>, DomainError> {
    Ok(player
        .view()?
        .current_players
        .iter()
        .filter(|p| p.as_str() != player.name)
        .cloned()
        .collect())
}

/// Elimination: anyone alive except yourself and your partner werewolf.
pub fn eliminate_options(player: &Player) -> Result<Vec<String>, DomainError> {
    let view = player.view()?;
    Ok(view
        .current_players
        .iter()
        .filter(|p| p.as_str() != player.name && Some(p.as_str()) != view.other_wolf.as_deref())
        .cloned()
        .collect())
}

/// Investigation: anyone alive not yet investigated, except yourself.
pub fn unmask_options(player: &Player) -> Result<Vec<String>, DomainError> {
    let view = player.view()?;
    Ok(view
        .current_players
        .iter()
        .filter(|p| p.as_str() != player.name && !player.previously_unmasked.contains_key(p.as_str()))
        .cloned()
        .collect())
}

/// Protection: anyone alive, including yourself.
pub fn save_options(player: &Player) -> Result<Vec<String>, DomainError> {
    Ok(player.view()?.current_players.clone())
}

fn as_string(value: Option<Value>) -> Option<String> {
    value.and_then(|v| v.as_str().map(str::to_string))
}

fn werewolf_context(player: &Player, view: &GameView) -> String {
    if player.role != Role::Werewolf {
        return String::new();
    }
    match &view.other_wolf {
        Some(partner) if view.current_players.contains(partner) => {
            format!(" The other Werewolf is {}.", partner)
        }
        Some(partner) => format!(
            " The other Werewolf, {}, was exiled by the Villagers. Only you remain.",
            partner
        ),
        None => String::new(),
    }
}

/// Groups raw "Round N: text" observations into one formatted block per
/// round for prompt rendering.
fn group_observations(observations: &[String]) -> Vec<String> {
    let mut grouped: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for obs in observations {
        let (round, text) = match obs.split_once(':') {
            Some((tag, rest)) => (
                tag.trim()
                    .strip_prefix("Round ")
                    .and_then(|n| n.trim().parse().ok())
                    .unwrap_or(0),
                rest.trim().replace('"', ""),
            ),
            None => (0, obs.clone()),
        };
        grouped.entry(round).or_default().push(text);
    }
    grouped
        .into_iter()
        .map(|(round, items)| {
            let lines: Vec<String> = items.iter().map(|i| format!("   - {}", i)).collect();
            format!("Round {}:\n{}", round, lines.join("\n"))
        })
        .collect()
}
