//! Prompt templates and response schemas for every player action.
//!
//! Prompts are assembled from a typed context rather than a template engine:
//! a shared prefix (rules, state, private observations), an optional debate
//! transcript, and per-action instructions ending in the JSON shape the
//! model must produce.

use serde_json::{json, Value};
use werewolf_domain::Role;

/// Every decision a player can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Bid,
    Debate,
    Vote,
    Investigate,
    Eliminate,
    Protect,
    Summarize,
    AssessRoles,
}

impl Action {
    /// Key holding the decision inside the response object; None for
    /// free-text actions where the whole object is the result.
    pub fn result_key(&self) -> Option<&'static str> {
        match self {
            Self::Bid => Some("bid"),
            Self::Vote => Some("vote"),
            Self::Investigate => Some("investigate"),
            Self::Eliminate => Some("remove"),
            Self::Protect => Some("protect"),
            Self::Debate | Self::Summarize | Self::AssessRoles => None,
        }
    }

    /// Constrained choices sample cooler than free-text ones.
    pub fn temperature(&self) -> f32 {
        match self {
            Self::Bid | Self::Vote | Self::Investigate | Self::Eliminate | Self::Protect => 0.5,
            Self::Debate | Self::Summarize | Self::AssessRoles => 1.0,
        }
    }

    pub fn schema(&self) -> Value {
        match self {
            Self::Bid => choice_schema("bid"),
            Self::Vote => choice_schema("vote"),
            Self::Investigate => choice_schema("investigate"),
            Self::Eliminate => choice_schema("remove"),
            Self::Protect => choice_schema("protect"),
            Self::Debate => choice_schema("say"),
            Self::Summarize => choice_schema("summary"),
            Self::AssessRoles => json!({
                "type": "object",
                "properties": {
                    "reasoning": {"type": "string"},
                    "assessments": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "player": {"type": "string"},
                                "suspected_role": {
                                    "type": "string",
                                    "enum": ["Villager", "Werewolf"]
                                },
                                "confidence": {"type": "number", "minimum": 1, "maximum": 100}
                            },
                            "required": ["player", "suspected_role", "confidence"]
                        }
                    }
                },
                "required": ["reasoning", "assessments"]
            }),
        }
    }
}

fn json_shape(comment: &str, key: &str, key_comment: &str) -> String {
    format!(
        "```json\n{{\n\"reasoning\": \"string\", // {comment}\n\"{key}\": \"string\" // {key_comment}\n}}\n```",
    )
}

fn choice_schema(key: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "reasoning": {"type": "string"},
            (key): {"type": "string"},
        },
        "required": ["reasoning", key],
    })
}

/// Everything a prompt can mention, assembled from one player's view.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub name: String,
    pub role: Role,
    pub round: usize,
    pub personality: String,
    /// Private observations, already grouped and formatted by round.
    pub observations: Vec<String>,
    /// Shuffled remaining players, self marked with "(You)", comma-joined.
    pub remaining_players: String,
    /// Formatted debate lines for the current round.
    pub debate: Vec<String>,
    pub bidding_rationale: String,
    pub debate_turns_left: usize,
    pub num_players: usize,
    pub num_villagers: usize,
    /// Partner line for werewolves; empty otherwise.
    pub werewolf_context: String,
    /// Comma-joined legal options for constrained actions.
    pub options: String,
}

impl PromptContext {
    fn prefix(&self) -> String {
        let mut out = format!(
            "You are playing a digital version of the social deduction game Werewolf \
             (also known as Mafia).\n\n\
             GAME RULES:\n\
             - Player Roles: {num_players} players - 2 Werewolves, 1 Seer, 1 Doctor, {num_villagers} Villagers.\n\
             - Rounds consist of two phases:\n\
             - Night Phase: Werewolves remove a player. Seer identifies a player's role. \
             Doctor saves a player. If no one is removed, the Doctor saved the Werewolf's target.\n\
             - Day Phase: Players debate and vote to remove one player.\n\
             - Winning Conditions: Villagers win by voting out both Werewolves. \
             Werewolves win when they outnumber the Villagers.\n\n\
             GAME STATE:\n\
             - It is currently Round {round}.{fresh}\n\
             - You are {name} the {role}.{wolf_context}\n",
            num_players = self.num_players,
            num_villagers = self.num_villagers,
            round = self.round,
            fresh = if self.round == 0 { " The game has just begun." } else { "" },
            name = self.name,
            role = self.role,
            wolf_context = self.werewolf_context,
        );
        if !self.personality.is_empty() {
            out.push_str(&format!("- Personality: {}\n", self.personality));
        }
        out.push_str(&format!("- Remaining players: {}\n", self.remaining_players));
        if !self.observations.is_empty() {
            out.push_str("\nYOUR PRIVATE OBSERVATIONS:\n");
            for group in &self.observations {
                out.push_str(group);
                out.push('\n');
            }
        }
        out
    }

    fn debate_so_far(&self) -> String {
        let mut out = format!("\nROUND {} DEBATE:\n", self.round);
        if self.debate.is_empty() {
            out.push_str("The debate has not begun.\n");
        } else {
            for line in &self.debate {
                out.push_str(line);
                out.push('\n');
            }
        }
        out.push('\n');
        out
    }

    /// Renders the full prompt for one action.
    pub fn render(&self, action: Action) -> String {
        match action {
            Action::Bid => {
                let goal = if self.role == Role::Werewolf {
                    "- Consider if speaking or staying silent better serves your goal of sowing chaos and avoiding detection."
                } else {
                    "- If the discussion is off-track or you're under suspicion, consider speaking."
                };
                format!(
                    "{prefix}{debate}CONTEXT: You will place a bid to speak next. Highest bidder speaks first.\n\
                     - BID OPTIONS:\n\
                     0: I would like to observe and listen for now.\n\
                     1: I have some general thoughts to share.\n\
                     2: I have something critical to contribute.\n\
                     3: It is absolutely urgent for me to speak next.\n\
                     4: Someone has addressed me directly and I must respond.\n\
                     - You have {turns_left} chance(s) to speak left.\n\n\
                     INSTRUCTIONS:\n\
                     - Think strategically as {name} the {role}.\n\
                     - Prioritize speaking only when you have something impactful to contribute.\n\
                     {goal}\n\n{shape}",
                    prefix = self.prefix(),
                    debate = self.debate_so_far(),
                    turns_left = self.debate_turns_left,
                    name = self.name,
                    role = self.role,
                    shape = json_shape(
                        "How crucial is it for you to contribute right now? 1-2 sentences.",
                        "bid",
                        "Your bid as a single number: \"0\" | \"1\" | \"2\" | \"3\" | \"4\"",
                    ),
                )
            }
            Action::Debate => {
                let goal = if self.role == Role::Werewolf {
                    "- Your goal: sow chaos, evade detection, cast suspicion on Villagers.\n\
                     - Appear helpful while undermining Villagers. Use deception strategically."
                } else {
                    "- Your goal: uncover Werewolves and protect the Village.\n\
                     - Scrutinize accusations, expose inconsistencies, call out suspicious behavior."
                };
                format!(
                    "{prefix}{debate}INSTRUCTIONS:\n\
                     - You are speaking next as {name} the {role}.\n\
                     - Your thoughts on speaking: {rationale}\n\
                     {goal}\n\n{shape}",
                    prefix = self.prefix(),
                    debate = self.debate_so_far(),
                    name = self.name,
                    role = self.role,
                    rationale = self.bidding_rationale,
                    shape = json_shape(
                        "Your strategy: What do you want to achieve?",
                        "say",
                        "Your public statement. Be concise and persuasive.",
                    ),
                )
            }
            Action::Vote => format!(
                "{prefix}{debate}INSTRUCTIONS:\n\
                 - Decide who to vote out as {name} the {role}.\n\
                 - Your vote is private and will not be revealed to others.\n\
                 - You must choose someone.\n\n{shape}",
                prefix = self.prefix(),
                debate = self.debate_so_far(),
                name = self.name,
                role = self.role,
                shape = json_shape(
                    "Explain your reasoning.",
                    "vote",
                    &format!("Name of the player. Choose from: {}", self.options),
                ),
            ),
            Action::Investigate => format!(
                "{prefix}\nINSTRUCTIONS:\n\
                 - It is the Night Phase of Round {round}. As {name} the {role}, choose who to investigate.\n\
                 - You must choose someone.\n\n{shape}",
                prefix = self.prefix(),
                round = self.round,
                name = self.name,
                role = self.role,
                shape = json_shape(
                    "Analyze the evidence and justify your decision.",
                    "investigate",
                    &format!("Name of the player. Choose from: {}", self.options),
                ),
            ),
            Action::Eliminate => format!(
                "{prefix}\nINSTRUCTIONS:\n\
                 - It is the Night Phase of Round {round}. As {name} the {role}, choose who to remove.\n\
                 - Target influential players who threaten your anonymity.\n\
                 - You must choose someone.\n\n{shape}",
                prefix = self.prefix(),
                round = self.round,
                name = self.name,
                role = self.role,
                shape = json_shape(
                    "Explain your reasoning step-by-step.",
                    "remove",
                    &format!("Name of the player. Choose from: {}", self.options),
                ),
            ),
            Action::Protect => format!(
                "{prefix}\nINSTRUCTIONS:\n\
                 - It is the Night Phase of Round {round}. As {name} the {role}, choose who to protect.\n\
                 - Consider who Werewolves might target. Prioritize crucial roles like the Seer and yourself.\n\
                 - You must choose someone.\n\n{shape}",
                prefix = self.prefix(),
                round = self.round,
                name = self.name,
                role = self.role,
                shape = json_shape(
                    "Analyze the evidence and justify your decision.",
                    "protect",
                    &format!("Name of the player. Choose from: {}", self.options),
                ),
            ),
            Action::Summarize => format!(
                "{prefix}{debate}INSTRUCTIONS:\n\
                 - Reflect on the round's debate as {name} the {role}.\n\
                 - Evaluate statement credibility: does it align with what you know?\n\
                 - Identify potential allies and threats.\n\n{shape}",
                prefix = self.prefix(),
                debate = self.debate_so_far(),
                name = self.name,
                role = self.role,
                shape = json_shape(
                    "What should you remember and why is it important?",
                    "summary",
                    "Summarize key points and noteworthy observations. Be specific. \
                     Write from your perspective using \"I\" and \"me\".",
                ),
            ),
            Action::AssessRoles => format!(
                "{prefix}{debate}INSTRUCTIONS:\n\
                 - As {name} the {role}, assess whether each other player is a Villager or Werewolf.\n\
                 - For each player, provide your best guess and confidence (1-100).\n\
                 - IMPORTANT: Only assess Villager or Werewolf. Don't guess Seer or Doctor - \
                 classify as Villager if they seem good.\n\n\
                 ```json\n{{\n\
                 \"reasoning\": \"string\", // Briefly explain your thinking about who seems suspicious and why.\n\
                 \"assessments\": [ // For each other player (NOT yourself), provide an assessment\n\
                 {{\n\
                 \"player\": \"string\", // Name of the player you're assessing\n\
                 \"suspected_role\": \"string\", // Either \"Villager\" or \"Werewolf\"\n\
                 \"confidence\": 50 // Your confidence level from 1-100\n\
                 }}\n\
                 ]\n}}\n```",
                prefix = self.prefix(),
                debate = self.debate_so_far(),
                name = self.name,
                role = self.role,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> PromptContext {
        PromptContext {
            name: "Derek".into(),
            role: Role::Werewolf,
            round: 1,
            personality: String::new(),
            observations: vec!["Round 0:\n   - Summary: quiet night".into()],
            remaining_players: "Scott, Derek (You), Hayley".into(),
            debate: vec!["Scott: I accuse Derek.".into()],
            bidding_rationale: "I was named directly.".into(),
            debate_turns_left: 3,
            num_players: 7,
            num_villagers: 3,
            werewolf_context: " The other Werewolf is Scott.".into(),
            options: "Scott, Hayley".into(),
        }
    }

    #[test]
    fn constrained_actions_embed_their_options() {
        let prompt = context().render(Action::Vote);
        assert!(prompt.contains("Choose from: Scott, Hayley"));
        assert!(prompt.contains("You are Derek the Werewolf."));
    }

    #[test]
    fn night_actions_skip_the_debate_transcript() {
        let prompt = context().render(Action::Eliminate);
        assert!(!prompt.contains("ROUND 1 DEBATE"));
        assert!(prompt.contains("choose who to remove"));
    }

    #[test]
    fn bid_prompt_carries_turns_left_and_transcript() {
        let prompt = context().render(Action::Bid);
        assert!(prompt.contains("3 chance(s) to speak left"));
        assert!(prompt.contains("Scott: I accuse Derek."));
    }

    #[test]
    fn constrained_actions_run_cooler_than_free_text() {
        assert!(Action::Vote.temperature() < Action::Debate.temperature());
        assert_eq!(Action::Eliminate.result_key(), Some("remove"));
        assert_eq!(Action::Debate.result_key(), None);
    }
}
