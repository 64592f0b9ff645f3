//! Game configuration.
//!
//! All tunables are carried on an explicit value handed to the orchestrator
//! at construction, so concurrent games and tests can vary them
//! independently. `from_env` applies `WEREWOLF_*` overrides on top of the
//! defaults.

/// Pool of player names (famous werewolves, according to Wikipedia).
pub const DEFAULT_NAMES: &[&str] = &[
    "Derek", "Scott", "Jacob", "Isaac", "Hayley", "David", "Tyler", "Ginger",
    "Jackson", "Mason", "Dan", "Bert", "Will", "Sam", "Paul", "Leah", "Harold",
];

#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Total players per game: 2 Werewolves, 1 Seer, 1 Doctor, rest Villagers.
    pub num_players: usize,
    /// Debate turns per round.
    pub max_debate_turns: usize,
    /// Model-call attempts before a decision is declared failed.
    pub retries: u32,
    /// Collect a vote tally after every debate turn (dense metrics) rather
    /// than only after the final one.
    pub synthetic_votes: bool,
    /// Bound on concurrent per-player model calls within a phase.
    pub workers: usize,
    /// Name pool that rosters are sampled from.
    pub names: Vec<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            num_players: 7,
            max_debate_turns: 4,
            retries: 2,
            synthetic_votes: true,
            workers: 2,
            names: DEFAULT_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl GameConfig {
    /// Defaults overridden by `WEREWOLF_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            num_players: env_parse("WEREWOLF_NUM_PLAYERS", defaults.num_players),
            max_debate_turns: env_parse("WEREWOLF_DEBATE_TURNS", defaults.max_debate_turns),
            retries: env_parse("WEREWOLF_RETRIES", defaults.retries),
            synthetic_votes: env_parse("WEREWOLF_SYNTHETIC_VOTES", defaults.synthetic_votes),
            workers: env_parse("WEREWOLF_WORKERS", defaults.workers),
            names: defaults.names,
        }
    }

    /// Villager seats once the four special roles are accounted for.
    pub fn num_villagers(&self) -> usize {
        self.num_players.saturating_sub(4)
    }

    /// A random roster's worth of names from the pool.
    pub fn sample_names(&self, rng: &mut impl rand::Rng) -> Vec<String> {
        use rand::seq::SliceRandom;
        self.names
            .choose_multiple(rng, self.num_players)
            .cloned()
            .collect()
    }
}

fn env_parse<T: std::str::FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampled_rosters_have_the_configured_size_and_unique_names() {
        let config = GameConfig::default();
        let names = config.sample_names(&mut rand::thread_rng());
        assert_eq!(names.len(), config.num_players);
        let unique: std::collections::BTreeSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn default_seven_player_game_has_three_villagers() {
        assert_eq!(GameConfig::default().num_villagers(), 3);
    }
}
