//! Engine-level error types.

use thiserror::Error;
use werewolf_domain::DomainError;

use crate::infrastructure::ports::LlmError;

/// Errors raised while orchestrating, persisting, or resuming a game.
///
/// Invalid model decisions are fatal only where the design demands it:
/// werewolf eliminations, bids, votes, and debate statements propagate as
/// `InvalidDecision`, while doctor and seer failures are recovered with a
/// random fallback before this type ever gets involved.
#[derive(Debug, Error)]
pub enum GameError {
    /// The model exhausted its retry budget without a usable decision.
    #[error("{player} did not return a valid {action}")]
    InvalidDecision {
        player: String,
        action: &'static str,
    },

    /// No eligible speaker could be selected for the next debate turn.
    #[error("no eligible speaker could be selected")]
    NoSpeaker,

    /// The user interrupted the game; state is saved and resumable.
    #[error("Game interrupted")]
    Interrupted,

    /// The directory holds no partial or complete game to resume.
    #[error("no resumable game found in {0}")]
    NoResumableGame(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Task join error: {0}")]
    Join(String),
}
