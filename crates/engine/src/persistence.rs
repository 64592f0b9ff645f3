//! Durable session storage.
//!
//! Each session owns a directory holding a game-state document and a
//! parallel decision-log document. A `game_partial.json` signals an
//! interrupted or failed session that can be resumed; `game_complete.json`
//! with no partial alongside it signals a finished session ready for
//! analysis.

use std::fs;
use std::path::{Path, PathBuf};

use werewolf_domain::State;

use crate::error::GameError;
use crate::logs::RoundLog;

pub const PARTIAL_STATE_FILE: &str = "game_partial.json";
pub const COMPLETE_STATE_FILE: &str = "game_complete.json";
pub const LOG_FILE: &str = "game_logs.json";

/// A fresh timestamped session directory under the working directory.
pub fn log_directory() -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
    PathBuf::from("output_metrics")
        .join("logs")
        .join(format!("session_{}", timestamp))
}

/// Writes the state and logs, choosing partial vs. complete by the state's
/// error flag. Completing a session removes any stale partial file.
pub fn save_game(state: &State, logs: &[RoundLog], directory: &Path) -> Result<(), GameError> {
    fs::create_dir_all(directory)?;

    let partial = directory.join(PARTIAL_STATE_FILE);
    let state_file = if state.error_message.is_empty() {
        if partial.exists() {
            fs::remove_file(&partial)?;
        }
        directory.join(COMPLETE_STATE_FILE)
    } else {
        partial
    };

    fs::write(&state_file, serde_json::to_string_pretty(state)?)?;
    fs::write(
        directory.join(LOG_FILE),
        serde_json::to_string_pretty(logs)?,
    )?;
    Ok(())
}

/// Loads a session, preferring the partial (resumable) document over the
/// complete one. A directory with neither is not a resumable game.
pub fn load_game(directory: &Path) -> Result<(State, Vec<RoundLog>), GameError> {
    let partial = directory.join(PARTIAL_STATE_FILE);
    let complete = directory.join(COMPLETE_STATE_FILE);
    let state_file = if partial.exists() {
        partial
    } else if complete.exists() {
        complete
    } else {
        return Err(GameError::NoResumableGame(
            directory.display().to_string(),
        ));
    };

    let state: State = serde_json::from_str(&fs::read_to_string(state_file)?)?;

    let log_file = directory.join(LOG_FILE);
    if !log_file.exists() {
        return Err(GameError::NoResumableGame(
            directory.display().to_string(),
        ));
    }
    let logs: Vec<RoundLog> = serde_json::from_str(&fs::read_to_string(log_file)?)?;

    Ok((state, logs))
}
