//! Error types for the fallible edges of the game.
//!
//! The simulation itself never fails; these cover settings files and the
//! leaderboard hand-off.

use std::io;

/// Problems reading or writing settings
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Leaderboard submission failures
#[derive(thiserror::Error, Debug)]
pub enum LeaderboardError {
    #[error("Nickname must be 1-{max} visible characters")]
    InvalidNickname { max: usize },

    #[error("Invalid score: {0}")]
    InvalidScore(String),

    #[error("Leaderboard storage unavailable: {0}")]
    Storage(#[from] io::Error),

    #[error("Leaderboard data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl LeaderboardError {
    /// Storage hiccups can be retried; validation failures cannot
    pub fn is_retryable(&self) -> bool {
        matches!(self, LeaderboardError::Storage(_))
    }
}
