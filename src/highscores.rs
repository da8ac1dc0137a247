//! High score leaderboard system
//!
//! Tracks the top 10 finished games. Natively persisted as a JSON file,
//! on the web in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::error::LeaderboardError;
use crate::sim::{GameSummary, Mode};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Longest nickname accepted (after trimming)
pub const MAX_NICKNAME_LEN: usize = 16;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub nickname: String,
    pub score: u64,
    pub mode: Mode,
    pub letters_correct: u64,
    pub accuracy: f32,
    pub time_played_secs: u64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

/// Trim and check a nickname
pub fn validate_nickname(raw: &str) -> Result<String, LeaderboardError> {
    let nickname = raw.trim();
    let len = nickname.chars().count();
    if len == 0 || len > MAX_NICKNAME_LEN || nickname.chars().any(char::is_control) {
        return Err(LeaderboardError::InvalidNickname {
            max: MAX_NICKNAME_LEN,
        });
    }
    Ok(nickname.to_string())
}

/// Reject summaries no real game could have produced
pub fn validate_summary(summary: &GameSummary) -> Result<(), LeaderboardError> {
    if !summary.accuracy.is_finite() || !(0.0..=100.0).contains(&summary.accuracy) {
        return Err(LeaderboardError::InvalidScore(format!(
            "accuracy {} out of range",
            summary.accuracy
        )));
    }
    if summary.score > 0 && summary.letters_correct == 0 {
        return Err(LeaderboardError::InvalidScore(
            "points without any correct letters".to_string(),
        ));
    }
    Ok(())
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "typefall_highscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Validate and record a finished game.
    ///
    /// Returns the rank achieved (1-indexed), or `None` if it didn't qualify.
    pub fn submit(
        &mut self,
        nickname: &str,
        summary: &GameSummary,
        timestamp: f64,
    ) -> Result<Option<usize>, LeaderboardError> {
        let nickname = validate_nickname(nickname)?;
        validate_summary(summary)?;

        if !self.qualifies(summary.score) {
            return Ok(None);
        }

        let entry = HighScoreEntry {
            nickname,
            score: summary.score,
            mode: summary.mode,
            letters_correct: summary.letters_correct,
            accuracy: summary.accuracy,
            time_played_secs: summary.time_played_secs,
            timestamp,
        };

        // Find insertion point (sorted descending by score)
        let pos = self.entries.iter().position(|e| summary.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Ok(Some(rank))
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load high scores from a JSON file; a missing file is an empty board
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Result<Self, LeaderboardError> {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let scores: HighScores = serde_json::from_str(&json)?;
                log::info!("Loaded {} high scores", scores.entries.len());
                Ok(scores)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No high scores found, starting fresh");
                Ok(Self::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Save high scores to a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), LeaderboardError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(scores) = serde_json::from_str::<HighScores>(&json) {
                    log::info!("Loaded {} high scores", scores.entries.len());
                    return scores;
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) -> Result<(), LeaderboardError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| {
                LeaderboardError::Storage(std::io::Error::other("LocalStorage unavailable"))
            })?;

        let json = serde_json::to_string(self)?;
        storage.set_item(Self::STORAGE_KEY, &json).map_err(|_| {
            LeaderboardError::Storage(std::io::Error::other("LocalStorage write failed"))
        })?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}
