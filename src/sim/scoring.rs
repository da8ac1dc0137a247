//! Point values, level thresholds and combo multipliers
//!
//! Pure functions only.

use crate::consts::HOME_ROW;

/// `letters_correct` needed for each level (level 1 starts at 0)
pub const LEVEL_THRESHOLDS: [u64; 5] = [0, 25, 75, 150, 300];

/// Highest reachable level
pub const MAX_LEVEL: u32 = LEVEL_THRESHOLDS.len() as u32;

/// (minimum streak, multiplier), ascending
const COMBO_TIERS: [(u32, f32); 5] = [(0, 1.0), (5, 1.5), (10, 2.0), (20, 2.5), (40, 3.0)];

/// Home-row letters are worth 1, everything else 3
pub fn letter_score(letter: char) -> u64 {
    if HOME_ROW.contains(&letter.to_ascii_uppercase()) {
        1
    } else {
        3
    }
}

/// Sum of the letter values; strictly grows with length
pub fn word_score(word: &str) -> u64 {
    word.chars().map(letter_score).sum()
}

/// Level (1-based) for a number of correct letters, clamped at the top tier
pub fn level_for(letters_correct: u64) -> u32 {
    LEVEL_THRESHOLDS
        .iter()
        .filter(|&&threshold| letters_correct >= threshold)
        .count() as u32
}

/// Score multiplier for a streak of consecutive correct keystrokes
pub fn combo_multiplier(streak: u32) -> f32 {
    COMBO_TIERS
        .iter()
        .rev()
        .find(|(min, _)| streak >= *min)
        .map(|(_, mult)| *mult)
        .unwrap_or(1.0)
}

/// Points for `base` at `multiplier`, rounded to the nearest point
pub fn apply_multiplier(base: u64, multiplier: f32) -> u64 {
    (base as f64 * multiplier as f64).round() as u64
}

/// Upper bound on targets spawned in one batch at `level`
pub fn spawn_batch_for(level: u32) -> usize {
    1 + (level.max(1) as usize - 1) / 2
}
