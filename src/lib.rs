//! Typefall - An arcade typing trainer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (falling targets, keystrokes, scoring)
//! - `clock`: Fixed-timestep tick driver
//! - `session`: Session controller exposed to the presentation layer
//! - `platform`: Browser/native runners
//! - `tuning`: Data-driven game balance

pub mod clock;
pub mod error;
pub mod highscores;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use session::{Session, SessionPhase};
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Nominal simulation rate (steps per simulated second)
    pub const TICKS_PER_SECOND: u64 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / TICKS_PER_SECOND as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default playfield
    pub const DEFAULT_WIDTH: f32 = 800.0;
    pub const DEFAULT_HEIGHT: f32 = 600.0;
    pub const DEFAULT_ENTITY_SIZE: f32 = 32.0;
    /// Smallest glyph we will lay out
    pub const MIN_ENTITY_SIZE: f32 = 8.0;
    /// Horizontal advance of one character inside a word, relative to glyph size
    pub const WORD_CHAR_WIDTH: f32 = 0.6;

    /// Rejection-sampling attempts before accepting an overlapping spawn
    pub const SPAWN_ATTEMPTS: u32 = 50;

    /// Home-row keys (cheap to type, worth less)
    pub const HOME_ROW: [char; 7] = ['A', 'S', 'D', 'F', 'J', 'K', 'L'];
}

/// Convert a tick count into whole seconds of play
#[inline]
pub fn ticks_to_secs(ticks: u64) -> u64 {
    ticks / consts::TICKS_PER_SECOND
}

/// Normalize a key press to an uppercase ASCII letter, or `None` if it is not one
#[inline]
pub fn normalize_key(key: char) -> Option<char> {
    key.is_ascii_alphabetic().then(|| key.to_ascii_uppercase())
}
