//! Data-driven game balance
//!
//! Every knob that changes how the game plays lives here so it can be
//! overridden from settings without touching the simulation.

use serde::{Deserialize, Serialize};

/// Most shield charges any configuration may hold
pub const SHIELD_CHARGES_LIMIT: u8 = 9;

/// Game balance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Fall-speed multiplier at session start (also the floor)
    pub start_speed: f32,
    /// Fall-speed multiplier ceiling
    pub max_speed: f32,
    /// Multiplicative speed gain on every hit
    pub speed_gain: f32,
    /// Pixels per tick at speed 1.0
    pub fall_rate: f32,
    /// Words fall slower than letters
    pub word_fall_factor: f32,

    /// Ticks between periodic spawns in letter mode
    pub letter_spawn_interval: u64,
    /// Ticks between periodic spawns in word/story mode
    pub word_spawn_interval: u64,
    /// Max letters on screen
    pub max_letters: usize,
    /// Max words on screen
    pub max_words: usize,

    /// Points lost on a letter-mode miss
    pub letter_miss_penalty: u64,
    /// Points lost on a word-mode miss (acquisition or mid-word)
    pub word_miss_penalty: u64,

    /// Lives at session start (also the starting heart count)
    pub start_lives: u8,
    /// Hearts can never grow beyond this
    pub lives_cap: u8,
    /// Shield charges cap
    pub shield_max_charges: u8,

    /// Correct keystrokes needed to fill the charge meter
    pub charge_max: u32,
    /// Overcharge length in ticks
    pub overcharge_ticks: u64,
    /// Score multiplier applied on top of the combo while overcharged
    pub overcharge_factor: f32,

    /// Ticks between power-up spawn rolls
    pub powerup_interval: u64,
    /// Probability a power-up spawns on each roll
    pub powerup_chance: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            start_speed: 1.0,
            max_speed: 3.0,
            speed_gain: 1.02,
            fall_rate: 1.0,
            word_fall_factor: 0.6,

            letter_spawn_interval: 60,
            word_spawn_interval: 90,
            max_letters: 8,
            max_words: 5,

            // Balance values, not structural: word misses hurt more
            letter_miss_penalty: 3,
            word_miss_penalty: 5,

            start_lives: 3,
            lives_cap: 5,
            shield_max_charges: 3,

            charge_max: 20,
            overcharge_ticks: 300,
            overcharge_factor: 2.0,

            powerup_interval: 600,
            powerup_chance: 0.5,
        }
    }
}

impl Tuning {
    /// Repair values that would stall or break the simulation
    pub fn sanitized(mut self) -> Self {
        let defaults = Tuning::default();
        if !self.start_speed.is_finite() || self.start_speed <= 0.0 {
            self.start_speed = defaults.start_speed;
        }
        if !self.max_speed.is_finite() || self.max_speed < self.start_speed {
            self.max_speed = self.start_speed;
        }
        if !self.speed_gain.is_finite() || self.speed_gain < 1.0 {
            self.speed_gain = 1.0;
        }
        if !self.fall_rate.is_finite() || self.fall_rate <= 0.0 {
            self.fall_rate = defaults.fall_rate;
        }
        if !self.word_fall_factor.is_finite() || self.word_fall_factor <= 0.0 {
            self.word_fall_factor = defaults.word_fall_factor;
        }
        self.letter_spawn_interval = self.letter_spawn_interval.max(1);
        self.word_spawn_interval = self.word_spawn_interval.max(1);
        self.max_letters = self.max_letters.max(1);
        self.max_words = self.max_words.max(1);
        self.start_lives = self.start_lives.max(1);
        self.lives_cap = self.lives_cap.max(self.start_lives);
        self.shield_max_charges = self.shield_max_charges.min(SHIELD_CHARGES_LIMIT);
        self.charge_max = self.charge_max.max(1);
        if !self.overcharge_factor.is_finite() || self.overcharge_factor < 1.0 {
            self.overcharge_factor = 1.0;
        }
        self.powerup_interval = self.powerup_interval.max(1);
        self.powerup_chance = if self.powerup_chance.is_finite() {
            self.powerup_chance.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }
}
