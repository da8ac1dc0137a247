//! Game state and core simulation types
//!
//! `GameState` is the single authoritative snapshot. Transitions in `tick`
//! and `keys` take a previous state and return the next one.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::scoring::{combo_multiplier, level_for};
use crate::consts::*;
use crate::tuning::Tuning;
use crate::ticks_to_secs;

/// Which targets fall and how keystrokes resolve against them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Single letters; any visible match counts
    #[default]
    Letter,
    /// Random words; one word typed at a time, prefix by prefix
    Word,
    /// Like `Word`, but the words come in order from a passage
    Story,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Letter => "Letter",
            Mode::Word => "Word",
            Mode::Story => "Story",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "letter" | "letters" => Some(Mode::Letter),
            "word" | "words" => Some(Mode::Word),
            "story" => Some(Mode::Story),
            _ => None,
        }
    }

    /// Word and Story share the word collection and resolver
    pub fn uses_words(&self) -> bool {
        !matches!(self, Mode::Letter)
    }
}

/// Playfield bounds supplied by the layout collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
    /// Glyph height (and width of a single letter)
    pub entity_size: f32,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            entity_size: DEFAULT_ENTITY_SIZE,
        }
    }
}

impl Dimensions {
    pub fn new(width: f32, height: f32, entity_size: f32) -> Self {
        Self {
            width,
            height,
            entity_size,
        }
    }

    /// Clamp to a playable field; non-finite values fall back to defaults
    pub fn clamped(&self) -> Self {
        let size = if self.entity_size.is_finite() {
            self.entity_size.max(MIN_ENTITY_SIZE)
        } else {
            DEFAULT_ENTITY_SIZE
        };
        let width = if self.width.is_finite() {
            self.width
        } else {
            DEFAULT_WIDTH
        };
        let height = if self.height.is_finite() {
            self.height
        } else {
            DEFAULT_HEIGHT
        };
        Self {
            width: width.max(size * 2.0),
            height: height.max(size * 4.0),
            entity_size: size,
        }
    }
}

/// Whether something at height `y` has fully entered the playfield.
///
/// Targets and power-ups spawn above the top edge; until they are visible
/// they cannot be typed or caught.
#[inline]
pub fn is_visible(y: f32) -> bool {
    y >= 0.0
}

/// Monotonic id source for one entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdCounter {
    next: u32,
}

impl Default for IdCounter {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdCounter {
    /// Allocate a new id; never hands out the same id twice
    pub fn allocate(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Next id that would be allocated
    pub fn peek(&self) -> u32 {
        self.next
    }
}

/// One counter per entity kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdCounters {
    pub letters: IdCounter,
    pub words: IdCounter,
    pub shields: IdCounter,
    pub lives: IdCounter,
    pub multipliers: IdCounter,
}

/// A falling letter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Letter {
    pub id: u32,
    /// Uppercase ASCII letter
    pub letter: char,
    pub pos: Vec2,
    /// 0xRRGGBB
    pub color: u32,
}

/// A falling word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub id: u32,
    /// Uppercase ASCII letters
    pub text: String,
    /// Count of confirmed-correct leading characters
    pub typed_progress: usize,
    pub pos: Vec2,
    pub color: u32,
}

impl Word {
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Character the player must type next, if any remain
    pub fn next_char(&self) -> Option<char> {
        self.text.chars().nth(self.typed_progress)
    }

    pub fn first_char(&self) -> Option<char> {
        self.text.chars().next()
    }
}

/// Power-up kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Shield,
    Life,
    Multiplier,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [PowerUpKind::Shield, PowerUpKind::Life, PowerUpKind::Multiplier];
}

/// A falling power-up, caught by typing its glyph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub glyph: char,
    pub pos: Vec2,
}

/// The three power-up collections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerUps {
    pub shields: Vec<PowerUp>,
    pub lives: Vec<PowerUp>,
    pub multipliers: Vec<PowerUp>,
}

impl PowerUps {
    pub fn of(&self, kind: PowerUpKind) -> &Vec<PowerUp> {
        match kind {
            PowerUpKind::Shield => &self.shields,
            PowerUpKind::Life => &self.lives,
            PowerUpKind::Multiplier => &self.multipliers,
        }
    }

    pub fn of_mut(&mut self, kind: PowerUpKind) -> &mut Vec<PowerUp> {
        match kind {
            PowerUpKind::Shield => &mut self.shields,
            PowerUpKind::Life => &mut self.lives,
            PowerUpKind::Multiplier => &mut self.multipliers,
        }
    }

    /// All power-ups, shields first
    pub fn iter(&self) -> impl Iterator<Item = &PowerUp> {
        self.shields
            .iter()
            .chain(self.lives.iter())
            .chain(self.multipliers.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PowerUp> {
        self.shields
            .iter_mut()
            .chain(self.lives.iter_mut())
            .chain(self.multipliers.iter_mut())
    }

    pub fn len(&self) -> usize {
        self.shields.len() + self.lives.len() + self.multipliers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Streak of consecutive correct keystrokes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Combo {
    pub count: u32,
    /// Always `combo_multiplier(count)`
    pub multiplier: f32,
}

impl Default for Combo {
    fn default() -> Self {
        Self {
            count: 0,
            multiplier: 1.0,
        }
    }
}

impl Combo {
    pub fn hit(&mut self) {
        self.count += 1;
        self.multiplier = combo_multiplier(self.count);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Shield charges absorb targets that reach the bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShieldState {
    pub active: bool,
    pub charges: u8,
    pub max_charges: u8,
}

/// Charge meter and the overcharge bonus it unlocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeState {
    pub current: u32,
    pub max: u32,
    pub overcharge_active: bool,
    /// Tick at which overcharge ends
    pub overcharge_end_time: u64,
}

/// What the persistence collaborator gets at game over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub mode: Mode,
    pub score: u64,
    pub letters_correct: u64,
    /// Percent of keystrokes that were correct
    pub accuracy: f32,
    pub time_played_secs: u64,
    pub level: u32,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub mode: Mode,
    /// Run seed for reproducibility
    pub seed: u64,
    /// Active letters (letter mode only)
    pub letters: Vec<Letter>,
    /// Active words (word/story mode)
    pub words: Vec<Word>,
    pub power_ups: PowerUps,
    /// Simulation tick counter
    pub time: u64,
    pub letters_correct: u64,
    pub score: u64,
    /// Fall-speed multiplier, within [start_speed, max_speed]
    pub speed: f32,
    pub keys_pressed: u64,
    /// Keystrokes that hit something (accuracy stat)
    pub keys_correct: u64,
    pub lives: u8,
    pub max_lives: u8,
    pub combo: Combo,
    pub shield: ShieldState,
    pub charge: ChargeState,
    /// Word currently being typed, by id
    pub current_typing_word_id: Option<u32>,
    pub last_key_pressed: Option<char>,
    pub last_key_correct: Option<bool>,
    pub game_over: bool,
    /// Always `level_for(letters_correct)`
    pub level: u32,
    /// Power-up glyphs typed since the last tick, resolved in order by the next tick
    pub pending_pickups: Vec<char>,
    /// Next word index into the story passage
    pub story_cursor: usize,
    pub ids: IdCounters,
    pub tuning: Tuning,
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// Create a new game state with the given mode, seed and balance
    pub fn new(mode: Mode, seed: u64, tuning: Tuning) -> Self {
        let tuning = tuning.sanitized();
        Self {
            mode,
            seed,
            letters: Vec::new(),
            words: Vec::new(),
            power_ups: PowerUps::default(),
            time: 0,
            letters_correct: 0,
            score: 0,
            speed: tuning.start_speed,
            keys_pressed: 0,
            keys_correct: 0,
            lives: tuning.start_lives,
            max_lives: tuning.start_lives,
            combo: Combo::default(),
            shield: ShieldState {
                active: false,
                charges: 0,
                max_charges: tuning.shield_max_charges,
            },
            charge: ChargeState {
                current: 0,
                max: tuning.charge_max,
                overcharge_active: false,
                overcharge_end_time: 0,
            },
            current_typing_word_id: None,
            last_key_pressed: None,
            last_key_correct: None,
            game_over: false,
            level: level_for(0),
            pending_pickups: Vec::new(),
            story_cursor: 0,
            ids: IdCounters::default(),
            tuning,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Score multiplier in effect right now (combo, boosted while overcharged)
    pub fn score_multiplier(&self) -> f32 {
        if self.charge.overcharge_active {
            self.combo.multiplier * self.tuning.overcharge_factor
        } else {
            self.combo.multiplier
        }
    }

    /// Fall distance per tick for the active target kind
    pub fn effective_speed(&self) -> f32 {
        let base = self.speed * self.tuning.fall_rate;
        if self.mode.uses_words() {
            base * self.tuning.word_fall_factor
        } else {
            base
        }
    }

    /// Number of targets in the active collection
    pub fn active_len(&self) -> usize {
        if self.mode.uses_words() {
            self.words.len()
        } else {
            self.letters.len()
        }
    }

    /// Cap of the active collection
    pub fn active_cap(&self) -> usize {
        if self.mode.uses_words() {
            self.tuning.max_words
        } else {
            self.tuning.max_letters
        }
    }

    /// Periodic spawn interval for the active mode
    pub fn spawn_interval(&self) -> u64 {
        if self.mode.uses_words() {
            self.tuning.word_spawn_interval
        } else {
            self.tuning.letter_spawn_interval
        }
    }

    /// The word bound to `current_typing_word_id`
    pub fn typing_word(&self) -> Option<&Word> {
        let id = self.current_typing_word_id?;
        self.words.iter().find(|w| w.id == id)
    }

    /// Percent of keystrokes that hit something
    pub fn accuracy(&self) -> f32 {
        if self.keys_pressed == 0 {
            100.0
        } else {
            self.keys_correct as f32 / self.keys_pressed as f32 * 100.0
        }
    }

    pub fn time_played_secs(&self) -> u64 {
        ticks_to_secs(self.time)
    }

    /// Final numbers for the leaderboard
    pub fn summary(&self) -> GameSummary {
        GameSummary {
            mode: self.mode,
            score: self.score,
            letters_correct: self.letters_correct,
            accuracy: self.accuracy(),
            time_played_secs: self.time_played_secs(),
            level: self.level,
        }
    }

    /// Add a letter at a fixed position (scenario setup and tests)
    pub fn push_letter(&mut self, letter: char, pos: Vec2) -> u32 {
        let id = self.ids.letters.allocate();
        self.letters.push(Letter {
            id,
            letter: letter.to_ascii_uppercase(),
            pos,
            color: 0xFFFFFF,
        });
        id
    }

    /// Add a word at a fixed position (scenario setup and tests)
    pub fn push_word(&mut self, text: &str, pos: Vec2) -> u32 {
        let id = self.ids.words.allocate();
        self.words.push(Word {
            id,
            text: text.to_ascii_uppercase(),
            typed_progress: 0,
            pos,
            color: 0xFFFFFF,
        });
        id
    }

    /// Add a power-up at a fixed position (scenario setup and tests)
    pub fn push_power_up(&mut self, kind: PowerUpKind, glyph: char, pos: Vec2) -> u32 {
        let id = match kind {
            PowerUpKind::Shield => self.ids.shields.allocate(),
            PowerUpKind::Life => self.ids.lives.allocate(),
            PowerUpKind::Multiplier => self.ids.multipliers.allocate(),
        };
        self.power_ups.of_mut(kind).push(PowerUp {
            id,
            kind,
            glyph: glyph.to_ascii_uppercase(),
            pos,
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let state = GameState::new(Mode::Word, 7, Tuning::default());
        assert_eq!(state.lives, 3);
        assert_eq!(state.max_lives, 3);
        assert_eq!(state.level, 1);
        assert_eq!(state.speed, 1.0);
        assert_eq!(state.combo.multiplier, 1.0);
        assert!(state.current_typing_word_id.is_none());
        assert!(!state.game_over);
        assert_eq!(state.accuracy(), 100.0);
    }

    #[test]
    fn test_id_counter_never_repeats() {
        let mut counter = IdCounter::default();
        let a = counter.allocate();
        let b = counter.allocate();
        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert_eq!(counter.peek(), 3);
    }

    #[test]
    fn test_dimensions_clamp() {
        let dims = Dimensions::new(-50.0, f32::NAN, 2.0).clamped();
        assert_eq!(dims.entity_size, MIN_ENTITY_SIZE);
        assert_eq!(dims.width, MIN_ENTITY_SIZE * 2.0);
        assert_eq!(dims.height, DEFAULT_HEIGHT);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(Mode::from_str(" Words "), Some(Mode::Word));
        assert_eq!(Mode::from_str("story"), Some(Mode::Story));
        assert_eq!(Mode::from_str("poem"), None);
        assert!(!Mode::Letter.uses_words());
    }

    #[test]
    fn test_word_mode_falls_slower() {
        let letters = GameState::new(Mode::Letter, 1, Tuning::default());
        let words = GameState::new(Mode::Word, 1, Tuning::default());
        assert!(words.effective_speed() < letters.effective_speed());
    }

    #[test]
    fn test_overcharge_boosts_multiplier() {
        let mut state = GameState::new(Mode::Letter, 1, Tuning::default());
        state.charge.overcharge_active = true;
        assert_eq!(state.score_multiplier(), 2.0);
    }
}
