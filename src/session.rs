//! Game session controller
//!
//! Owns the authoritative `GameState` and publishes a new snapshot after
//! every tick or key. Presentation code reads snapshots, sends keys and
//! resets, and drains the signals each transition produced.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::clock::Simulation;
use crate::settings::Settings;
use crate::sim::{self, Dimensions, EventSink, GameEvent, GameState, GameSummary, Mode};
use crate::tuning::Tuning;

/// Session lifecycle: Idle -> Running -> GameOver -> (reset) -> Running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No game started yet
    Idle,
    Running,
    GameOver,
}

/// Buffers every event and forwards it to an optional listener
struct Fanout<'a> {
    buffer: &'a mut Vec<GameEvent>,
    listener: Option<&'a mut dyn EventSink>,
}

impl EventSink for Fanout<'_> {
    fn emit(&mut self, event: GameEvent) {
        if let Some(listener) = self.listener.as_mut() {
            listener.emit(event);
        }
        self.buffer.push(event);
    }
}

/// One player's game, from mode selection to game over and every reset
pub struct Session {
    state: GameState,
    phase: SessionPhase,
    dims: Dimensions,
    tuning: Tuning,
    fixed_seed: Option<u64>,
    seeds: Pcg32,
    events: Vec<GameEvent>,
    listener: Option<Box<dyn EventSink>>,
}

impl Session {
    /// Create an idle session; `seed` drives every run's seed
    pub fn new(settings: &Settings, seed: u64) -> Self {
        let tuning = settings.tuning.clone().sanitized();
        Self {
            state: GameState::new(settings.default_mode, settings.seed.unwrap_or(seed), tuning.clone()),
            phase: SessionPhase::Idle,
            dims: settings.dimensions.clamped(),
            tuning,
            fixed_seed: settings.seed,
            seeds: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            listener: None,
        }
    }

    /// Adopt new settings; balance and seed changes take effect on the next reset
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.tuning = settings.tuning.clone().sanitized();
        self.fixed_seed = settings.seed;
    }

    /// Forward every signal to `listener` as it happens
    pub fn subscribe(&mut self, listener: Box<dyn EventSink>) {
        self.listener = Some(listener);
    }

    /// Current snapshot
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// Apply new layout bounds; positions already on screen are kept
    pub fn set_dimensions(&mut self, dims: Dimensions) {
        self.dims = dims.clamped();
    }

    /// Start a fresh run in `mode`, from any phase
    pub fn reset(&mut self, mode: Mode) {
        let seed = self.fixed_seed.unwrap_or_else(|| self.seeds.random());
        self.state = GameState::new(mode, seed, self.tuning.clone());
        self.phase = SessionPhase::Running;
        log::info!("Session started: mode={} seed={}", mode.as_str(), seed);
    }

    /// Feed one key press to the running game
    pub fn handle_key(&mut self, key: char) {
        if self.phase != SessionPhase::Running {
            return;
        }
        let mut sink = Fanout {
            buffer: &mut self.events,
            listener: self.listener.as_deref_mut().map(|l| l as &mut dyn EventSink),
        };
        self.state = sim::handle_key(&self.state, key, &mut sink);
    }

    /// Advance the running game by one tick
    pub fn tick(&mut self) {
        if self.phase != SessionPhase::Running {
            return;
        }
        let mut sink = Fanout {
            buffer: &mut self.events,
            listener: self.listener.as_deref_mut().map(|l| l as &mut dyn EventSink),
        };
        self.state = sim::tick(&self.state, &self.dims, &mut sink);

        if self.state.game_over {
            self.phase = SessionPhase::GameOver;
        }
    }

    /// Take the signals produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Final numbers once the game is over
    pub fn summary(&self) -> Option<GameSummary> {
        (self.phase == SessionPhase::GameOver).then(|| self.state.summary())
    }
}

impl Simulation for Session {
    fn step(&mut self) {
        self.tick();
    }

    fn is_over(&self) -> bool {
        self.phase != SessionPhase::Running
    }
}
