//! Browser bindings
//!
//! The page owns the render loop and the DOM. It calls `frame` from
//! `requestAnimationFrame`, forwards `keydown` events, and reads snapshots
//! and signals back as JSON.

use wasm_bindgen::prelude::*;

use crate::clock::TickDriver;
use crate::highscores::HighScores;
use crate::session::{Session, SessionPhase};
use crate::settings::Settings;
use crate::sim::{Dimensions, Mode};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Typefall starting...");
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Game instance handed to JavaScript
#[wasm_bindgen]
pub struct WebGame {
    session: Session,
    driver: TickDriver,
    settings: Settings,
    last_time: Option<f64>,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebGame {
        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        log::info!("Game initialized with seed: {}", seed);
        WebGame {
            session: Session::new(&settings, seed),
            driver: TickDriver::new(),
            settings,
            last_time: None,
        }
    }

    /// Start a run; `mode` is "letter", "word" or "story"
    pub fn reset(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode = Mode::from_str(mode)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown mode: {mode}")))?;
        self.session.reset(mode);
        self.driver.start();
        self.last_time = None;
        Ok(())
    }

    /// Animation frame callback; returns the number of ticks run
    pub fn frame(&mut self, now_ms: f64) -> u32 {
        let dt = match self.last_time {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_time = Some(now_ms);
        self.driver.advance(dt, &mut self.session)
    }

    /// Forward a `KeyboardEvent.key`; anything longer than one character is ignored
    pub fn handle_key(&mut self, key: &str) {
        let mut chars = key.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            self.session.handle_key(c);
        }
    }

    pub fn resize(&mut self, width: f32, height: f32, entity_size: f32) {
        self.session
            .set_dimensions(Dimensions::new(width, height, entity_size));
    }

    pub fn is_over(&self) -> bool {
        self.session.phase() == SessionPhase::GameOver
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.session.state()).map_err(to_js)
    }

    /// Signals since the last call, as a JSON array
    pub fn drain_events(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.drain_events()).map_err(to_js)
    }

    pub fn summary_json(&self) -> Result<Option<String>, JsValue> {
        self.session
            .summary()
            .map(|s| serde_json::to_string(&s))
            .transpose()
            .map_err(to_js)
    }

    pub fn volume(&self) -> f32 {
        self.settings.effective_volume()
    }

    pub fn mute_on_blur(&self) -> bool {
        self.settings.mute_on_blur
    }

    pub fn reduced_motion(&self) -> bool {
        self.settings.reduced_motion
    }

    pub fn settings_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.settings).map_err(to_js)
    }

    /// Replace and persist the settings; balance changes apply from the next reset
    pub fn save_settings(&mut self, json: &str) -> Result<(), JsValue> {
        let settings = Settings::from_json(json).map_err(to_js)?;
        settings.save();
        self.session.apply_settings(&settings);
        self.settings = settings;
        Ok(())
    }

    /// Rank the finished game would take, shown before asking for a nickname
    pub fn potential_rank(&self) -> Option<u32> {
        let summary = self.session.summary()?;
        HighScores::load()
            .potential_rank(summary.score)
            .map(|r| r as u32)
    }

    pub fn top_score(&self) -> Option<u64> {
        HighScores::load().top_score()
    }

    /// Record the finished game; returns the rank, or nothing if it didn't place
    pub fn submit_score(&self, nickname: &str) -> Result<Option<u32>, JsValue> {
        let summary = self
            .session
            .summary()
            .ok_or_else(|| JsValue::from_str("Game is still running"))?;
        let mut board = HighScores::load();
        let rank = board
            .submit(nickname, &summary, js_sys::Date::now())
            .map_err(to_js)?;
        if rank.is_some() {
            board.save().map_err(to_js)?;
        }
        Ok(rank.map(|r| r as u32))
    }

    pub fn high_scores_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&HighScores::load()).map_err(to_js)
    }
}

impl Default for WebGame {
    fn default() -> Self {
        Self::new()
    }
}
