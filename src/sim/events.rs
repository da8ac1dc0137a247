//! Side-effect signals for audio/visual collaborators
//!
//! Transitions never reach out to audio or UI directly; they emit
//! `GameEvent`s into whatever sink the caller injects.

use serde::{Deserialize, Serialize};

use super::state::PowerUpKind;

/// Something the presentation layer may want to react to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Keystroke hit a target
    Correct,
    /// Keystroke missed
    WrongKey,
    /// One or more targets landed this tick
    LifeLost { lives: u8 },
    /// Level went up
    LevelUp { level: u32 },
    /// Run ended
    GameOver,
    /// A word was finished (in place of `Correct` for the last letter)
    WordComplete { points: u64 },
    /// Power-up caught; `new_heart` when a Life grew the heart count
    PowerUpCaught { kind: PowerUpKind, new_heart: bool },
    /// A shield charge absorbed a landed target
    ShieldBlocked,
    OverchargeStarted,
    OverchargeEnded,
}

/// Receiver for game events
pub trait EventSink {
    fn emit(&mut self, event: GameEvent);
}

impl EventSink for Vec<GameEvent> {
    fn emit(&mut self, event: GameEvent) {
        self.push(event);
    }
}

/// Drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: GameEvent) {}
}

/// Adapts a closure into a sink
pub struct FnSink<F>(pub F);

impl<F: FnMut(GameEvent)> EventSink for FnSink<F> {
    fn emit(&mut self, event: GameEvent) {
        (self.0)(event)
    }
}
