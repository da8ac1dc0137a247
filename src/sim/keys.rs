//! Keystroke resolution
//!
//! Letter mode accepts any visible letter matching the key. Word and story
//! modes bind one visible word at a time and check the key against its next
//! character; a wrong key drops the binding and the word's progress.
//! Targets still above the top edge are not typeable yet, same as power-ups.

use super::events::{EventSink, GameEvent};
use super::scoring::{apply_multiplier, letter_score, word_score};
use super::state::{GameState, is_visible};
use super::tick::{refresh_level, start_overcharge};
use crate::normalize_key;

/// Resolve one key press and return the next state.
///
/// Non-letters and keys pressed after game over leave the state untouched.
pub fn handle_key(prev: &GameState, key: char, events: &mut dyn EventSink) -> GameState {
    if prev.game_over {
        return prev.clone();
    }
    let Some(key) = normalize_key(key) else {
        return prev.clone();
    };

    let mut state = prev.clone();
    state.keys_pressed += 1;
    state.last_key_pressed = Some(key);

    if state.mode.uses_words() {
        resolve_word_key(&mut state, key, events);
    } else {
        resolve_letter_key(&mut state, key, events);
    }

    refresh_level(&mut state, events);
    state
}

fn resolve_letter_key(state: &mut GameState, key: char, events: &mut dyn EventSink) {
    let Some(idx) = state
        .letters
        .iter()
        .position(|l| l.letter == key && is_visible(l.pos.y))
    else {
        if !queue_pickup(state, key) {
            let penalty = state.tuning.letter_miss_penalty;
            register_miss(state, penalty, events);
        }
        return;
    };

    let letter = state.letters.remove(idx);
    state.letters_correct += 1;
    state.score += apply_multiplier(letter_score(letter.letter), state.score_multiplier());
    speed_up(state);
    register_correct(state, events);
    events.emit(GameEvent::Correct);
}

fn resolve_word_key(state: &mut GameState, key: char, events: &mut dyn EventSink) {
    let bound = state
        .current_typing_word_id
        .and_then(|id| state.words.iter().position(|w| w.id == id));

    let Some(idx) = bound else {
        // Nothing bound (or the bound word is gone): try to acquire one
        state.current_typing_word_id = None;
        acquire_word(state, key, events);
        return;
    };

    if state.words[idx].next_char() == Some(key) {
        advance_word(state, idx, events);
    } else {
        state.words[idx].typed_progress = 0;
        state.current_typing_word_id = None;
        let penalty = state.tuning.word_miss_penalty;
        register_miss(state, penalty, events);
    }
}

/// Bind the first visible untouched word starting with `key`
fn acquire_word(state: &mut GameState, key: char, events: &mut dyn EventSink) {
    let found = state
        .words
        .iter()
        .position(|w| {
            w.typed_progress == 0 && w.first_char() == Some(key) && is_visible(w.pos.y)
        });

    match found {
        Some(idx) => {
            state.current_typing_word_id = Some(state.words[idx].id);
            advance_word(state, idx, events);
        }
        None => {
            if !queue_pickup(state, key) {
                let penalty = state.tuning.word_miss_penalty;
                register_miss(state, penalty, events);
            }
        }
    }
}

/// Confirm one more character of the bound word at `idx`
fn advance_word(state: &mut GameState, idx: usize, events: &mut dyn EventSink) {
    state.words[idx].typed_progress += 1;

    if state.words[idx].typed_progress < state.words[idx].len() {
        register_correct(state, events);
        events.emit(GameEvent::Correct);
        return;
    }

    let word = state.words.remove(idx);
    let points = apply_multiplier(word_score(&word.text), state.score_multiplier());
    state.letters_correct += word.len() as u64;
    state.score += points;
    state.current_typing_word_id = None;
    speed_up(state);
    register_correct(state, events);
    log::debug!("Completed {} for {} points", word.text, points);
    events.emit(GameEvent::WordComplete { points });
}

/// A key that only matches a power-up is a catch, not a miss.
///
/// Each visible power-up backs at most one queued catch; a repeat press with
/// nothing left to catch is a miss.
fn queue_pickup(state: &mut GameState, key: char) -> bool {
    let visible = state
        .power_ups
        .iter()
        .filter(|p| p.glyph == key && is_visible(p.pos.y))
        .count();
    let queued = state.pending_pickups.iter().filter(|&&g| g == key).count();
    if queued >= visible {
        return false;
    }
    state.pending_pickups.push(key);
    state.keys_correct += 1;
    state.last_key_correct = Some(true);
    true
}

fn speed_up(state: &mut GameState) {
    state.speed = (state.speed * state.tuning.speed_gain).min(state.tuning.max_speed);
}

/// Bookkeeping shared by every correct keystroke
fn register_correct(state: &mut GameState, events: &mut dyn EventSink) {
    state.keys_correct += 1;
    state.last_key_correct = Some(true);
    state.combo.hit();

    if !state.charge.overcharge_active {
        state.charge.current += 1;
        if state.charge.current >= state.charge.max {
            state.charge.current = 0;
            start_overcharge(state, events);
        }
    }
}

fn register_miss(state: &mut GameState, penalty: u64, events: &mut dyn EventSink) {
    state.score = state.score.saturating_sub(penalty);
    state.combo.reset();
    state.last_key_correct = Some(false);
    events.emit(GameEvent::WrongKey);
}
