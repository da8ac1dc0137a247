//! Fixed timestep simulation tick
//!
//! Advances falling entities, resolves landings and pending power-up
//! catches, spawns new targets and keeps the derived level current.

use rand::Rng;

use super::events::{EventSink, GameEvent};
use super::factory::{self, Span, near_top_spans, next_word_text, word_width};
use super::scoring::{level_for, spawn_batch_for};
use super::state::{Dimensions, GameState, PowerUpKind, is_visible};

/// Advance the game by one step and return the next state.
///
/// A finished game is returned unchanged.
pub fn tick(prev: &GameState, dims: &Dimensions, events: &mut dyn EventSink) -> GameState {
    if prev.game_over {
        return prev.clone();
    }

    let dims = dims.clamped();
    let mut state = prev.clone();

    state.time += 1;

    expire_overcharge(&mut state, events);

    // Catches use last tick's positions, the ones the player saw
    for glyph in std::mem::take(&mut state.pending_pickups) {
        resolve_pickup(&mut state, glyph, events);
    }

    // Move everything down
    let fall = state.effective_speed();
    for letter in state.letters.iter_mut() {
        letter.pos.y += fall;
    }
    for word in state.words.iter_mut() {
        word.pos.y += fall;
    }
    for power_up in state.power_ups.iter_mut() {
        power_up.pos.y += fall;
    }

    // Remove whatever reached the bottom
    let floor = dims.height;
    let size = dims.entity_size;
    let mut landed = 0u32;

    let before = state.letters.len();
    state.letters.retain(|l| l.pos.y + size < floor);
    landed += (before - state.letters.len()) as u32;

    let before = state.words.len();
    let mut typing_word_landed = false;
    let typing_id = state.current_typing_word_id;
    state.words.retain(|w| {
        let keep = w.pos.y + size < floor;
        if !keep && Some(w.id) == typing_id {
            typing_word_landed = true;
        }
        keep
    });
    landed += (before - state.words.len()) as u32;
    if typing_word_landed {
        state.current_typing_word_id = None;
    }

    // Power-ups that land are simply lost
    for kind in PowerUpKind::ALL {
        state.power_ups.of_mut(kind).retain(|p| p.pos.y + size < floor);
    }

    apply_landings(&mut state, landed, events);

    if state.lives == 0 {
        state.game_over = true;
        state.pending_pickups.clear();
        log::info!(
            "Game over: score={} letters={} level={} time={}s",
            state.score,
            state.letters_correct,
            state.level,
            state.time_played_secs()
        );
        events.emit(GameEvent::GameOver);
        return state;
    }

    spawn_targets(&mut state, &dims);
    spawn_power_ups(&mut state, &dims);

    refresh_level(&mut state, events);

    state
}

/// Each landed target costs a shield charge if one is left, otherwise a life
fn apply_landings(state: &mut GameState, landed: u32, events: &mut dyn EventSink) {
    if landed == 0 {
        return;
    }

    let lives_before = state.lives;
    for _ in 0..landed {
        if state.shield.charges > 0 {
            state.shield.charges -= 1;
            events.emit(GameEvent::ShieldBlocked);
        } else {
            state.lives = state.lives.saturating_sub(1);
        }
    }
    state.shield.active = state.shield.charges > 0;

    if state.lives < lives_before {
        log::debug!("Life lost: {} -> {}", lives_before, state.lives);
        events.emit(GameEvent::LifeLost { lives: state.lives });
    }
}

/// End overcharge once its time is up
fn expire_overcharge(state: &mut GameState, events: &mut dyn EventSink) {
    if state.charge.overcharge_active && state.time >= state.charge.overcharge_end_time {
        state.charge.overcharge_active = false;
        events.emit(GameEvent::OverchargeEnded);
    }
}

/// Turn on overcharge, or extend it if it is already running
pub(crate) fn start_overcharge(state: &mut GameState, events: &mut dyn EventSink) {
    let duration = state.tuning.overcharge_ticks;
    if state.charge.overcharge_active {
        state.charge.overcharge_end_time += duration;
    } else {
        state.charge.overcharge_active = true;
        state.charge.overcharge_end_time = state.time + duration;
        events.emit(GameEvent::OverchargeStarted);
    }
}

/// Catch one visible power-up showing `glyph`, shields first
fn resolve_pickup(state: &mut GameState, glyph: char, events: &mut dyn EventSink) {
    let caught = PowerUpKind::ALL.into_iter().find_map(|kind| {
        state
            .power_ups
            .of(kind)
            .iter()
            .position(|p| p.glyph == glyph && is_visible(p.pos.y))
            .map(|idx| (kind, idx))
    });

    let Some((kind, idx)) = caught else {
        return;
    };
    state.power_ups.of_mut(kind).remove(idx);

    let mut new_heart = false;
    match kind {
        PowerUpKind::Shield => {
            state.shield.charges = state
                .shield
                .charges
                .saturating_add(1)
                .min(state.shield.max_charges);
            state.shield.active = state.shield.charges > 0;
        }
        PowerUpKind::Life => {
            if state.lives < state.max_lives {
                state.lives += 1;
            } else if state.max_lives < state.tuning.lives_cap {
                state.max_lives += 1;
                state.lives += 1;
                new_heart = true;
            }
        }
        PowerUpKind::Multiplier => start_overcharge(state, events),
    }

    log::debug!("Caught {:?} power-up (new heart: {})", kind, new_heart);
    events.emit(GameEvent::PowerUpCaught { kind, new_heart });
}

/// Top up the active collection when it empties or the spawn interval elapses
fn spawn_targets(state: &mut GameState, dims: &Dimensions) {
    let len = state.active_len();
    let cap = state.active_cap();
    if len >= cap {
        return;
    }
    let due = len == 0 || state.time % state.spawn_interval() == 0;
    if !due {
        return;
    }

    let room = cap - len;
    let most = spawn_batch_for(state.level).min(room);
    let count = state.rng.random_range(1..=most);

    let mut spans = near_top_spans(state, dims);
    for _ in 0..count {
        if state.mode.uses_words() {
            let text = next_word_text(state.mode, &mut state.story_cursor, &mut state.rng);
            let word = factory::spawn_word(text, &spans, &mut state.ids.words, dims, &mut state.rng);
            spans.push(Span {
                x: word.pos.x,
                width: word_width(word.len(), dims),
            });
            state.words.push(word);
        } else {
            let letter =
                factory::spawn_letter(&spans, &mut state.ids.letters, dims, &mut state.rng);
            spans.push(Span {
                x: letter.pos.x,
                width: dims.entity_size,
            });
            state.letters.push(letter);
        }
    }
}

/// Roll for a power-up every power-up interval; one of each kind at a time
fn spawn_power_ups(state: &mut GameState, dims: &Dimensions) {
    if state.time % state.tuning.powerup_interval != 0 {
        return;
    }
    if !state.rng.random_bool(state.tuning.powerup_chance) {
        return;
    }

    let kind = PowerUpKind::ALL[state.rng.random_range(0..PowerUpKind::ALL.len())];
    if !state.power_ups.of(kind).is_empty() {
        return;
    }

    let spans = near_top_spans(state, dims);
    let ids = match kind {
        PowerUpKind::Shield => &mut state.ids.shields,
        PowerUpKind::Life => &mut state.ids.lives,
        PowerUpKind::Multiplier => &mut state.ids.multipliers,
    };
    let power_up = factory::spawn_power_up(kind, &spans, ids, dims, &mut state.rng);
    state.power_ups.of_mut(kind).push(power_up);
}

/// Recompute the level from `letters_correct`, signalling increases
pub(crate) fn refresh_level(state: &mut GameState, events: &mut dyn EventSink) {
    let level = level_for(state.letters_correct);
    if level > state.level {
        log::debug!("Level up: {} -> {}", state.level, level);
        events.emit(GameEvent::LevelUp { level });
    }
    state.level = level;
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::sim::events::NullSink;
    use crate::sim::keys::handle_key;
    use crate::sim::state::Mode;
    use crate::tuning::{SHIELD_CHARGES_LIMIT, Tuning};

    fn dims() -> Dimensions {
        Dimensions::default()
    }

    /// Tuning without periodic spawns or power-ups, for exact scenarios
    fn quiet() -> Tuning {
        Tuning {
            letter_spawn_interval: 1_000_000,
            word_spawn_interval: 1_000_000,
            powerup_interval: 1_000_000,
            ..Default::default()
        }
    }

    #[test]
    fn test_first_tick_spawns_targets() {
        let state = GameState::new(Mode::Letter, 12345, Tuning::default());
        let next = tick(&state, &dims(), &mut NullSink);
        assert_eq!(next.time, 1);
        assert!(!next.letters.is_empty());
        assert!(next.words.is_empty());

        let state = GameState::new(Mode::Word, 12345, Tuning::default());
        let next = tick(&state, &dims(), &mut NullSink);
        assert!(!next.words.is_empty());
        assert!(next.letters.is_empty());
    }

    #[test]
    fn test_tick_does_not_touch_previous_state() {
        let state = GameState::new(Mode::Letter, 1, Tuning::default());
        let snapshot = state.clone();
        let _ = tick(&state, &dims(), &mut NullSink);
        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_letters_fall_by_effective_speed() {
        let mut state = GameState::new(Mode::Letter, 1, quiet());
        state.push_letter('Q', Vec2::new(100.0, 50.0));
        state.speed = 2.0;
        let next = tick(&state, &dims(), &mut NullSink);
        assert_eq!(next.letters[0].pos.y, 52.0);
    }

    #[test]
    fn test_landing_costs_one_life_and_signals_once() {
        let mut state = GameState::new(Mode::Letter, 1, quiet());
        let id = state.push_letter('Q', Vec2::new(100.0, 600.0 - 32.0 - 0.5));
        state.push_letter('W', Vec2::new(300.0, 100.0));

        let mut events = Vec::new();
        let next = tick(&state, &dims(), &mut events);

        assert_eq!(next.lives, 2);
        assert!(next.letters.iter().all(|l| l.id != id));
        let lost: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, GameEvent::LifeLost { .. }))
            .collect();
        assert_eq!(lost, vec![&GameEvent::LifeLost { lives: 2 }]);
    }

    #[test]
    fn test_two_landings_one_signal() {
        let mut state = GameState::new(Mode::Letter, 1, quiet());
        state.push_letter('Q', Vec2::new(100.0, 590.0));
        state.push_letter('W', Vec2::new(300.0, 590.0));

        let mut events = Vec::new();
        let next = tick(&state, &dims(), &mut events);
        assert_eq!(next.lives, 1);
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::LifeLost { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn test_game_over_latches_and_freezes() {
        let mut state = GameState::new(Mode::Letter, 1, quiet());
        state.lives = 1;
        state.push_letter('Q', Vec2::new(100.0, 590.0));

        let mut events = Vec::new();
        let over = tick(&state, &dims(), &mut events);
        assert!(over.game_over);
        assert_eq!(over.lives, 0);
        assert!(over.letters.is_empty(), "no spawns on the terminal tick");
        assert_eq!(
            events.iter().filter(|e| **e == GameEvent::GameOver).count(),
            1
        );

        let mut later = Vec::new();
        let again = tick(&over, &dims(), &mut later);
        assert_eq!(again, over);
        assert!(later.is_empty());
    }

    #[test]
    fn test_landed_typing_word_clears_binding() {
        let mut state = GameState::new(Mode::Word, 1, quiet());
        let id = state.push_word("CAT", Vec2::new(100.0, 590.0));
        state.words[0].typed_progress = 1;
        state.current_typing_word_id = Some(id);
        state.push_word("DOG", Vec2::new(400.0, 100.0));

        let next = tick(&state, &dims(), &mut NullSink);
        assert!(next.current_typing_word_id.is_none());
        assert_eq!(next.lives, 2);
        assert!(next.words.iter().all(|w| w.id != id));
    }

    #[test]
    fn test_shield_absorbs_landing() {
        let mut state = GameState::new(Mode::Letter, 1, quiet());
        state.shield.charges = 1;
        state.shield.active = true;
        state.push_letter('Q', Vec2::new(100.0, 590.0));

        let mut events = Vec::new();
        let next = tick(&state, &dims(), &mut events);
        assert_eq!(next.lives, 3);
        assert_eq!(next.shield.charges, 0);
        assert!(!next.shield.active);
        assert!(events.contains(&GameEvent::ShieldBlocked));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::LifeLost { .. })));
    }

    #[test]
    fn test_power_up_landing_is_free() {
        let mut state = GameState::new(Mode::Letter, 1, quiet());
        state.push_letter('W', Vec2::new(300.0, 100.0));
        state.push_power_up(PowerUpKind::Life, 'X', Vec2::new(100.0, 590.0));
        let next = tick(&state, &dims(), &mut NullSink);
        assert_eq!(next.lives, 3);
        assert!(next.power_ups.is_empty());
    }

    #[test]
    fn test_pending_life_pickup_adds_heart() {
        let mut state = GameState::new(Mode::Letter, 1, quiet());
        state.push_letter('W', Vec2::new(300.0, 100.0));
        state.push_power_up(PowerUpKind::Life, 'X', Vec2::new(100.0, 100.0));
        state.pending_pickups.push('X');

        let mut events = Vec::new();
        let next = tick(&state, &dims(), &mut events);
        assert_eq!(next.lives, 4);
        assert_eq!(next.max_lives, 4);
        assert!(next.pending_pickups.is_empty());
        assert!(next.power_ups.is_empty());
        assert!(events.contains(&GameEvent::PowerUpCaught {
            kind: PowerUpKind::Life,
            new_heart: true
        }));
    }

    #[test]
    fn test_life_pickup_refills_before_growing() {
        let mut state = GameState::new(Mode::Letter, 1, quiet());
        state.lives = 2;
        state.push_power_up(PowerUpKind::Life, 'X', Vec2::new(100.0, 100.0));
        state.pending_pickups.push('X');
        let next = tick(&state, &dims(), &mut NullSink);
        assert_eq!(next.lives, 3);
        assert_eq!(next.max_lives, 3);
    }

    #[test]
    fn test_life_pickup_respects_cap() {
        let mut state = GameState::new(Mode::Letter, 1, quiet());
        state.lives = 5;
        state.max_lives = 5;
        state.push_power_up(PowerUpKind::Life, 'X', Vec2::new(100.0, 100.0));
        state.pending_pickups.push('X');
        let next = tick(&state, &dims(), &mut NullSink);
        assert_eq!(next.lives, 5);
        assert_eq!(next.max_lives, 5);
    }

    #[test]
    fn test_shield_pickup_caps_charges() {
        let mut state = GameState::new(Mode::Letter, 1, quiet());
        state.shield.charges = 3;
        state.push_power_up(PowerUpKind::Shield, 'Z', Vec2::new(100.0, 100.0));
        state.pending_pickups.push('Z');
        let next = tick(&state, &dims(), &mut NullSink);
        assert_eq!(next.shield.charges, 3);
        assert!(next.shield.active);
    }

    #[test]
    fn test_multiplier_pickup_overcharges_then_expires() {
        let tuning = Tuning {
            overcharge_ticks: 3,
            ..quiet()
        };
        let mut state = GameState::new(Mode::Letter, 1, tuning);
        state.push_letter('W', Vec2::new(300.0, 100.0));
        state.push_power_up(PowerUpKind::Multiplier, 'M', Vec2::new(100.0, 100.0));
        state.pending_pickups.push('M');

        let mut events = Vec::new();
        let mut next = tick(&state, &dims(), &mut events);
        assert!(next.charge.overcharge_active);
        assert_eq!(next.charge.overcharge_end_time, 4);
        assert_eq!(next.score_multiplier(), 2.0);
        assert!(events.contains(&GameEvent::OverchargeStarted));

        for _ in 0..3 {
            next = tick(&next, &dims(), &mut events);
        }
        assert!(!next.charge.overcharge_active);
        assert!(events.contains(&GameEvent::OverchargeEnded));
    }

    #[test]
    fn test_every_queued_pickup_resolves() {
        let mut state = GameState::new(Mode::Letter, 1, quiet());
        state.push_letter('W', Vec2::new(300.0, 100.0));
        state.push_power_up(PowerUpKind::Shield, 'Z', Vec2::new(100.0, 100.0));
        state.push_power_up(PowerUpKind::Life, 'X', Vec2::new(200.0, 100.0));
        let state = handle_key(&state, 'z', &mut NullSink);
        let state = handle_key(&state, 'x', &mut NullSink);
        assert_eq!(state.keys_correct, 2);

        let mut events = Vec::new();
        let next = tick(&state, &dims(), &mut events);
        assert_eq!(next.shield.charges, 1);
        assert_eq!(next.lives, 4);
        assert!(next.power_ups.is_empty());
        assert!(next.pending_pickups.is_empty());
        let caught = events
            .iter()
            .filter(|e| matches!(e, GameEvent::PowerUpCaught { .. }))
            .count();
        assert_eq!(caught, 2);
    }

    #[test]
    fn test_shield_pickup_at_byte_limit_does_not_overflow() {
        let mut state = GameState::new(Mode::Letter, 1, quiet());
        state.shield.max_charges = u8::MAX;
        state.shield.charges = u8::MAX;
        state.push_power_up(PowerUpKind::Shield, 'Z', Vec2::new(100.0, 100.0));
        state.pending_pickups.push('Z');
        let next = tick(&state, &dims(), &mut NullSink);
        assert_eq!(next.shield.charges, u8::MAX);
        assert!(next.power_ups.is_empty());
    }

    #[test]
    fn test_oversized_shield_tuning_is_clamped() {
        let tuning: Tuning = serde_json::from_str(r#"{"shield_max_charges": 255}"#).unwrap();
        let state = GameState::new(Mode::Letter, 1, tuning);
        assert_eq!(state.shield.max_charges, SHIELD_CHARGES_LIMIT);
    }

    /// Non-empty collection, so only the periodic interval can spawn
    fn periodic_spawns(mode: Mode, interval: u64) {
        let tuning = Tuning {
            powerup_interval: 1_000_000,
            ..Default::default()
        };
        let mut state = GameState::new(mode, 21, tuning);
        if mode.uses_words() {
            state.push_word("CAT", Vec2::new(100.0, 100.0));
        } else {
            state.push_letter('Q', Vec2::new(100.0, 100.0));
        }

        for _ in 1..interval {
            state = tick(&state, &dims(), &mut NullSink);
            assert_eq!(state.active_len(), 1, "spawned early at t={}", state.time);
        }
        state = tick(&state, &dims(), &mut NullSink);
        assert_eq!(state.time, interval);
        assert_eq!(state.active_len(), 2);
    }

    #[test]
    fn test_letter_mode_spawns_every_sixty_ticks() {
        periodic_spawns(Mode::Letter, 60);
    }

    #[test]
    fn test_word_mode_spawns_every_ninety_ticks() {
        periodic_spawns(Mode::Word, 90);
    }

    #[test]
    fn test_batch_size_scales_with_level() {
        let bound = spawn_batch_for(5);
        let mut largest = 0;
        for seed in 0..32 {
            let tuning = Tuning {
                powerup_interval: 1_000_000,
                ..Default::default()
            };
            let mut state = GameState::new(Mode::Letter, seed, tuning);
            state.letters_correct = 300;
            state.level = 5;
            state.push_letter('Q', Vec2::new(100.0, 100.0));
            for _ in 0..60 {
                state = tick(&state, &dims(), &mut NullSink);
            }
            let spawned = state.letters.len() - 1;
            assert!((1..=bound).contains(&spawned), "seed {seed}: {spawned}");
            largest = largest.max(spawned);
        }
        assert!(largest > 1, "level 5 never spawned more than one");
    }

    #[test]
    fn test_spawn_respects_cap() {
        let tuning = Tuning {
            max_letters: 2,
            letter_spawn_interval: 1,
            ..quiet()
        };
        let mut state = GameState::new(Mode::Letter, 9, tuning);
        state.letters_correct = 10_000;
        state.level = 5;
        for _ in 0..50 {
            state = tick(&state, &dims(), &mut NullSink);
            assert!(state.letters.len() <= 2);
        }
    }

    #[test]
    fn test_ids_unique_across_spawns() {
        let mut state = GameState::new(Mode::Letter, 3, Tuning::default());
        let mut seen = std::collections::HashSet::new();
        for _ in 0..2_000 {
            state = tick(&state, &dims(), &mut NullSink);
            for letter in &state.letters {
                seen.insert(letter.id);
            }
            if state.game_over {
                break;
            }
        }
        let mut ids: Vec<u32> = state.letters.iter().map(|l| l.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), state.letters.len());
        assert!(seen.len() as u32 <= state.ids.letters.peek() - 1);
    }

    #[test]
    fn test_resized_field_keeps_positions() {
        let mut state = GameState::new(Mode::Letter, 1, quiet());
        state.push_letter('Q', Vec2::new(700.0, 100.0));
        let small = Dimensions::new(200.0, 400.0, 32.0);
        let next = tick(&state, &small, &mut NullSink);
        assert_eq!(next.letters[0].pos, Vec2::new(700.0, 101.0));
    }

    #[test]
    fn test_determinism() {
        let mut a = GameState::new(Mode::Word, 99999, Tuning::default());
        let mut b = GameState::new(Mode::Word, 99999, Tuning::default());
        for _ in 0..500 {
            a = tick(&a, &dims(), &mut NullSink);
            b = tick(&b, &dims(), &mut NullSink);
        }
        assert_eq!(a, b);
    }
}
