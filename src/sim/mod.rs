//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Previous state in, next state out
//! - No rendering, audio or platform dependencies

pub mod autoplay;
pub mod events;
pub mod factory;
pub mod keys;
pub mod scoring;
pub mod state;
pub mod tick;
pub mod words;

pub use events::{EventSink, FnSink, GameEvent, NullSink};
pub use keys::handle_key;
pub use scoring::{combo_multiplier, letter_score, level_for, word_score};
pub use state::{
    ChargeState, Combo, Dimensions, GameState, GameSummary, Letter, Mode, PowerUp, PowerUpKind,
    PowerUps, ShieldState, Word,
};
pub use tick::tick;

#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use super::*;
    use crate::tuning::Tuning;

    #[derive(Debug, Clone)]
    enum Step {
        Tick,
        Key(char),
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            3 => Just(Step::Tick),
            1 => proptest::char::range('A', 'Z').prop_map(Step::Key),
            1 => proptest::char::range('a', 'z').prop_map(Step::Key),
            1 => proptest::char::any().prop_map(Step::Key),
        ]
    }

    fn mode() -> impl Strategy<Value = Mode> {
        prop_oneof![Just(Mode::Letter), Just(Mode::Word), Just(Mode::Story)]
    }

    proptest! {
        #[test]
        fn prop_idle_ticks_only_cost_lives(seed in any::<u64>(), mode in mode(), ticks in 1usize..1500) {
            let dims = Dimensions::default();
            let mut state = GameState::new(mode, seed, Tuning::default());
            for _ in 0..ticks {
                let next = tick(&state, &dims, &mut NullSink);
                prop_assert!(next.lives <= state.lives);
                prop_assert_eq!(next.score, state.score);
                prop_assert_eq!(next.letters_correct, state.letters_correct);
                prop_assert!(next.time >= state.time);
                state = next;
            }
        }

        #[test]
        fn prop_invariants_hold(seed in any::<u64>(), mode in mode(), steps in prop::collection::vec(step(), 1..400)) {
            let dims = Dimensions::default();
            let mut state = GameState::new(mode, seed, Tuning::default());
            for step in steps {
                let next = match step {
                    Step::Tick => tick(&state, &dims, &mut NullSink),
                    Step::Key(key) => handle_key(&state, key, &mut NullSink),
                };

                prop_assert!(next.letters_correct >= state.letters_correct);
                prop_assert!(next.keys_pressed >= state.keys_pressed);
                prop_assert!(next.time >= state.time);
                prop_assert_eq!(next.level, level_for(next.letters_correct));
                prop_assert!(next.lives <= next.max_lives);
                prop_assert!(next.speed >= next.tuning.start_speed && next.speed <= next.tuning.max_speed);
                prop_assert!(next.shield.charges <= next.shield.max_charges);
                if state.game_over {
                    prop_assert_eq!(&next, &state);
                }

                // At most one word in progress, and only the bound one
                let in_progress: Vec<_> = next.words.iter().filter(|w| w.typed_progress > 0).collect();
                prop_assert!(in_progress.len() <= 1);
                if let Some(word) = in_progress.first() {
                    prop_assert_eq!(next.current_typing_word_id, Some(word.id));
                }
                if let Some(id) = next.current_typing_word_id {
                    prop_assert!(next.words.iter().any(|w| w.id == id));
                }

                state = next;
            }
        }

        #[test]
        fn prop_misses_floor_at_zero(start in 0u64..50, misses in 1usize..200) {
            let mut state = GameState::new(Mode::Word, 5, Tuning::default());
            state.score = start;
            for n in 1..=misses {
                let next = handle_key(&state, 'q', &mut NullSink);
                prop_assert!(next.score <= state.score);
                prop_assert_eq!(next.score, start.saturating_sub(5 * n as u64));
                state = next;
            }
        }
    }
}
