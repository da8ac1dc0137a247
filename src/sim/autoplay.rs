//! Idle/demo typist
//!
//! Picks the key a sensible player would press next: always go after the
//! visible target closest to the bottom.

use super::state::{GameState, is_visible};

/// Key to press next, or `None` when there is nothing to type
pub fn next_key(state: &GameState) -> Option<char> {
    if state.game_over {
        return None;
    }

    if !state.mode.uses_words() {
        return state
            .letters
            .iter()
            .filter(|l| is_visible(l.pos.y))
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|l| l.letter);
    }

    // Finish what we started
    if let Some(word) = state.typing_word() {
        return word.next_char();
    }

    state
        .words
        .iter()
        .filter(|w| w.typed_progress == 0 && is_visible(w.pos.y))
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
        .and_then(|w| w.first_char())
}
