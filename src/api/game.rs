//! Starting a fresh game (`spec.md` §6, `new_game`).

use crate::board::GameState;
use crate::config::{Difficulty, Mode};

/// Builds a new game in the standard starting position: Red to move, an
/// empty repetition history save for the opening hash, `game_over = false`.
pub fn new_game(mode: Mode, difficulty: Difficulty) -> GameState {
    GameState::new_game(mode, difficulty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Side;

    #[test]
    fn fresh_game_has_red_to_move_and_one_history_entry() {
        let state = new_game(Mode::Full, Difficulty::Medium);
        assert_eq!(state.side_to_move, Side::Red);
        assert_eq!(state.hash_history.len(), 1);
        assert!(!state.game_over);
    }
}
