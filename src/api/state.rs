//! Serialized position and sprite layout for a UI (`spec.md` §6), delegating
//! to `board::notation` — the one module that still speaks wire shapes.

use crate::board::notation::{self, SerializedState};
use crate::board::{GameState, Piece};

/// A deep-copy snapshot of `state`, including the side to move's legal
/// moves (`spec.md` §6, `serialize_state`).
pub fn serialize_state(state: &GameState) -> SerializedState {
    notation::serialize_state(state)
}

/// Board-square/piece pairs for a UI's sprite layer (`spec.md` §6,
/// `piece_sprites`).
pub fn piece_sprites(state: &GameState) -> Vec<(usize, Piece)> {
    notation::piece_sprites(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, Mode};

    #[test]
    fn serialized_state_carries_every_piece() {
        let state = GameState::new_game(Mode::Full, Difficulty::Medium);
        let serialized = serialize_state(&state);
        assert_eq!(serialized.pieces.len(), state.pieces.len());
        assert!(!serialized.legal_moves.is_empty());
    }

    #[test]
    fn piece_sprites_covers_every_piece() {
        let state = GameState::new_game(Mode::Full, Difficulty::Medium);
        assert_eq!(piece_sprites(&state).len(), state.pieces.len());
    }
}
