//! Material and piece-pair bonuses (`spec.md` §4.3).

use crate::board::{GameState, PieceKind, Side};

/// Sum of `material_value()` for `side`, already 1.5x-weighted for heroes.
pub fn material_score(state: &GameState, side: Side) -> i32 {
    state.pieces_of(side).map(|p| p.material_value()).sum()
}

/// Small bonus for holding a matched pair of a kind whose doctrine rewards
/// coordinated use: Navy, Air Force, Tank (`spec.md` §4.3, "Piece-pair
/// bonuses").
pub fn piece_pair_bonus(state: &GameState, side: Side) -> i32 {
    const PAIR_BONUS: i32 = 18;
    [PieceKind::Navy, PieceKind::AirForce, PieceKind::Tank]
        .iter()
        .map(|&kind| {
            let count = state.pieces_of(side).filter(|p| p.kind == kind).count();
            if count >= 2 {
                PAIR_BONUS
            } else {
                0
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, Mode};

    #[test]
    fn fresh_position_is_materially_symmetric() {
        let state = GameState::new_game(Mode::Full, Difficulty::Medium);
        assert_eq!(material_score(&state, Side::Red), material_score(&state, Side::Blue));
    }

    #[test]
    fn starting_pairs_are_rewarded() {
        let state = GameState::new_game(Mode::Full, Difficulty::Medium);
        assert!(piece_pair_bonus(&state, Side::Red) > 0);
    }
}
