//! Static Exchange Evaluation: the net material result of a capture
//! sequence on one square, least-valuable-attacker first each ply
//! (`spec.md` Glossary, "SEE").

use crate::board::{movegen, GameState, Move, Side};

/// Net material swing, from the moving side's perspective, of playing out
/// every recapture on `mv`'s destination square.
pub fn see(state: &GameState, mv: Move) -> i32 {
    let Some(target) = state.piece_at(mv.dest()) else {
        return 0;
    };
    let Some(mover) = state.piece_by_id(mv.piece_id) else {
        return 0;
    };

    let mut board = state.clone();
    let square = mv.dest();
    let mut side = mover.side;
    let mut attacker_id = mover.id;
    let mut attacker_value = mover.material_value();
    let mut gains = vec![target.material_value()];

    board.pieces.retain(|p| p.id != target.id);

    loop {
        board.pieces.retain(|p| p.id != attacker_id);
        side = side.opponent();

        let next = board
            .pieces_of(side)
            .filter(|p| !p.is_carried() && movegen::can_reach(&board, p, square))
            .min_by_key(|p| p.material_value());

        let Some(next_attacker) = next else {
            break;
        };

        gains.push(attacker_value - gains.last().copied().unwrap_or(0));
        attacker_id = next_attacker.id;
        attacker_value = next_attacker.material_value();
    }

    for i in (0..gains.len().saturating_sub(1)).rev() {
        gains[i] = -(-gains[i]).max(gains[i + 1]);
    }
    gains.first().copied().unwrap_or(0)
}

/// Whether `mv` is a capture at all (SEE is meaningless on a quiet move).
pub fn is_capture(state: &GameState, mv: Move) -> bool {
    state
        .piece_at(mv.dest())
        .map_or(false, |target| state.piece_by_id(mv.piece_id).map_or(false, |m| m.side != target.side))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::PieceKind;
    use crate::config::{Difficulty, Mode};

    #[test]
    fn quiet_move_has_zero_see() {
        let state = GameState::new_game(Mode::Full, Difficulty::Medium);
        let infantry = state.pieces_of(Side::Red).find(|p| p.kind == PieceKind::Infantry).unwrap();
        let dest = movegen::legal_destinations(&state, infantry.id)[0];
        assert!(!is_capture(&state, dest));
        assert_eq!(see(&state, dest), 0);
    }
}
