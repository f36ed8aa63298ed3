//! Piece-square bonuses, and the space/advance and central-square terms
//! (`spec.md` §4.3).

use crate::board::{Coord, GameState, PieceKind, Side, BOARD_ROWS};

/// Per-kind weight for how much a piece wants to be advanced toward the
/// enemy home rank versus held back near its own. Opening-phase weights are
/// generally smaller (development matters less early); both are blended by
/// `phase_weight` in `eval::mod`.
fn advance_weight(kind: PieceKind, opening: bool) -> i32 {
    match kind {
        PieceKind::Infantry | PieceKind::Militia => {
            if opening {
                3
            } else {
                6
            }
        }
        PieceKind::Tank | PieceKind::Artillery | PieceKind::Missile => {
            if opening {
                4
            } else {
                7
            }
        }
        PieceKind::AirForce | PieceKind::Navy => {
            if opening {
                2
            } else {
                4
            }
        }
        _ => 0,
    }
}

/// Rows advanced past a side's own home rank, from 0 (home) upward.
fn advance_depth(side: Side, coord: Coord) -> i32 {
    match side {
        Side::Red => coord.row,
        Side::Blue => BOARD_ROWS - 1 - coord.row,
    }
}

pub fn space_advance_score(state: &GameState, side: Side, opening_weight: i32) -> i32 {
    let opening = opening_weight > 128;
    let mut score = 0;
    for p in state.pieces_of(side).filter(|p| !p.is_carried()) {
        score += advance_weight(p.kind, opening) * advance_depth(side, p.coord());
        if is_central(p.coord()) {
            score += 10;
        }
    }
    score
}

/// `spec.md`'s named central band: columns 3..7, rows 4..7.
fn is_central(coord: Coord) -> bool {
    (3..7).contains(&coord.col) && (4..7).contains(&coord.row)
}

/// Bonus for a piece sitting where it directly threatens the enemy
/// Commander's square ("Commander-threat bonus") — cheap to approximate
/// here as proximity, with the exact-attack version folded into
/// `king_safety::attack_pressure`.
pub fn hero_proximity_bonus(state: &GameState, side: Side) -> i32 {
    let Some(enemy_commander) = state.commander_of(side.opponent()) else {
        return 0;
    };
    let target = enemy_commander.coord();
    state
        .pieces_of(side)
        .filter(|p| p.hero && !p.is_carried())
        .map(|p| {
            let d = p.coord().chebyshev(&target).max(1);
            (12 - d.min(12)) * 4
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, Mode};

    #[test]
    fn advancing_is_worth_more_than_staying_home() {
        assert!(advance_weight(PieceKind::Tank, false) >= advance_weight(PieceKind::Tank, true));
    }

    #[test]
    fn fresh_game_has_symmetric_space_score() {
        let state = GameState::new_game(Mode::Full, Difficulty::Medium);
        assert_eq!(
            space_advance_score(&state, Side::Red, 256),
            space_advance_score(&state, Side::Blue, 256)
        );
    }
}
