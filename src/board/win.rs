//! Win detection: the single source of truth for every mode's terminal
//! condition (`spec.md` §4.2/§8 — the Design Notes flag win detection as
//! previously duplicated across `check_win`, an "immediate winning move"
//! probe, and search terminal scoring; this crate keeps exactly one
//! implementation and has `search` call into it).

use super::piece::{PieceKind, Side};
use super::GameState;
use crate::config::Mode;

/// Returns a human-readable result string once the game has ended, or
/// `None` if play continues. Called after every `apply_move`, from the
/// perspective of `state.side_to_move` (the side about to move next).
pub fn check_win(state: &GameState) -> Option<String> {
    for side in [Side::Red, Side::Blue] {
        if state.commander_of(side).is_none() {
            return Some(format!("{:?} wins: {:?}'s Commander was captured", side.opponent(), side));
        }
    }

    mode_objective_win(state)
}

fn mode_objective_win(state: &GameState) -> Option<String> {
    let target_kind = match state.mode() {
        Mode::Full => return None,
        Mode::Marine => PieceKind::Navy,
        Mode::Air => PieceKind::AirForce,
        Mode::Land => {
            for side in [Side::Red, Side::Blue] {
                let has_land_unit = state
                    .pieces_of(side)
                    .any(|p| !matches!(p.kind, PieceKind::Navy | PieceKind::AirForce));
                if !has_land_unit {
                    return Some(format!(
                        "{:?} wins: {:?}'s land forces were wiped out",
                        side.opponent(),
                        side
                    ));
                }
            }
            return None;
        }
    };

    for side in [Side::Red, Side::Blue] {
        let remaining = state.pieces_of(side).filter(|p| p.kind == target_kind).count();
        if remaining == 0 {
            return Some(format!(
                "{:?} wins: {:?}'s {} was eliminated",
                side.opponent(),
                side,
                target_kind.notate()
            ));
        }
    }
    None
}

/// A position is drawn by threefold repetition once its Zobrist hash has
/// recurred three times in the bounded history (`spec.md` §3).
pub fn is_threefold_repetition(state: &GameState, hash: u64) -> bool {
    state.hash_history.iter().filter(|&&h| h == hash).count() >= 3
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Difficulty;

    #[test]
    fn fresh_game_has_no_winner() {
        let state = GameState::new_game(Mode::Full, Difficulty::Medium);
        assert!(check_win(&state).is_none());
    }

    #[test]
    fn losing_commander_ends_the_game() {
        let mut state = GameState::new_game(Mode::Full, Difficulty::Medium);
        state.pieces.retain(|p| !(p.side == Side::Blue && p.kind == PieceKind::Commander));
        let result = check_win(&state).unwrap();
        assert!(result.contains("Red wins"));
    }

    #[test]
    fn marine_mode_ends_when_a_navy_fleet_is_gone() {
        let mut state = GameState::new_game(Mode::Marine, Difficulty::Medium);
        state.pieces.retain(|p| !(p.side == Side::Blue && p.kind == PieceKind::Navy));
        let result = check_win(&state).unwrap();
        assert!(result.contains("Red wins"));
    }
}
