//! Applying a caller's move and asking the engine to play its own
//! (`spec.md` §6, `apply_move`/`bot_move`).

use crate::board::{moves, GameState, Move};
use crate::error::{ActionStatus, EngineError};
use crate::search::root;

/// Applies `mv` for the side to move. Returns the `{ok, error?, game_over?,
/// result?}` shape `spec.md` §6 names; on rejection `state` is unchanged.
///
/// Works on a clone and only commits it back to `state` on success, so a
/// fatal engine-invariant violation (`spec.md` §7) — caught here rather than
/// left to unwind past this call — leaves `state` exactly as it stood
/// before the attempt, the same "unchanged on rejection" guarantee an
/// ordinary illegal move gets.
pub fn apply_move(state: &mut GameState, mv: Move) -> ActionStatus {
    let mut probe = state.clone();
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| moves::apply_move(&mut probe, mv)));

    match outcome {
        Ok(Ok(_)) => {
            *state = probe;
            ActionStatus::ok(state.game_over, state.result.clone(), mv)
        }
        Ok(Err(e)) => ActionStatus::err(e),
        Err(_) => {
            log::error!("apply_move aborted: engine invariant violated; state left unchanged");
            ActionStatus::err(EngineError::InvariantViolated("move application aborted".to_string()))
        }
    }
}

/// Picks a move for the side to move with the difficulty-appropriate driver
/// and applies it (`spec.md` §4.5/§6). Returns `NoMoveFound` if the side to
/// move has no legal move or the game has already ended.
pub fn bot_move(state: &mut GameState) -> ActionStatus {
    if state.game_over {
        return ActionStatus::err(EngineError::GameOver);
    }
    match root::pick_move(state) {
        Some(picked) => apply_move(state, picked.mv),
        None => ActionStatus::err(EngineError::NoMoveFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::movegen;
    use crate::config::{Difficulty, Mode};

    #[test]
    fn applies_a_legal_move() {
        let mut state = GameState::new_game(Mode::Full, Difficulty::Medium);
        let mv = movegen::all_legal_moves(&state, state.side_to_move)[0];
        let status = apply_move(&mut state, mv);
        assert!(status.ok);
        assert_eq!(status.applied, Some(mv));
    }

    #[test]
    fn rejects_a_move_for_the_wrong_piece_id() {
        let mut state = GameState::new_game(Mode::Full, Difficulty::Medium);
        let status = apply_move(&mut state, Move::new(999_999, 0, 0));
        assert!(!status.ok);
    }

    #[test]
    fn bot_move_plays_something_legal() {
        let mut state = GameState::new_game(Mode::Full, Difficulty::Easy);
        let status = bot_move(&mut state);
        assert!(status.ok);
    }

    #[test]
    fn bot_move_refuses_once_the_game_is_over() {
        let mut state = GameState::new_game(Mode::Full, Difficulty::Easy);
        state.game_over = true;
        let status = bot_move(&mut state);
        assert!(!status.ok);
    }

    #[test]
    fn a_fatal_invariant_violation_is_caught_and_leaves_state_unchanged() {
        let mut state = GameState::new_game(Mode::Full, Difficulty::Medium);
        let mv = movegen::all_legal_moves(&state, state.side_to_move)[0];

        // Corrupt two Blue pieces (untouched by `mv`, a Red piece) onto the
        // same square, violating "at most one top-level piece per square".
        let last = state.pieces.len() - 1;
        let shared_square = state.pieces[last - 1].coord();
        state.pieces[last].col = shared_square.col;
        state.pieces[last].row = shared_square.row;

        let before = state.clone();
        let status = apply_move(&mut state, mv);

        assert!(!status.ok);
        assert_eq!(state.pieces.len(), before.pieces.len());
        assert_eq!(state.side_to_move, before.side_to_move);
    }
}
