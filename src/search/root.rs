//! Root move selection: picks the driver `spec.md` §4.5 calls for at the
//! configured difficulty, consults the opening book for Blue, and applies
//! root-only style penalties over whatever the search itself ranked best.

use std::time::Instant;

use crate::board::moves::apply_move;
use crate::board::{movegen, GameState, Move, PieceKind, Side};
use crate::config::EngineConfig;
use crate::eval;

use super::{mcts, opening_book, run_iterative_deepening, smp, SearchContext, SearchStats, SharedControl, Tt};

/// A picked move plus whatever search statistics the driver that produced it
/// tracked (Lazy SMP merges across workers; MCTS reports none of its own).
pub struct PickedMove {
    pub mv: Move,
    pub stats: SearchStats,
}

/// Picks a move for `state.side_to_move`, dispatching among the single
/// thread / Lazy SMP / MCTS+αβ drivers by difficulty (`spec.md` §4.5).
pub fn pick_move(state: &GameState) -> Option<PickedMove> {
    let config = state.config;
    let tt = Tt::with_size_mib(config.tt_size_mib);
    let deadline = Instant::now() + config.time_limit;

    if config.difficulty.uses_mcts() && !config.force_single_thread {
        return mcts::search(state, &config, tt, deadline).map(|mv| PickedMove { mv, stats: SearchStats::default() });
    }

    let workers = config.worker_count();
    if workers > 1 {
        let result = smp::search(state, &config, tt, deadline, workers);
        return result.best_move.map(|mv| PickedMove { mv, stats: result.stats });
    }

    cpu_pick_move(state, &config, tt, deadline)
}

/// The plain single-thread driver: iterative deepening, an opening-book
/// consult for Blue, and root-only style penalties layered over the
/// search's own best move (`spec.md` §4.5).
///
/// Wraps its work in [`std::panic::catch_unwind`] so a fatal engine-invariant
/// violation (`spec.md` §7) aborts only this search, not the process:
/// `ctx` lives outside the caught closure, so `ctx.last_best` — the last
/// iterative-deepening depth that completed cleanly — survives the unwind
/// and becomes the move this function falls back to.
pub fn cpu_pick_move(state: &GameState, config: &EngineConfig, tt: Tt, deadline: Instant) -> Option<PickedMove> {
    let root_moves = movegen::all_legal_moves(state, state.side_to_move);
    if root_moves.is_empty() {
        return None;
    }

    let shared = SharedControl::new(tt, deadline);
    let mut working = state.clone();
    let mut ctx = SearchContext::new(&shared, state.hash_history.clone(), state.side_to_move);

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        if let Some(candidates) = opening_book::consult(state) {
            if let Some(mv) = best_by_style(state, &candidates) {
                return Some(mv);
            }
        }
        let searched = run_iterative_deepening(&mut working, &mut ctx, config.max_depth, 1);
        searched.and_then(|mv| restyle_if_needed(state, &root_moves, mv))
    }));

    let chosen = match outcome {
        Ok(mv) => mv,
        Err(_) => {
            log::error!("single-thread search aborted on an engine invariant violation; falling back to the last known-good move");
            None
        }
    };
    let chosen = chosen.or(ctx.last_best).or_else(|| root_moves.first().copied());
    chosen.map(|mv| PickedMove { mv, stats: ctx.stats })
}

/// If the search's chosen move hangs the Commander or lets the opponent win
/// outright next ply, falls back to the best-scoring alternative among all
/// root moves instead; otherwise keeps the search's choice untouched
/// (`spec.md` §4.5, "root style penalties used only for ranking").
fn restyle_if_needed(state: &GameState, root_moves: &[Move], chosen: Move) -> Option<Move> {
    if !hangs_commander(state, chosen) && !lets_opponent_win_in_one(state, chosen) {
        return Some(chosen);
    }
    best_by_style(state, root_moves).or(Some(chosen))
}

fn best_by_style(state: &GameState, candidates: &[Move]) -> Option<Move> {
    candidates.iter().copied().max_by_key(|mv| style_score(state, *mv))
}

/// Ranks one root move by static eval after playing it, plus the style
/// penalties named in `spec.md` §4.5: forbid hanging the Commander, heavily
/// penalize letting the opponent win in one, and in the early opening
/// discourage non-capturing Air Force flights and newly hanging a non-trivial
/// unit.
fn style_score(state: &GameState, mv: Move) -> i32 {
    let mut probe = state.clone();
    if apply_move(&mut probe, mv).is_err() {
        return i32::MIN;
    }
    let mut score = -eval::evaluate(&probe);

    if hangs_commander(state, mv) {
        score -= 100_000;
    }
    if lets_opponent_win_in_one(state, mv) {
        score -= 20_000;
    }
    if is_early_opening(state) {
        let mover = state.piece_by_id(mv.piece_id);
        if mover.map_or(false, |p| p.kind == PieceKind::AirForce) && state.piece_at(mv.dest()).is_none() {
            score -= 500;
        }
        if newly_hangs_key_unit(state, &probe) {
            score -= 800;
        }
    }
    score
}

fn is_early_opening(state: &GameState) -> bool {
    state.hash_history.len() <= 6
}

/// Whether playing `mv` leaves our own Commander attacked on the opponent's
/// next move.
fn hangs_commander(state: &GameState, mv: Move) -> bool {
    let mut probe = state.clone();
    if apply_move(&mut probe, mv).is_err() {
        return true;
    }
    let side = state.side_to_move;
    let Some(commander) = probe.commander_of(side) else {
        return false;
    };
    movegen::squares_attacked_by(&probe, side.opponent()).contains(&commander.coord())
}

/// Whether the opponent has an immediate winning reply after `mv`.
fn lets_opponent_win_in_one(state: &GameState, mv: Move) -> bool {
    let mut probe = state.clone();
    if apply_move(&mut probe, mv).is_err() {
        return true;
    }
    if probe.game_over {
        return !won_by(&probe, state.side_to_move);
    }

    let opponent = state.side_to_move.opponent();
    for reply in movegen::all_legal_moves(&probe, opponent) {
        let mut deeper = probe.clone();
        if apply_move(&mut deeper, reply).is_ok() && deeper.game_over && won_by(&deeper, opponent) {
            return true;
        }
    }
    false
}

fn won_by(state: &GameState, side: Side) -> bool {
    state.result.as_deref().map_or(false, |r| r.starts_with(&format!("{:?} wins", side)))
}

/// Whether any non-trivial Blue/Red unit newly sits on an attacked square
/// after the move, that wasn't attacked before it.
fn newly_hangs_key_unit(before: &GameState, after: &GameState) -> bool {
    let side = before.side_to_move;
    let is_hanging = |s: &GameState| {
        let attacked = movegen::squares_attacked_by(s, side.opponent());
        s.pieces_of(side)
            .filter(|p| !matches!(p.kind, PieceKind::Infantry | PieceKind::Militia | PieceKind::Headquarters))
            .any(|p| attacked.contains(&p.coord()))
    };
    !is_hanging(before) && is_hanging(after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, Mode};

    #[test]
    fn picks_some_legal_move_from_the_start_position() {
        let state = GameState::new_game(Mode::Full, Difficulty::Easy);
        let picked = pick_move(&state).expect("start position always has a move");
        assert!(movegen::all_legal_moves(&state, state.side_to_move)
            .iter()
            .any(|m| m.piece_id == picked.mv.piece_id && m.dest() == picked.mv.dest()));
    }
}
