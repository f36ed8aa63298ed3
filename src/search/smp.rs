//! Lazy SMP: N workers searching the same position against a shared
//! transposition table and deadline, diversified by staggered starting
//! depths and shuffled root-move order (`spec.md` §4.5, §5).

use std::sync::Mutex;
use std::thread;
use std::time::Instant;

use crate::board::{movegen, GameState, Move};

use super::{run_iterative_deepening, SearchContext, SearchStats, SharedControl, Tt};

pub struct SmpResult {
    pub best_move: Option<Move>,
    pub stats: SearchStats,
}

/// A worker's posted result: its completed depth and the move it settled on,
/// so the "first iteration to improve" rule can prefer the deepest result
/// rather than whichever worker happened to finish first.
struct SharedBest {
    depth: i32,
    mv: Option<Move>,
}

/// Runs `workers` Lazy SMP threads to `config.max_depth` or `deadline`,
/// whichever comes first, and returns the shared best move plus merged
/// search statistics (`spec.md` §4.5: "the first thread whose completed
/// iteration improves the shared best score posts (score, move) under a
/// lock").
///
/// The worker fan-out runs inside [`std::panic::catch_unwind`]: if a worker
/// hits a fatal engine-invariant violation (`spec.md` §7), `thread::scope`
/// re-raises that panic once every thread is joined, but `best`/`stats` live
/// outside the caught closure, so whatever the other workers had already
/// posted still stands as the result — the search degrades to the last
/// known-good move instead of taking the whole process down.
pub fn search(state: &GameState, config: &crate::config::EngineConfig, tt: Tt, deadline: Instant, workers: usize) -> SmpResult {
    let shared = SharedControl::new(tt, deadline);
    let best = Mutex::new(SharedBest { depth: 0, mv: None });
    let stats = Mutex::new(SearchStats::default());

    let root_moves = movegen::all_legal_moves(state, state.side_to_move);
    if root_moves.is_empty() {
        return SmpResult { best_move: None, stats: SearchStats::default() };
    }

    let scope_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        thread::scope(|scope| {
            for worker_id in 0..workers.max(1) {
                let mut worker_state = state.clone();
                let shared = &shared;
                let best = &best;
                let stats = &stats;
                let root_moves = &root_moves;
                let repetition_history = state.hash_history.clone();
                let root_side = state.side_to_move;
                let max_depth = config.max_depth;

                scope.spawn(move || {
                    let mut ctx = SearchContext::new(shared, repetition_history, root_side);
                    // Stagger starting depth per worker id, and let secondary
                    // workers explore non-principal lines first by shuffling the
                    // first few root moves into their ordering tables via a
                    // deterministic per-worker bump on the butterfly history of
                    // every move but the first.
                    let start_depth = 1 + (worker_id as i32 % 3);
                    if worker_id > 0 {
                        diversify_ordering(&mut ctx, &worker_state, root_moves, worker_id);
                    }

                    let mv = run_iterative_deepening(&mut worker_state, &mut ctx, max_depth, start_depth);

                    let mut guard = best.lock().unwrap();
                    if ctx.stats.depth_reached >= guard.depth || guard.mv.is_none() {
                        guard.depth = ctx.stats.depth_reached;
                        guard.mv = mv.or(guard.mv);
                    }
                    drop(guard);

                    stats.lock().unwrap().merge(ctx.stats);

                    // Thread 0 owns the move-stability early stop: once it has
                    // seen enough stable iterations past the soft deadline, tell
                    // every other worker to unwind too.
                    if worker_id == 0 && ctx.best_move_stability >= 3 {
                        shared.request_stop();
                    }
                });
            }
        });
    }));

    if scope_result.is_err() {
        log::error!("Lazy SMP search aborted: a worker hit an engine invariant violation; falling back to the last known-good move");
    }

    let best_move = best.into_inner().unwrap().mv;
    let merged_stats = stats.into_inner().unwrap();
    SmpResult { best_move, stats: merged_stats }
}

/// Deterministic per-worker bump to the first few root moves' butterfly
/// history, so secondary workers don't all walk the same principal line in
/// lockstep before the shared TT gives them something to disagree about.
fn diversify_ordering(ctx: &mut SearchContext, state: &GameState, root_moves: &[Move], worker_id: usize) {
    let side = state.side_to_move;
    for (i, mv) in root_moves.iter().enumerate().take(6) {
        if i % (worker_id + 1) != 0 {
            continue;
        }
        if let Some(piece) = state.piece_by_id(mv.piece_id) {
            ctx.ordering.update_history(side, piece.kind, piece.coord(), mv.dest(), 300 * worker_id as i32);
        }
    }
}
