//! MCTS+αβ hybrid root driver used at Hard difficulty (`spec.md` §4.5): a
//! PUCT tree over the root's legal moves whose leaf values come from a
//! shallow alpha-beta search blended with the static evaluator, rather than
//! random rollouts. Workers share the root's atomics and apply virtual loss
//! so they spread across different children instead of piling onto one.

use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::thread;
use std::time::Instant;

use crate::board::{movegen, Coord, GameState, Move, PieceKind};
use crate::config::{EngineConfig, EvalBackend};
use crate::eval;

use super::make_unmake::{make, unmake};
use super::{alphabeta, see, SearchContext, SharedControl, Tt, INFINITY};

/// Depth of the alpha-beta search used to value each expanded child.
const MCTS_AB_DEPTH: i32 = 3;
const PUCT_C: f64 = 1.8;
const SOFTMAX_TEMPERATURE: f64 = 25.0;
const VIRTUAL_LOSS: f64 = 0.35;
const MAX_MCTS_WORKERS: usize = 8;

/// One root child: a legal move, its policy prior, and the running
/// visit/value statistics every worker updates lock-free.
struct Child {
    mv: Move,
    prior: f64,
    visits: AtomicU32,
    virtual_visits: AtomicU32,
    value_sum_fixed: AtomicI64,
}

impl Child {
    fn mean_value(&self) -> f64 {
        let visits = self.visits.load(Ordering::Relaxed);
        if visits == 0 {
            return 0.0;
        }
        self.value_sum_fixed.load(Ordering::Relaxed) as f64 / 1_000_000.0 / visits as f64
    }
}

/// Runs the MCTS+αβ root driver until `deadline` and returns the move with
/// the most visits (ties broken by mean value), or `None` if the side to
/// move has no legal move.
///
/// Like the Lazy SMP driver, the worker fan-out runs inside
/// [`std::panic::catch_unwind`]: `children`'s visit/value atomics live
/// outside the caught closure, so a worker hitting a fatal engine-invariant
/// violation (`spec.md` §7) degrades to whatever the surviving workers had
/// already voted for, instead of taking the process down.
pub fn search(state: &GameState, config: &EngineConfig, tt: Tt, deadline: Instant) -> Option<Move> {
    let root_moves = movegen::all_legal_moves(state, state.side_to_move);
    if root_moves.is_empty() {
        return None;
    }

    let priors = policy_priors(state, &root_moves);
    let children: Vec<Child> = root_moves
        .iter()
        .zip(priors.iter())
        .map(|(&mv, &prior)| Child {
            mv,
            prior,
            visits: AtomicU32::new(0),
            virtual_visits: AtomicU32::new(0),
            value_sum_fixed: AtomicI64::new(0),
        })
        .collect();

    let shared = SharedControl::new(tt, deadline);
    let parent_visits = AtomicU32::new(0);
    let workers = config.worker_count().min(MAX_MCTS_WORKERS).max(1);
    let backend = config.eval_backend;

    let scope_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        thread::scope(|scope| {
            for _ in 0..workers {
                let worker_state = state.clone();
                let children = &children;
                let shared = &shared;
                let parent_visits = &parent_visits;
                scope.spawn(move || mcts_worker(worker_state, children, shared, parent_visits, backend));
            }
        });
    }));

    if scope_result.is_err() {
        log::error!("MCTS search aborted: a worker hit an engine invariant violation; falling back to the best vote so far");
    }

    children
        .iter()
        .max_by(|a, b| {
            let av = a.visits.load(Ordering::Relaxed);
            let bv = b.visits.load(Ordering::Relaxed);
            av.cmp(&bv).then_with(|| a.mean_value().partial_cmp(&b.mean_value()).unwrap_or(std::cmp::Ordering::Equal))
        })
        .map(|c| c.mv)
}

fn mcts_worker(mut state: GameState, children: &[Child], shared: &SharedControl, parent_visits: &AtomicU32, backend: EvalBackend) {
    while !shared.time_is_up() {
        let Some(child) = select(children, parent_visits) else { break };
        child.virtual_visits.fetch_add(1, Ordering::Relaxed);

        let undo = make(&mut state, child.mv);
        let value = -leaf_value(&mut state, shared, backend);
        unmake(&mut state, undo);

        child.virtual_visits.fetch_sub(1, Ordering::Relaxed);
        child.visits.fetch_add(1, Ordering::Relaxed);
        child.value_sum_fixed.fetch_add((value * 1_000_000.0) as i64, Ordering::Relaxed);
        parent_visits.fetch_add(1, Ordering::Relaxed);
    }
}

/// PUCT selection: `q + c*prior*sqrt(parent_N)/(1+N)`, with in-flight visits
/// counted as virtual loss so concurrent workers spread across children
/// (`spec.md` §4.5, "Virtual loss = 0.35 per in-flight visit").
fn select<'a>(children: &'a [Child], parent_visits: &AtomicU32) -> Option<&'a Child> {
    let parent_sqrt_n = (parent_visits.load(Ordering::Relaxed) as f64).max(1.0).sqrt();
    children
        .iter()
        .max_by(|a, b| puct(a, parent_sqrt_n).partial_cmp(&puct(b, parent_sqrt_n)).unwrap_or(std::cmp::Ordering::Equal))
}

fn puct(child: &Child, parent_sqrt_n: f64) -> f64 {
    let n = child.visits.load(Ordering::Relaxed) as f64;
    let virtual_n = child.virtual_visits.load(Ordering::Relaxed) as f64;
    let effective_n = n + virtual_n;
    let q = if effective_n > 0.0 {
        (child.value_sum_fixed.load(Ordering::Relaxed) as f64 / 1_000_000.0 - VIRTUAL_LOSS * virtual_n) / effective_n
    } else {
        0.0
    };
    q + PUCT_C * child.prior * parent_sqrt_n / (1.0 + effective_n)
}

/// Values one expanded child: a depth-`MCTS_AB_DEPTH` alpha-beta search
/// blended 7:1 with the static evaluator (3:1 under the WebGPU backend,
/// which currently reroutes to the same CPU evaluator but keeps the batching
/// hook stable), from the perspective of the side to move at `state`.
fn leaf_value(state: &mut GameState, shared: &SharedControl, backend: EvalBackend) -> f64 {
    if movegen::all_legal_moves(state, state.side_to_move).is_empty() {
        return if state.game_over { -1000.0 } else { 0.0 };
    }

    let side = state.side_to_move;
    let mut ctx = SearchContext::new(shared, state.hash_history.clone(), side);
    let ab_score = alphabeta::negamax(state, MCTS_AB_DEPTH, 0, -INFINITY, INFINITY, &mut ctx, true, false, None);
    let static_score = eval::evaluate(state);

    let (ab_weight, static_weight) = match backend {
        EvalBackend::Webgpu => (3.0, 1.0),
        _ => (7.0, 1.0),
    };
    (ab_score as f64 * ab_weight + static_score as f64 * static_weight) / (ab_weight + static_weight)
}

/// Hand-crafted policy prior over the root's legal moves — capture MVV/LVA
/// refined by SEE, central control, forward advance, and Commander-threat /
/// shelter terms — turned into a distribution by a softmax at the
/// temperature named in `spec.md` §4.5.
fn policy_priors(state: &GameState, moves: &[Move]) -> Vec<f64> {
    let logits: Vec<f64> = moves.iter().map(|&mv| policy_logit(state, mv) / SOFTMAX_TEMPERATURE).collect();
    let max_logit = logits.iter().cloned().fold(f64::MIN, f64::max);
    let exps: Vec<f64> = logits.iter().map(|&l| (l - max_logit).exp()).collect();
    let sum: f64 = exps.iter().sum();
    if sum <= 0.0 {
        return vec![1.0 / moves.len().max(1) as f64; moves.len()];
    }
    exps.into_iter().map(|e| e / sum).collect()
}

fn policy_logit(state: &GameState, mv: Move) -> f64 {
    let Some(mover) = state.piece_by_id(mv.piece_id) else {
        return 0.0;
    };
    let mut score = 0.0;
    if see::is_capture(state, mv) {
        let victim = state.piece_at(mv.dest()).map_or(0, |p| p.material_value());
        score += victim as f64 * 2.0 - mover.material_value() as f64 + see::see(state, mv) as f64;
    }
    let center = Coord::new(5, 5);
    score -= mv.dest().manhattan(&center) as f64 * 4.0;
    score += (mv.to_row - mover.row).abs() as f64 * mover.side.advance_dir() as f64 * 6.0;
    if let Some(enemy_commander) = state.commander_of(mover.side.opponent()) {
        score += (20 - mv.dest().manhattan(&enemy_commander.coord()).min(20)) as f64 * 2.0;
    }
    if mover.kind == PieceKind::Commander {
        score -= 15.0;
    }
    score
}
