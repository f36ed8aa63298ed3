//! Principal-variation alpha-beta search over [`GameState`], with the full
//! pruning/extension/ordering suite named in `spec.md` §4.4. Grounded on the
//! negamax structure in
//! `examples/other_examples/..._CooperBigFoot-cesso__crates-cesso-engine-src-search-negamax.rs.rs`
//! (TT probe → IIR → static eval/improving → razoring/RFP/probcut/NMP →
//! move loop with LMR/PVS re-search), adapted from that crate's bitboard
//! chess position to our `GameState`/`Move` pair and to this spec's own
//! pruning constants and extension triggers.

use crate::board::{movegen, GameState, Move, PieceKind, Side};
use crate::eval;

use super::make_unmake::{make, unmake};
use super::see;
use super::tt::{Bound, TtEntry};
use super::{SearchContext, INFINITY, MATE_SCORE};

const FUTILITY_DEPTH: i32 = 3;
const RFP_DEPTH: i32 = 3;
const RAZOR_DEPTH: i32 = 3;
const RAZOR_MARGIN: [i32; 4] = [0, 300, 550, 900];
const PROBCUT_MARGIN: i32 = 200;
const SEE_PRUNE_DEPTH: i32 = 4;
const LMP_DEPTH: i32 = 4;
const HISTORY_PRUNE_DEPTH: i32 = 6;
const IIR_MIN_DEPTH: i32 = 6;
const NMP_MIN_DEPTH: i32 = 3;
const NMP_VERIFY_DEPTH: i32 = 8;
const SINGULAR_MIN_DEPTH: i32 = 8;

/// Runs one negamax search rooted at `state`, returning the score from the
/// perspective of `state.side_to_move`. The principal variation ends up in
/// `ctx.pv[ply..]`; the caller reads `ctx.pv[0][0]` for the chosen move.
#[allow(clippy::too_many_arguments)]
pub fn negamax(
    state: &mut GameState,
    mut depth: i32,
    ply: usize,
    mut alpha: i32,
    beta: i32,
    ctx: &mut SearchContext,
    do_null: bool,
    cutnode: bool,
    excluded: Option<Move>,
) -> i32 {
    let is_pv = beta - alpha > 1;
    let is_root = ply == 0;

    ctx.clear_pv(ply);

    if ctx.should_stop() {
        return 0;
    }
    if ply >= super::MAX_PLY - 1 {
        return eval::evaluate(state);
    }

    let hash = state.hash();

    if !is_root {
        if ctx.is_repeated(hash) {
            return 0;
        }
        // Mate distance pruning: no line through this node can beat a mate
        // already found closer to the root.
        alpha = alpha.max(-MATE_SCORE + ply as i32);
        let clamped_beta = beta.min(MATE_SCORE - ply as i32 - 1);
        if alpha >= clamped_beta {
            return alpha;
        }
    }

    if depth <= 0 {
        return super::quiescence::search(state, alpha, beta, ctx);
    }

    if let Some(result) = crate::board::win::check_win(state) {
        let _ = result;
        // `check_win` is evaluated from `state.side_to_move`'s perspective
        // (the side about to move, who just lost its Commander or has no
        // legal move) — a loss for the side on move here.
        return -(MATE_SCORE - ply as i32);
    }

    let mut tt_move: Option<Move> = None;
    let mut tt_entry: Option<TtEntry> = None;
    if excluded.is_none() {
        if let Some(entry) = ctx.shared.tt.probe(hash) {
            ctx.stats.tt_hits += 1;
            tt_move = entry.best_move;
            if !is_root && entry.depth >= depth {
                let cutoff = match entry.bound {
                    Bound::Exact => true,
                    Bound::Lower => entry.score >= beta,
                    Bound::Upper => entry.score <= alpha,
                    Bound::None => false,
                };
                if cutoff {
                    return entry.score;
                }
            }
            tt_entry = Some(entry);
        }
    }

    let commanders_safe = !commander_under_attack(state, Side::Red) && !commander_under_attack(state, Side::Blue);
    let in_check = commander_under_attack(state, state.side_to_move);

    // Internal iterative reduction: no hash move on a node worth a full
    // search is itself a signal this position needs re-examining shallower
    // first.
    if tt_move.is_none() && !is_pv && depth >= IIR_MIN_DEPTH {
        depth -= 1;
    }
    if in_check {
        depth += 1;
    }

    if depth <= 0 {
        return super::quiescence::search(state, alpha, beta, ctx);
    }

    let static_eval = eval::evaluate(state);
    ctx.stack[ply].static_eval = static_eval;
    let improving = ply >= 2 && !in_check && static_eval >= ctx.stack[ply - 2].static_eval;

    if !is_pv && !in_check && commanders_safe && excluded.is_none() {
        // Razoring: hopelessly behind at a shallow node — verify with
        // quiescence before giving up.
        if depth <= RAZOR_DEPTH && static_eval + RAZOR_MARGIN[depth as usize] < alpha {
            let razor_score = super::quiescence::search(state, alpha, beta, ctx);
            if razor_score <= alpha {
                return razor_score;
            }
        }

        // Reverse futility pruning.
        if depth <= RFP_DEPTH {
            let margin = (if improving { 150 } else { 200 }) * depth + 100;
            if static_eval - margin >= beta {
                return static_eval;
            }
        }

        // Probcut: a shallow search at a raised window proves fail-high
        // without the full-depth cost.
        if depth >= 5 && beta.abs() < MATE_SCORE - super::MAX_PLY as i32 {
            let probcut_beta = beta + PROBCUT_MARGIN;
            let mut captures: Vec<Move> = state
                .pieces_of(state.side_to_move)
                .filter(|p| !p.is_carried())
                .flat_map(|p| movegen::legal_destinations(state, p.id))
                .filter(|mv| see::is_capture(state, *mv) && see::see(state, *mv) >= probcut_beta - static_eval)
                .collect();
            captures.sort_by_key(|mv| std::cmp::Reverse(see::see(state, *mv)));
            for mv in captures.into_iter().take(6) {
                let undo = make(state, mv);
                ctx.push_repetition(state.hash());
                let score = -negamax(state, depth - 4, ply + 1, -probcut_beta, -probcut_beta + 1, ctx, true, !cutnode, None);
                ctx.pop_repetition();
                unmake(state, undo);
                if score >= probcut_beta {
                    return score;
                }
            }
        }

        // Null-move pruning.
        if do_null
            && depth >= NMP_MIN_DEPTH
            && static_eval >= beta - 64
            && state.pieces_of(state.side_to_move).count() > 2
            && !has_only_light_material(state, state.side_to_move)
        {
            let mut r = 2;
            if depth >= 6 {
                r += 1;
            }
            if static_eval - beta >= 200 {
                r += 1;
            }
            r = r.min(4);

            let prev_side = state.side_to_move;
            state.side_to_move = prev_side.opponent();
            let null_depth = (depth - 1 - r).max(0);
            let score = -negamax(state, null_depth, ply + 1, -beta, -beta + 1, ctx, false, !cutnode, None);
            state.side_to_move = prev_side;

            if score >= beta {
                if depth >= NMP_VERIFY_DEPTH {
                    let verify = negamax(state, depth - r, ply, alpha, beta, ctx, false, cutnode, None);
                    if verify >= beta {
                        return verify;
                    }
                } else {
                    return score;
                }
            }
        }
    }

    let mut moves: Vec<Move> = movegen::all_legal_moves(state, state.side_to_move);
    if let Some(excl) = excluded {
        moves.retain(|m| *m != excl);
    }

    if moves.is_empty() {
        // `all_legal_moves` empty at a non-root, non-excluded node means the
        // side to move has no reply; `check_win` above already handles the
        // terminal case at entry, so this only fires for the singular-search
        // excluded-move probe.
        return static_eval;
    }

    let prev_played = if ply > 0 { ctx.stack[ply - 1].played } else { None };
    let pv_move = ctx.pv[ply][0];
    order_moves(state, &mut moves, tt_move, pv_move, ctx, ply, prev_played);

    let original_alpha = alpha;
    let mut best_score = -INFINITY;
    let mut best_move = moves[0];
    let mut quiets_tried: Vec<(PieceKind, crate::board::Coord, crate::board::Coord)> = Vec::new();

    for (index, mv) in moves.into_iter().enumerate() {
        let mover = match state.piece_by_id(mv.piece_id) {
            Some(p) => *p,
            None => continue,
        };
        let from = mover.coord();
        let to = mv.dest();
        let is_capture = see::is_capture(state, mv);
        let is_quiet = !is_capture;

        // Move-count based pruning for quiet moves, gated on the commanders
        // being safe (the pruning-safety gate, `spec.md` §4.4).
        if !is_root && is_quiet && commanders_safe && !in_check {
            if depth <= LMP_DEPTH {
                let threshold = (if improving { 5 } else { 3 }) + depth * depth;
                if index as i32 > threshold {
                    continue;
                }
            }
            if depth <= HISTORY_PRUNE_DEPTH && index > 1 {
                let hist = ctx.ordering.history_score(state.side_to_move, mover.kind, from, to);
                if hist < -55 * depth * depth {
                    continue;
                }
            }
            if depth <= FUTILITY_DEPTH {
                let margin = (if improving { 130 } else { 170 }) * depth + 80;
                if static_eval + margin <= alpha {
                    continue;
                }
            }
        }
        if !is_root && is_capture && depth <= SEE_PRUNE_DEPTH && commanders_safe {
            if see::see(state, mv) < -80 * depth {
                continue;
            }
        }

        let captured_kind = state.piece_at(to).map(|p| p.kind);
        let is_recapture = prev_played.map_or(false, |(_, prev_to)| prev_to == to);

        // Singular and negative extensions are both judged from the parent
        // position, before `mv` itself is made: singular verifies the TT
        // move is uniquely best by excluding it and searching everything
        // else at a reduced window; the negative case instead trusts the TT
        // entry's word that some *other* move already fails high here.
        let mut positive_ext = 0i32;
        let mut negative_ext = 0i32;
        if Some(mv) == tt_move && !is_root && excluded.is_none() && depth >= SINGULAR_MIN_DEPTH {
            if let Some(entry) = tt_entry {
                if entry.bound != Bound::Upper && entry.depth >= depth - 3 {
                    let singular_beta = entry.score - 90;
                    let singular_depth = (depth - 1) / 2;
                    let score = negamax(state, singular_depth, ply, singular_beta - 1, singular_beta, ctx, false, cutnode, Some(mv));
                    if score < singular_beta {
                        positive_ext += 1;
                        if score < singular_beta - 30 {
                            positive_ext += 1;
                        }
                    } else if singular_beta >= beta {
                        return singular_beta;
                    }
                }
            }
        } else if let Some(entry) = tt_entry {
            if entry.bound == Bound::Lower && entry.depth >= depth - 3 && Some(mv) != tt_move {
                negative_ext -= 1;
                if entry.score >= beta + 80 {
                    negative_ext -= 1;
                }
            }
        }

        let undo = make(state, mv);
        let gives_check_now = commander_under_attack(state, state.side_to_move);
        ctx.push_repetition(state.hash());
        ctx.stack[ply].played = Some((from, to));

        if gives_check_now {
            positive_ext += 1;
        }
        if captured_kind == Some(PieceKind::Navy) {
            positive_ext += 1;
        }
        if is_recapture {
            positive_ext += 1;
        }
        if mover.kind == PieceKind::Navy && state.pieces_of(mover.side).filter(|p| p.kind == PieceKind::Navy).count() == 1 {
            positive_ext += 1;
        }

        let child_depth = (depth - 1 + positive_ext.min(2) + negative_ext).max(0);
        let mut score;

        if index == 0 {
            score = -negamax(state, child_depth, ply + 1, -beta, -alpha, ctx, true, false, None);
        } else {
            let mut reduction = 0i32;
            if is_quiet && depth >= 3 && index >= 2 && commanders_safe {
                let r = 0.75 + (depth as f64).ln() * (index as f64 + 1.0).ln() / 2.25;
                reduction = r.round() as i32;
                if is_pv {
                    reduction -= 1;
                }
                if improving {
                    reduction -= 1;
                }
                if !improving && depth >= 6 {
                    reduction += 1;
                }
                reduction = reduction.clamp(0, child_depth - 1);
            }

            let reduced_depth = child_depth - reduction;
            score = -negamax(state, reduced_depth, ply + 1, -alpha - 1, -alpha, ctx, true, true, None);

            if score > alpha && reduction > 0 {
                score = -negamax(state, child_depth, ply + 1, -alpha - 1, -alpha, ctx, true, !cutnode, None);
            }
            if score > alpha && is_pv {
                score = -negamax(state, child_depth, ply + 1, -beta, -alpha, ctx, true, false, None);
            }
        }

        ctx.pop_repetition();
        unmake(state, undo);

        if ctx.shared.time_is_up() {
            return 0;
        }

        if score > best_score {
            best_score = score;
            best_move = mv;
            if score > alpha {
                alpha = score;
                ctx.record_pv(ply, mv);
                if score >= beta {
                    ctx.stats.cutoffs += 1;
                    if is_quiet {
                        ctx.ordering.on_quiet_cutoff(
                            ply,
                            state.side_to_move,
                            mover.kind,
                            from,
                            to,
                            &quiets_tried,
                            prev_played,
                            depth,
                        );
                    }
                    break;
                }
            }
        }
        if is_quiet {
            quiets_tried.push((mover.kind, from, to));
        }
    }

    let bound = if best_score >= beta {
        Bound::Lower
    } else if best_score > original_alpha {
        Bound::Exact
    } else {
        Bound::Upper
    };
    ctx.shared.tt.store(
        hash,
        TtEntry {
            score: best_score,
            depth,
            bound,
            best_move: Some(best_move),
            generation: 0,
        },
    );

    ctx.stats.depth_reached = ctx.stats.depth_reached.max(depth);
    best_score
}

/// Whether `side`'s Commander is currently attacked by the opponent
/// (`spec.md` §4.4's "pruning-safety gate" and the check-extension trigger).
pub fn commander_under_attack(state: &GameState, side: Side) -> bool {
    let Some(commander) = state.commander_of(side) else {
        return false;
    };
    movegen::squares_attacked_by(state, side.opponent()).contains(&commander.coord())
}

/// Whether `side` has nothing but Commander/Headquarters/Infantry/Militia
/// left — the "only pawn-like material" exclusion on null-move pruning.
fn has_only_light_material(state: &GameState, side: Side) -> bool {
    state.pieces_of(side).all(|p| {
        matches!(
            p.kind,
            PieceKind::Commander | PieceKind::Headquarters | PieceKind::Infantry | PieceKind::Militia
        )
    })
}

/// Orders `moves` in place: TT move, previous-iteration PV move, captures by
/// MVV/LVA refined by SEE, counter-move, killers, then butterfly/continuation
/// history (`spec.md` §4.4 "Move ordering").
fn order_moves(
    state: &GameState,
    moves: &mut [Move],
    tt_move: Option<Move>,
    pv_move: Option<Move>,
    ctx: &SearchContext,
    ply: usize,
    prev_played: Option<(crate::board::Coord, crate::board::Coord)>,
) {
    let killers = ctx.ordering.killers(ply);
    let counter = prev_played.and_then(|(_, to)| ctx.ordering.counter_move(to));

    let score_of = |mv: &Move| -> i64 {
        if Some(*mv) == tt_move {
            return 1_000_000_000;
        }
        if Some(*mv) == pv_move {
            return 900_000_000;
        }
        let Some(mover) = state.piece_by_id(mv.piece_id) else {
            return 0;
        };
        let from = mover.coord();
        let to = mv.dest();
        if see::is_capture(state, *mv) {
            let victim = state.piece_at(to).map_or(0, |p| p.material_value());
            let see_score = see::see(state, *mv);
            let base = if see_score >= 0 { 500_000_000 } else { -500_000_000 };
            return base + victim as i64 * 16 - mover.material_value() as i64 + see_score as i64;
        }
        if killers[0] == Some((from, to)) {
            return 400_000_000;
        }
        if killers[1] == Some((from, to)) {
            return 390_000_000;
        }
        if counter == Some((from, to)) {
            return 380_000_000;
        }
        let hist = ctx.ordering.history_score(mover.side, mover.kind, from, to) as i64;
        let cont = ctx.ordering.continuation_score(prev_played, mover.kind, from, to) as i64;
        hist + cont
    };

    moves.sort_by_key(|mv| std::cmp::Reverse(score_of(mv)));
}
