//! Quiescence search: captures only, so the static evaluator never has to
//! score a position in the middle of an exchange (`spec.md` §4.4).

use crate::board::{movegen, GameState};
use crate::eval;

use super::make_unmake::make;
use super::see;
use super::{SearchContext, INFINITY};

/// Capture sequences deeper than this many plies past the quiescence entry
/// point stop extending and fall back to the stand-pat score.
const MAX_QDEPTH: u32 = 6;

/// Delta-pruning margin added to the captured piece's value before comparing
/// against alpha (`spec.md` §4.4, `DELTA_MARGIN=200`).
pub const DELTA_MARGIN: i32 = 200;

pub fn search(state: &mut GameState, alpha: i32, beta: i32, ctx: &mut SearchContext) -> i32 {
    search_inner(state, alpha, beta, ctx, 0)
}

fn search_inner(state: &mut GameState, mut alpha: i32, beta: i32, ctx: &mut SearchContext, qdepth: u32) -> i32 {
    if ctx.should_stop() {
        return 0;
    }

    let stand_pat = eval::evaluate(state);
    if stand_pat >= beta {
        return stand_pat;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }
    if qdepth >= MAX_QDEPTH {
        return stand_pat;
    }

    let side = state.side_to_move;
    let mut captures: Vec<_> = state
        .pieces_of(side)
        .filter(|p| !p.is_carried())
        .flat_map(|p| movegen::legal_destinations(state, p.id))
        .filter(|mv| see::is_capture(state, *mv))
        .collect();

    // Order by SEE descending so the best recaptures are searched (and can
    // raise alpha) before the pruning below starts discarding the rest.
    captures.sort_by_key(|mv| std::cmp::Reverse(see::see(state, *mv)));

    for mv in captures {
        let gain = see::see(state, mv);

        // SEE pruning of clearly losing captures after the first ply.
        if qdepth >= 1 && gain < 0 {
            continue;
        }

        // Delta pruning: even the best case (winning the whole exchange)
        // can't recover enough to challenge alpha.
        let victim_value = state.piece_at(mv.dest()).map_or(0, |p| p.material_value());
        if stand_pat + victim_value + DELTA_MARGIN < alpha && gain < DELTA_MARGIN {
            continue;
        }

        let undo = make(state, mv);
        let score = -search_inner(state, -beta, -alpha, ctx, qdepth + 1);
        super::make_unmake::unmake(state, undo);

        if score >= beta {
            return score;
        }
        if score > alpha {
            alpha = score;
        }
    }

    alpha.clamp(-INFINITY, INFINITY)
}
