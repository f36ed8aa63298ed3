//! Move ordering tables: killers, butterfly history, continuation history,
//! and counter-moves (`spec.md` §4.4). Per the Design Notes these replace
//! the source's thread-local globals — they live on [`super::SearchContext`]
//! and are duplicated per worker rather than shared.

use std::collections::HashMap;

use crate::board::{Coord, PieceKind, Side};

const MAX_HISTORY: i32 = 16_384;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct HistoryKey {
    side: Side,
    kind: PieceKind,
    dc: i32,
    dr: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ContinuationKey {
    prev_dc: i32,
    prev_dr: i32,
    kind: PieceKind,
    dc: i32,
    dr: i32,
}

/// A killer/counter is remembered as the (from, to) squares that caused the
/// cutoff, not tied to a specific piece id — matching the classic killer
/// heuristic's square-pattern rather than per-piece identity.
pub type SquareMove = (Coord, Coord);

#[derive(Debug, Default, Clone)]
pub struct OrderingTables {
    killers: Vec<[Option<SquareMove>; 2]>,
    history: HashMap<HistoryKey, i32>,
    continuation: HashMap<ContinuationKey, i32>,
    counter_moves: HashMap<i64, SquareMove>,
}

impl OrderingTables {
    pub fn new() -> OrderingTables {
        OrderingTables { killers: vec![[None; 2]; 256], ..Default::default() }
    }

    fn ensure_ply(&mut self, ply: usize) {
        if ply >= self.killers.len() {
            self.killers.resize(ply + 1, [None; 2]);
        }
    }

    pub fn killers(&self, ply: usize) -> [Option<SquareMove>; 2] {
        self.killers.get(ply).copied().unwrap_or([None; 2])
    }

    pub fn record_killer(&mut self, ply: usize, from: Coord, to: Coord) {
        self.ensure_ply(ply);
        let slot = &mut self.killers[ply];
        if slot[0] != Some((from, to)) {
            slot[1] = slot[0];
            slot[0] = Some((from, to));
        }
    }

    fn offset(from: Coord, to: Coord) -> (i32, i32) {
        (to.col - from.col, to.row - from.row)
    }

    pub fn history_score(&self, side: Side, kind: PieceKind, from: Coord, to: Coord) -> i32 {
        let (dc, dr) = Self::offset(from, to);
        self.history.get(&HistoryKey { side, kind, dc, dr }).copied().unwrap_or(0)
    }

    /// Applies Stockfish-style history gravity: moves toward `bonus`,
    /// decaying faster the closer it already is to the cap.
    fn gravity_update(value: i32, bonus: i32) -> i32 {
        let clamped_bonus = bonus.clamp(-MAX_HISTORY, MAX_HISTORY);
        value + clamped_bonus - value * clamped_bonus.abs() / MAX_HISTORY
    }

    pub fn update_history(&mut self, side: Side, kind: PieceKind, from: Coord, to: Coord, bonus: i32) {
        let (dc, dr) = Self::offset(from, to);
        let key = HistoryKey { side, kind, dc, dr };
        let entry = self.history.entry(key).or_insert(0);
        *entry = Self::gravity_update(*entry, bonus);
    }

    pub fn continuation_score(&self, prev: Option<(Coord, Coord)>, kind: PieceKind, from: Coord, to: Coord) -> i32 {
        let Some((prev_from, prev_to)) = prev else {
            return 0;
        };
        let (prev_dc, prev_dr) = Self::offset(prev_from, prev_to);
        let (dc, dr) = Self::offset(from, to);
        self.continuation
            .get(&ContinuationKey { prev_dc, prev_dr, kind, dc, dr })
            .copied()
            .unwrap_or(0)
    }

    pub fn update_continuation(
        &mut self,
        prev: Option<(Coord, Coord)>,
        kind: PieceKind,
        from: Coord,
        to: Coord,
        bonus: i32,
    ) {
        let Some((prev_from, prev_to)) = prev else {
            return;
        };
        let (prev_dc, prev_dr) = Self::offset(prev_from, prev_to);
        let (dc, dr) = Self::offset(from, to);
        let key = ContinuationKey { prev_dc, prev_dr, kind, dc, dr };
        let entry = self.continuation.entry(key).or_insert(0);
        *entry = Self::gravity_update(*entry, bonus);
    }

    pub fn counter_move(&self, prev_dest: Coord) -> Option<SquareMove> {
        self.counter_moves.get(&(prev_dest.index() as i64)).copied()
    }

    pub fn set_counter_move(&mut self, prev_dest: Coord, mv: SquareMove) {
        self.counter_moves.insert(prev_dest.index() as i64, mv);
    }

    /// On a beta cutoff by a quiet move: install as killer, credit history
    /// and continuation history by `depth^2`, apply a quadratic malus to the
    /// other quiet moves already tried at this node, and record the counter
    /// to the previous move.
    pub fn on_quiet_cutoff(
        &mut self,
        ply: usize,
        side: Side,
        kind: PieceKind,
        from: Coord,
        to: Coord,
        other_quiets_tried: &[(PieceKind, Coord, Coord)],
        prev: Option<(Coord, Coord)>,
        depth: i32,
    ) {
        let bonus = depth * depth;
        self.record_killer(ply, from, to);
        self.update_history(side, kind, from, to, bonus);
        self.update_continuation(prev, kind, from, to, bonus);
        if let Some((_, prev_to)) = prev {
            self.set_counter_move(prev_to, (from, to));
        }
        for &(other_kind, other_from, other_to) in other_quiets_tried {
            self.update_history(side, other_kind, other_from, other_to, -bonus);
            self.update_continuation(prev, other_kind, other_from, other_to, -bonus);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_gravitates_toward_repeated_bonus() {
        let mut tables = OrderingTables::new();
        let from = Coord::new(3, 3);
        let to = Coord::new(3, 4);
        for _ in 0..5 {
            tables.update_history(Side::Red, PieceKind::Tank, from, to, 400);
        }
        assert!(tables.history_score(Side::Red, PieceKind::Tank, from, to) > 0);
    }

    #[test]
    fn killers_keep_the_two_most_recent() {
        let mut tables = OrderingTables::new();
        tables.record_killer(2, Coord::new(1, 1), Coord::new(1, 2));
        tables.record_killer(2, Coord::new(2, 2), Coord::new(2, 3));
        let k = tables.killers(2);
        assert_eq!(k[0], Some((Coord::new(2, 2), Coord::new(2, 3))));
        assert_eq!(k[1], Some((Coord::new(1, 1), Coord::new(1, 2))));
    }
}
