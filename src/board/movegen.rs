//! Move generation: the destinations each piece may legally reach.
//!
//! Pieces are polymorphic over a small capability set (`spec.md` §4.1): step,
//! slide-up-to-k, leap-k-in-8-directions, bombard-without-moving,
//! stand-and-strike, board-water-only, board-land-only, enter-reef-by-water,
//! carry-passenger, kamikaze-into-anti-air. Each per-kind function below
//! builds its candidates from a handful of shared ray/step helpers rather
//! than repeating the blocking/terrain arithmetic per piece.

use std::collections::HashSet;

use super::carry::{can_carry_kind, carrier_capacity};
use super::coords::{Coord, Offset, EIGHT_DIRS, ORTHOGONAL_DIRS};
use super::moves::Move;
use super::piece::{Piece, PieceKind, Side};
use super::terrain::{is_land, is_navigable_by_water, is_reef, is_sea, Terrain};
use super::GameState;

/// Land-side pieces permitted to transit a reef square mid-slide; everything
/// else must be ferried (Engineer) or carried (Navy) to cross the river.
/// `spec.md` names this capability only for Tank/Artillery/Engineer; left as
/// an explicit Open-Question resolution (see `DESIGN.md`).
const RIVER_CROSSERS: [PieceKind; 4] = [
    PieceKind::Tank,
    PieceKind::Artillery,
    PieceKind::Missile,
    PieceKind::AntiAircraft,
];

/// Chebyshev radius of an Anti-Aircraft piece's interception zone. Not given
/// a concrete number in `spec.md`; resolved as an Open Question in
/// `DESIGN.md` using the evaluator's "Af within 1-3" proximity band as the
/// closest available hint, narrowed to the zone that actually blocks flight.
pub const ANTI_AIR_RADIUS: i32 = 2;

/// One candidate reachable square for a piece, before stacking/taboo/anti-air
/// filtering is applied by [`generate_legal`].
#[derive(Debug, Clone, Copy)]
pub struct LegalMove {
    pub dest: Coord,
    /// Whether the mover actually relocates to `dest`, or captures in place
    /// and stays put (Tank bombarding the sea, Navy shooting the coast).
    pub relocates: bool,
}

fn land_enterable(kind: PieceKind, coord: &Coord) -> bool {
    match Terrain::of(coord) {
        Terrain::Land => true,
        Terrain::River => is_reef(coord) && RIVER_CROSSERS.contains(&kind),
        Terrain::Sea => false,
    }
}

/// Slides from `origin` along each direction up to `max_steps`, stopping at
/// the first occupied square (captured if enemy, otherwise excluded), and
/// only continuing onto squares `enterable` permits.
fn slide(
    state: &GameState,
    mover: &Piece,
    dirs: &[Offset],
    max_steps: i32,
    enterable: impl Fn(&Coord) -> bool,
) -> Vec<LegalMove> {
    let mut out = Vec::new();
    for &d in dirs {
        for step in 1..=max_steps {
            let dest = mover.coord() + d.scale(step);
            if !dest.in_bounds() || !enterable(&dest) {
                break;
            }
            match state.piece_at(dest) {
                None => out.push(LegalMove { dest, relocates: true }),
                Some(other) => {
                    if other.side != mover.side {
                        out.push(LegalMove { dest, relocates: true });
                    }
                    break;
                }
            }
        }
    }
    out
}

/// Steps one square in each direction.
fn step1(state: &GameState, mover: &Piece, dirs: &[Offset], enterable: impl Fn(&Coord) -> bool) -> Vec<LegalMove> {
    let mut out = Vec::new();
    for &d in dirs {
        let dest = mover.coord() + d;
        if dest.in_bounds() && enterable(&dest) {
            out.push(LegalMove { dest, relocates: true });
        }
    }
    out
}

/// Leaps up to `max_steps` in each of the eight directions, ignoring
/// blocking along the way (Air Force).
fn leap(state: &GameState, mover: &Piece, max_steps: i32) -> Vec<LegalMove> {
    let mut out = Vec::new();
    for &d in EIGHT_DIRS.iter() {
        for step in 1..=max_steps {
            let dest = mover.coord() + d.scale(step);
            if !dest.in_bounds() {
                break;
            }
            match state.piece_at(dest) {
                None => out.push(LegalMove { dest, relocates: true }),
                Some(other) if other.side != mover.side => {
                    out.push(LegalMove { dest, relocates: true });
                }
                _ => {}
            }
        }
    }
    out
}

/// A capture-only, non-relocating ranged attack at the given offsets
/// (Tank's sea bombardment, Navy's coastal strike, Missile's strike).
/// Ignores blocking — these are standoff attacks, not travel.
fn standoff_strike(
    state: &GameState,
    mover: &Piece,
    offsets: &[Offset],
    target_ok: impl Fn(&Piece) -> bool,
) -> Vec<LegalMove> {
    let mut out = Vec::new();
    for &d in offsets {
        let dest = mover.coord() + d;
        if !dest.in_bounds() {
            continue;
        }
        if let Some(target) = state.piece_at(dest) {
            if target.side != mover.side && target_ok(target) {
                out.push(LegalMove { dest, relocates: false });
            }
        }
    }
    out
}

fn offsets_up_to(dirs: &[Offset], max_steps: i32) -> Vec<Offset> {
    let mut out = Vec::new();
    for &d in dirs {
        for step in 1..=max_steps {
            out.push(d.scale(step));
        }
    }
    out
}

fn diagonal_dirs() -> Vec<Offset> {
    EIGHT_DIRS.iter().copied().filter(|d| d.dc != 0 && d.dr != 0).collect()
}

/// Squares strictly between `a` and `b`, which must share a file or rank.
fn squares_between(a: Coord, b: Coord) -> Vec<Coord> {
    let mut out = Vec::new();
    if a.col == b.col {
        let (lo, hi) = (a.row.min(b.row), a.row.max(b.row));
        for row in (lo + 1)..hi {
            out.push(Coord::new(a.col, row));
        }
    } else if a.row == b.row {
        let (lo, hi) = (a.col.min(b.col), a.col.max(b.col));
        for col in (lo + 1)..hi {
            out.push(Coord::new(col, a.row));
        }
    }
    out
}

/// The "mutual-line taboo": a Commander may never end its move on a file or
/// rank with a direct open line to the enemy Commander, *unless* that move
/// itself captures the enemy Commander (which ends the game before the
/// taboo could matter).
fn violates_commander_taboo(state: &GameState, mover: &Piece, dest: Coord) -> bool {
    let Some(enemy) = state.commander_of(mover.side.opponent()) else {
        return false;
    };
    if enemy.coord() == dest {
        return false;
    }
    if enemy.col != dest.col && enemy.row != dest.row {
        return false;
    }
    let blocked = squares_between(dest, enemy.coord())
        .iter()
        .any(|&sq| state.piece_at(sq).map_or(false, |p| p.id != mover.id));
    !blocked
}

/// Heroic promotion grants +1 range and diagonal movement (`spec.md`
/// Glossary, "Heroic"), applied uniformly across kinds: orthogonal-only
/// sliders/steppers gain the diagonal directions, everyone's range grows
/// by one.
fn dirs_for(base: &[Offset], hero: bool) -> Vec<Offset> {
    if hero {
        EIGHT_DIRS.to_vec()
    } else {
        base.to_vec()
    }
}

fn pseudo_candidates(state: &GameState, mover: &Piece) -> Vec<LegalMove> {
    let bonus = mover.hero as i32;
    match mover.kind {
        PieceKind::Commander => {
            let dirs = dirs_for(&ORTHOGONAL_DIRS, mover.hero);
            slide(state, mover, &dirs, 10 + bonus, |c| land_enterable(PieceKind::Commander, c))
        }
        PieceKind::Headquarters => Vec::new(),
        PieceKind::Infantry => {
            let dirs = dirs_for(&ORTHOGONAL_DIRS, mover.hero);
            ranged_step(state, mover, &dirs, 1 + bonus, |c| land_enterable(mover.kind, c))
        }
        PieceKind::Militia => ranged_step(state, mover, &EIGHT_DIRS, 1 + bonus, |c| land_enterable(mover.kind, c)),
        PieceKind::Tank => {
            let range = 2 + bonus;
            let dirs = dirs_for(&ORTHOGONAL_DIRS, mover.hero);
            let mut out = slide(state, mover, &dirs, range, |c| land_enterable(mover.kind, c));
            out.extend(standoff_strike(
                state,
                mover,
                &offsets_up_to(&dirs, range),
                |target| is_sea(&target.coord()),
            ));
            out
        }
        PieceKind::Engineer => {
            let dirs = dirs_for(&ORTHOGONAL_DIRS, mover.hero);
            ranged_step(state, mover, &dirs, 1 + bonus, |c| land_enterable(mover.kind, c))
        }
        PieceKind::Artillery => {
            let dirs = dirs_for(&ORTHOGONAL_DIRS, mover.hero);
            slide(state, mover, &dirs, 3 + bonus, |c| land_enterable(mover.kind, c))
        }
        PieceKind::AntiAircraft => {
            let dirs = dirs_for(&ORTHOGONAL_DIRS, mover.hero);
            ranged_step(state, mover, &dirs, 1 + bonus, |c| land_enterable(mover.kind, c))
        }
        PieceKind::Missile => {
            let range = 2 + bonus;
            let dirs = dirs_for(&ORTHOGONAL_DIRS, mover.hero);
            let mut out = slide(state, mover, &dirs, range, |c| land_enterable(mover.kind, c));
            let mut strike_offsets = offsets_up_to(&ORTHOGONAL_DIRS, range);
            strike_offsets.extend(diagonal_dirs());
            out.extend(standoff_strike(state, mover, &strike_offsets, |target| {
                !is_sea(&target.coord()) && target.kind != PieceKind::Navy
            }));
            out
        }
        PieceKind::AirForce => leap(state, mover, 4 + bonus),
        PieceKind::Navy => {
            let mut out = slide(state, mover, &EIGHT_DIRS, 4 + bonus, is_navigable_by_water);
            out.extend(standoff_strike(state, mover, &EIGHT_DIRS, |target| is_land(&target.coord())));
            out
        }
    }
}

/// Steps up to `max_steps` squares (not a blocking slide): used for the
/// short-range land pieces, whose heroic promotion extends reach to 2
/// without turning them into full sliders.
fn ranged_step(
    state: &GameState,
    mover: &Piece,
    dirs: &[Offset],
    max_steps: i32,
    enterable: impl Fn(&Coord) -> bool,
) -> Vec<LegalMove> {
    if max_steps <= 1 {
        return step1(state, mover, dirs, enterable);
    }
    slide(state, mover, dirs, max_steps, enterable)
}

/// Whether `piece` could reach `square` as a pseudo-legal destination from
/// its current position, ignoring stacking/taboo/anti-air filtering. Used
/// by static exchange evaluation, which cares only about physical reach.
pub fn can_reach(state: &GameState, piece: &Piece, square: Coord) -> bool {
    pseudo_candidates(state, piece).iter().any(|c| c.dest == square)
}

/// Squares any Anti-Aircraft piece of `side` projects its interception zone
/// over (`spec.md` §4.1).
pub fn anti_air_zone(state: &GameState, side: Side) -> HashSet<Coord> {
    let mut zone = HashSet::new();
    for p in state.pieces_of(side).filter(|p| p.kind == PieceKind::AntiAircraft) {
        for dc in -ANTI_AIR_RADIUS..=ANTI_AIR_RADIUS {
            for dr in -ANTI_AIR_RADIUS..=ANTI_AIR_RADIUS {
                let c = p.coord() + Offset::new(dc, dr);
                if c.in_bounds() && c.chebyshev(&p.coord()) <= ANTI_AIR_RADIUS {
                    zone.insert(c);
                }
            }
        }
    }
    zone
}

/// Every square a side's pieces could capture on, from the current
/// position, ignoring whose turn it actually is. Used for commander-safety
/// attacker counts, bombardment-return coverage, and the evaluator's attack
/// cache.
pub fn squares_attacked_by(state: &GameState, side: Side) -> HashSet<Coord> {
    attacked_with_duplicates(state, side).into_iter().collect()
}

/// Like [`squares_attacked_by`] but keeps one entry per attacking
/// (piece, destination) pair, so callers can tally attacker counts per
/// square (the evaluator's attack cache).
pub fn attacked_with_duplicates(state: &GameState, side: Side) -> Vec<Coord> {
    let mut out = Vec::new();
    for p in state.pieces_of(side).filter(|p| !p.is_carried()) {
        out.extend(pseudo_candidates(state, p).into_iter().map(|c| c.dest));
    }
    out
}

/// Full legal-move list for one piece, after stacking/taboo/anti-air
/// filtering.
pub fn generate_legal(state: &GameState, piece_id: i64) -> Vec<LegalMove> {
    let Some(mover) = state.piece_by_id(piece_id) else {
        return Vec::new();
    };

    // A carried piece still generates moves from the carrier's square (it
    // may disembark under its own power); it just isn't a blocking occupant
    // of that square for anyone else's `piece_at` lookup.
    let mut candidates = pseudo_candidates(state, mover);

    candidates.retain(|c| {
        if let Some(target) = state.piece_at(c.dest) {
            if target.id == mover.id {
                return false;
            }
            if target.side == mover.side {
                // The mover boards `target`: `target` is the carrier, the
                // mover becomes its passenger.
                return c.relocates
                    && can_carry_kind(target.kind, mover.kind)
                    && carrier_load(state, target.id) < carrier_capacity(target.kind);
            }
        }
        true
    });

    if mover.kind == PieceKind::Commander {
        candidates.retain(|c| !violates_commander_taboo(state, mover, c.dest));
    }

    if mover.kind == PieceKind::AirForce && !mover.hero {
        let enemy_aa = anti_air_zone(state, mover.side.opponent());
        candidates.retain(|c| !enemy_aa.contains(&c.dest));
    }

    candidates
}

fn carrier_load(state: &GameState, carrier_id: i64) -> usize {
    state.pieces.iter().filter(|p| p.carrier_id == carrier_id).count()
}

/// Read-only projection used by `serialize_state` and the simulator: the
/// legal `(piece_id, to_col, to_row)` triples for one piece.
pub fn legal_destinations(state: &GameState, piece_id: i64) -> Vec<Move> {
    generate_legal(state, piece_id)
        .into_iter()
        .map(|c| Move::new(piece_id, c.dest.col, c.dest.row))
        .collect()
}

/// Every legal move for the side to move, across all of its pieces.
pub fn all_legal_moves(state: &GameState, side: Side) -> Vec<Move> {
    let mut out = Vec::new();
    for p in state.pieces_of(side).filter(|p| !p.is_carried()) {
        out.extend(legal_destinations(state, p.id));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, Mode};

    #[test]
    fn fresh_position_has_legal_moves_for_both_sides() {
        let state = GameState::new_game(Mode::Full, Difficulty::Medium);
        assert!(!all_legal_moves(&state, Side::Red).is_empty());
        assert!(!all_legal_moves(&state, Side::Blue).is_empty());
    }

    #[test]
    fn headquarters_never_moves() {
        let state = GameState::new_game(Mode::Full, Difficulty::Medium);
        let hq = state.pieces.iter().find(|p| p.kind == PieceKind::Headquarters).unwrap();
        assert!(legal_destinations(&state, hq.id).is_empty());
    }

    #[test]
    fn navy_cannot_step_onto_land() {
        let state = GameState::new_game(Mode::Full, Difficulty::Medium);
        let navy = state.pieces.iter().find(|p| p.kind == PieceKind::Navy).unwrap();
        for mv in legal_destinations(&state, navy.id) {
            let dest = Coord::new(mv.to_col, mv.to_row);
            assert!(is_navigable_by_water(&dest) || !state.piece_at(dest).is_none());
        }
    }
}
