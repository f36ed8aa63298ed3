//! Board & Rules: position representation and the pieces that sit on it.
//!
//! `GameState` is the ordered piece list plus side-to-move, repetition
//! history, and game-over status (`spec.md` §3). It is created by
//! [`GameState::new_game`], mutated only by `apply_move`/`bot_move`
//! (see [`crate::api`]), and otherwise read-only.

pub mod carry;
pub mod coords;
pub mod movegen;
pub mod moves;
pub mod notation;
pub mod piece;
pub mod terrain;
pub mod win;
pub mod zobrist;

pub use coords::{Coord, Offset, BOARD_COLS, BOARD_ROWS, BOARD_SQUARES, EIGHT_DIRS, ORTHOGONAL_DIRS};
pub use moves::{LastMove, Move};
pub use piece::{Piece, PieceKind, Side, NO_CARRIER};

use crate::config::{Difficulty, EngineConfig, Mode};
use crate::error::EngineError;

pub mod prelude {
    pub use super::carry::*;
    pub use super::coords::*;
    pub use super::movegen::legal_destinations;
    pub use super::moves::*;
    pub use super::notation::*;
    pub use super::piece::*;
    pub use super::terrain::*;
    pub use super::win::*;
    pub use super::{GameState, BOARD_COLS, BOARD_ROWS, BOARD_SQUARES};
}

/// How many repetition hashes to retain. Bounded per `spec.md` §3 ("a bounded
/// stack of Zobrist hashes").
pub const MAX_REPETITION_HISTORY: usize = 512;

#[derive(Debug, Clone)]
pub struct GameState {
    pub pieces: Vec<Piece>,
    pub side_to_move: Side,
    pub hash_history: Vec<u64>,
    pub game_over: bool,
    pub result: Option<String>,
    pub last_move: Option<LastMove>,
    pub config: EngineConfig,
    next_piece_id: i64,
}

impl GameState {
    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    pub fn difficulty(&self) -> Difficulty {
        self.config.difficulty
    }

    /// The canonical Zobrist hash for the current position and side to move.
    pub fn hash(&self) -> u64 {
        Self::hash_of(&self.pieces, self.side_to_move)
    }

    pub fn hash_of(pieces: &[Piece], side_to_move: Side) -> u64 {
        let mut h = 0u64;
        for p in pieces {
            let state = zobrist::piece_state_index(p.kind, p.side, p.hero, p.is_carried());
            h ^= zobrist::piece_square_key(state, p.coord().index());
        }
        h ^ zobrist::side_to_move_key(side_to_move)
    }

    /// The top-level (non-carried) piece occupying `coord`, if any.
    ///
    /// Per the Design Notes' Open Questions, this selects the *first*
    /// non-carried piece at a square; behaviour is undefined (DEBUG-checked
    /// only) if the position invariant that forbids two top-level pieces on
    /// one square is ever violated.
    pub fn piece_at(&self, coord: Coord) -> Option<&Piece> {
        self.pieces
            .iter()
            .find(|p| !p.is_carried() && p.col == coord.col && p.row == coord.row)
    }

    pub fn piece_at_mut(&mut self, coord: Coord) -> Option<&mut Piece> {
        self.pieces
            .iter_mut()
            .find(|p| !p.is_carried() && p.col == coord.col && p.row == coord.row)
    }

    pub fn piece_by_id(&self, id: i64) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    pub fn piece_by_id_mut(&mut self, id: i64) -> Option<&mut Piece> {
        self.pieces.iter_mut().find(|p| p.id == id)
    }

    pub fn commander_of(&self, side: Side) -> Option<&Piece> {
        self.pieces
            .iter()
            .find(|p| p.side == side && p.kind == PieceKind::Commander)
    }

    pub fn pieces_of(&self, side: Side) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().filter(move |p| p.side == side)
    }

    pub fn next_id(&mut self) -> i64 {
        let id = self.next_piece_id;
        self.next_piece_id += 1;
        id
    }

    fn push_repetition(&mut self, hash: u64) {
        self.hash_history.push(hash);
        if self.hash_history.len() > MAX_REPETITION_HISTORY {
            self.hash_history.remove(0);
        }
    }

    /// Checks the structural invariants from `spec.md` §3/§8, returning the
    /// first violation found. Runs in every build — `spec.md` §7's fatal
    /// engine-invariant tier can't be a release no-op, since that's exactly
    /// the build a violation would otherwise pass through silently. Callers
    /// decide how to degrade: `board::moves::finish_ply` turns a violation
    /// into a panic that `search`/`api` catch at their boundary and recover
    /// from by falling back to the last known-good move, rather than let it
    /// reach the process.
    pub fn check_invariants(&self) -> Result<(), EngineError> {
        use std::collections::HashSet;

        let mut ids = HashSet::new();
        let mut top_level_squares = HashSet::new();
        for p in &self.pieces {
            if !p.coord().in_bounds() {
                return Err(EngineError::InvariantViolated(format!("piece {} off board", p.id)));
            }
            if !ids.insert(p.id) {
                return Err(EngineError::InvariantViolated(format!("duplicate piece id {}", p.id)));
            }

            if p.is_carried() {
                let Some(carrier) = self.piece_by_id(p.carrier_id) else {
                    return Err(EngineError::InvariantViolated(format!(
                        "piece {} carried by missing {}",
                        p.id, p.carrier_id
                    )));
                };
                if carrier.side != p.side {
                    return Err(EngineError::InvariantViolated("carrier/passenger side mismatch".to_string()));
                }
                if !carry::can_carry_kind(carrier.kind, p.kind) {
                    return Err(EngineError::InvariantViolated(format!(
                        "carrier {:?} cannot carry {:?}",
                        carrier.kind, p.kind
                    )));
                }
                if carrier.coord() != p.coord() {
                    return Err(EngineError::InvariantViolated("carried piece off carrier square".to_string()));
                }
            } else if !top_level_squares.insert(p.coord()) {
                return Err(EngineError::InvariantViolated(format!(
                    "two top-level pieces share square {:?}",
                    p.coord()
                )));
            }
        }

        for side in [Side::Red, Side::Blue] {
            let commanders = self.pieces_of(side).filter(|p| p.kind == PieceKind::Commander).count();
            if commanders > 1 && !self.game_over {
                return Err(EngineError::InvariantViolated(format!(
                    "side {:?} has {} commanders outside a terminal state",
                    side, commanders
                )));
            }
        }

        Ok(())
    }

    /// Builds a fresh game in the standard starting position.
    ///
    /// `spec.md` leaves the exact opening array unspecified; `original_source/`
    /// retained no files for this repository (see
    /// `examples/original_source/_INDEX.md`), so this layout is this crate's
    /// own symmetric arrangement, documented in `DESIGN.md`. It respects every
    /// placement invariant: land pieces sit on land, Navy sits in the sea
    /// lane, and each side starts with exactly one Commander and one
    /// Headquarters.
    pub fn new_game(mode: Mode, difficulty: Difficulty) -> GameState {
        let mut state = GameState {
            pieces: Vec::new(),
            side_to_move: Side::Red,
            hash_history: Vec::new(),
            game_over: false,
            result: None,
            last_move: None,
            config: EngineConfig::new(mode, difficulty),
            next_piece_id: 0,
        };

        for &(side, kind, col, row) in &RED_LAYOUT {
            let id = state.next_id();
            state.pieces.push(Piece::new(id, side, kind, col, row));
        }
        for &(_side, kind, col, row) in &RED_LAYOUT {
            let id = state.next_id();
            // Blue mirrors Red across the river (row' = BOARD_ROWS - 1 - row).
            let mirrored_row = BOARD_ROWS - 1 - row;
            state
                .pieces
                .push(Piece::new(id, Side::Blue, kind, col, mirrored_row));
        }

        let hash = state.hash();
        state.push_repetition(hash);
        state
            .check_invariants()
            .expect("the fresh starting layout should satisfy every structural invariant");
        state
    }
}

/// Red's half of the symmetric starting layout; Blue is this list mirrored
/// across the river (see `GameState::new_game`).
const RED_LAYOUT: [(Side, PieceKind, i32, i32); 22] = [
    (Side::Red, PieceKind::Commander, 5, 1),
    (Side::Red, PieceKind::Headquarters, 5, 0),
    (Side::Red, PieceKind::Infantry, 3, 1),
    (Side::Red, PieceKind::Infantry, 5, 2),
    (Side::Red, PieceKind::Infantry, 7, 1),
    (Side::Red, PieceKind::Militia, 4, 0),
    (Side::Red, PieceKind::Militia, 6, 0),
    (Side::Red, PieceKind::Militia, 5, 3),
    (Side::Red, PieceKind::Tank, 3, 2),
    (Side::Red, PieceKind::Tank, 7, 2),
    (Side::Red, PieceKind::Engineer, 4, 2),
    (Side::Red, PieceKind::Engineer, 6, 2),
    (Side::Red, PieceKind::Artillery, 3, 0),
    (Side::Red, PieceKind::Artillery, 7, 0),
    (Side::Red, PieceKind::AntiAircraft, 4, 1),
    (Side::Red, PieceKind::AntiAircraft, 6, 1),
    (Side::Red, PieceKind::Missile, 3, 3),
    (Side::Red, PieceKind::Missile, 7, 3),
    (Side::Red, PieceKind::AirForce, 4, 3),
    (Side::Red, PieceKind::AirForce, 6, 3),
    (Side::Red, PieceKind::Navy, 0, 1),
    (Side::Red, PieceKind::Navy, 1, 1),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, Mode};

    #[test]
    fn fresh_game_has_one_commander_per_side() {
        let state = GameState::new_game(Mode::Full, Difficulty::Medium);
        assert_eq!(
            state.pieces_of(Side::Red).filter(|p| p.kind == PieceKind::Commander).count(),
            1
        );
        assert_eq!(
            state.pieces_of(Side::Blue).filter(|p| p.kind == PieceKind::Commander).count(),
            1
        );
        assert_eq!(state.side_to_move, Side::Red);
        assert_eq!(state.hash_history.len(), 1);
    }

    #[test]
    fn piece_ids_are_unique() {
        let state = GameState::new_game(Mode::Full, Difficulty::Medium);
        let mut ids: Vec<i64> = state.pieces.iter().map(|p| p.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), state.pieces.len());
    }

    #[test]
    fn land_pieces_start_on_land() {
        let state = GameState::new_game(Mode::Full, Difficulty::Medium);
        for p in &state.pieces {
            if matches!(p.kind, PieceKind::Navy) {
                assert!(terrain::is_navigable_by_water(&p.coord()));
            } else if !matches!(p.kind, PieceKind::AirForce) {
                assert!(terrain::is_land(&p.coord()), "{:?} at {:?}", p.kind, p.coord());
            }
        }
    }
}
