//! Zobrist hashing.
//!
//! A table of 88 piece-states (kind x side x hero x carried-flag) x 132
//! squares of precomputed 64-bit keys, plus two side-to-move keys
//! (`spec.md` §3). The hash is the XOR over every piece's state-square key,
//! XORed with the side-to-move key. Keys are generated once, deterministically
//! from a fixed seed, via a `OnceLock` + seeded-hasher pattern rather than
//! pulling in a `rand` dependency purely to fill a lookup table (`spec.md`
//! §5: "Zobrist tables are initialised exactly once with a fixed seed").

use std::hash::{DefaultHasher, Hasher};
use std::sync::OnceLock;

use super::coords::BOARD_SQUARES;
use super::piece::{PieceKind, Side, NUM_PIECE_KINDS};

pub const NUM_PIECE_STATES: usize = NUM_PIECE_KINDS * 2 * 2 * 2; // kind x side x hero x carried

const ZOBRIST_SEED: u64 = 0xC0FF_EE5A_17C0_DE42;

struct ZobristTables {
    piece_square: Vec<u64>, // NUM_PIECE_STATES * BOARD_SQUARES
    side_to_move: [u64; 2],
}

static TABLES: OnceLock<ZobristTables> = OnceLock::new();

fn tables() -> &'static ZobristTables {
    TABLES.get_or_init(|| {
        let mut hasher = DefaultHasher::new();
        hasher.write_u64(ZOBRIST_SEED);

        let mut next = |tag: u64| -> u64 {
            hasher.write_u64(tag);
            hasher.finish()
        };

        let piece_square = (0..NUM_PIECE_STATES * BOARD_SQUARES)
            .map(|i| next(i as u64))
            .collect();
        let side_to_move = [next(u64::MAX), next(u64::MAX - 1)];

        ZobristTables { piece_square, side_to_move }
    })
}

/// Index of a (kind, side, hero, carried) piece-state in `0..NUM_PIECE_STATES`.
pub fn piece_state_index(kind: PieceKind, side: Side, hero: bool, carried: bool) -> usize {
    let mut i = kind.index();
    i = i * 2 + side.index();
    i = i * 2 + hero as usize;
    i = i * 2 + carried as usize;
    i
}

pub fn piece_square_key(state_index: usize, square: usize) -> u64 {
    tables().piece_square[state_index * BOARD_SQUARES + square]
}

pub fn side_to_move_key(side: Side) -> u64 {
    tables().side_to_move[side.index()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_states_hash_differently() {
        let a = piece_square_key(
            piece_state_index(PieceKind::Tank, Side::Red, false, false),
            10,
        );
        let b = piece_square_key(
            piece_state_index(PieceKind::Tank, Side::Blue, false, false),
            10,
        );
        assert_ne!(a, b);
    }

    #[test]
    fn deterministic_across_calls() {
        let a = piece_square_key(0, 5);
        let b = piece_square_key(0, 5);
        assert_eq!(a, b);
    }

    #[test]
    fn side_keys_distinct() {
        assert_ne!(side_to_move_key(Side::Red), side_to_move_key(Side::Blue));
    }
}
