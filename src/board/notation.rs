//! Wire-level shapes: the dual JSON forms a caller may submit a move in, and
//! the serialized position sent back to the UI.
//!
//! `spec.md` §6 allows the same (piece-id, destination-column,
//! destination-row) triple under two field-naming conventions: the long form
//! `piece_id`/`to_col`/`to_row`, or the short alias `pid`/`dc`/`dr`. Both
//! deserialize to the same [`super::Move`]; this module is the one seam that
//! still speaks stringy/aliased JSON, the sole place that deals with text
//! instead of typed values.

use serde::{Deserialize, Serialize};

use super::movegen;
use super::piece::{Piece, Side};
use super::{Coord, GameState, LastMove, Move};

/// `spec.md` §3 defines `Move` as a single triple (piece-id,
/// destination-column, destination-row); §6 just allows two field-naming
/// conventions for that same triple — `{pid, dc, dr}` or the long form
/// `{piece_id, to_col, to_row}` — not two different move encodings. Both
/// sets of keys deserialize to the same absolute destination via `serde`
/// aliases.
#[derive(Debug, Clone, Deserialize)]
struct MoveWire {
    #[serde(alias = "pid")]
    piece_id: i64,
    #[serde(alias = "dc")]
    to_col: i32,
    #[serde(alias = "dr")]
    to_row: i32,
}

/// Parses either move shape against the current position.
pub fn parse_move(_state: &GameState, json: &str) -> serde_json::Result<Move> {
    let wire: MoveWire = serde_json::from_str(json)?;
    Ok(Move::new(wire.piece_id, wire.to_col, wire.to_row))
}

/// The full position as sent to a UI: every piece, whose turn it is, the
/// legal destinations for each of the side-to-move's pieces, and the last
/// move played (`spec.md` §6).
#[derive(Debug, Clone, Serialize)]
pub struct SerializedState {
    pub pieces: Vec<Piece>,
    pub side_to_move: Side,
    pub game_over: bool,
    pub result: Option<String>,
    pub last_move: Option<LastMove>,
    pub legal_moves: Vec<Move>,
}

pub fn serialize_state(state: &GameState) -> SerializedState {
    let legal_moves = movegen::all_legal_moves(state, state.side_to_move);
    SerializedState {
        pieces: state.pieces.clone(),
        side_to_move: state.side_to_move,
        game_over: state.game_over,
        result: state.result.clone(),
        last_move: state.last_move.clone(),
        legal_moves,
    }
}

/// Every board square a piece's sprite may occupy, grouped for a UI's board
/// layer (`spec.md` §6, `piece_sprites`). Each entry is `(square_index, piece)`.
pub fn piece_sprites(state: &GameState) -> Vec<(usize, Piece)> {
    state.pieces.iter().map(|p| (Coord::new(p.col, p.row).index(), *p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, Mode};

    #[test]
    fn absolute_shape_parses() {
        let state = GameState::new_game(Mode::Full, Difficulty::Medium);
        let id = state.pieces[0].id;
        let json = format!(r#"{{"piece_id":{},"to_col":5,"to_row":5}}"#, id);
        let mv = parse_move(&state, &json).unwrap();
        assert_eq!(mv, Move::new(id, 5, 5));
    }

    #[test]
    fn short_shape_is_an_alias_of_the_same_destination_triple() {
        let state = GameState::new_game(Mode::Full, Difficulty::Medium);
        let id = state.pieces[0].id;
        let json = format!(r#"{{"pid":{},"dc":5,"dr":5}}"#, id);
        let mv = parse_move(&state, &json).unwrap();
        assert_eq!(mv, Move::new(id, 5, 5));
    }
}
