//! Engine error taxonomy.
//!
//! `spec.md` §7 distinguishes three condition classes: user-move errors
//! (surfaced to the caller, state unchanged), search-budget exhaustion
//! (bot returns a sentinel move), and fatal invariant violations (the search
//! aborts and falls back to the last known-good move, never the process).
//! Only the first class is meant to be displayed to a caller; the others are
//! logged and handled internally by `search`/`api`.

use thiserror::Error;

use crate::board::Move;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("piece not found")]
    PieceNotFound,

    #[error("not this piece's turn")]
    NotYourTurn,

    #[error("illegal move")]
    IllegalMove,

    #[error("game is already over")]
    GameOver,

    #[error("bot could not find a legal move")]
    NoMoveFound,

    #[error("engine invariant violated: {0}")]
    InvariantViolated(String),
}

impl EngineError {
    /// True for the errors that §7 classifies as fatal engine invariants —
    /// these must never be surfaced verbatim to a caller as a move error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::InvariantViolated(_))
    }
}

/// Result of `apply_move`, mirroring the `{ ok, error?, game_over?, result? }`
/// shape named in `spec.md` §6.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ActionStatus {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub game_over: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied: Option<Move>,
}

impl ActionStatus {
    pub fn ok(game_over: bool, result: Option<String>, applied: Move) -> Self {
        ActionStatus {
            ok: true,
            error: None,
            game_over,
            result,
            applied: Some(applied),
        }
    }

    pub fn err(e: EngineError) -> Self {
        ActionStatus {
            ok: false,
            error: Some(e.to_string()),
            game_over: false,
            result: None,
            applied: None,
        }
    }
}
