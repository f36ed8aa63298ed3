//! The external engine surface (`spec.md` §6): the only way the HTTP session
//! layer, worker bridge, and simulator are meant to touch a [`crate::board::GameState`].
//! Everything here is a thin wrapper over `board`/`search` — no rule or search
//! logic lives in this module.

pub mod game;
pub mod moves;
pub mod state;

pub use game::new_game;
pub use moves::{apply_move, bot_move};
pub use state::{piece_sprites, serialize_state};
