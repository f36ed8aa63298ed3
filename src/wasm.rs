//! The WebAssembly boundary (`spec.md` §1: "engine compiled either natively
//! or to WebAssembly"; §6: the browser transport "calls the engine with
//! opaque JSON"). One opaque handle wrapping a [`GameState`]; every method
//! takes and returns JSON strings, the same opaque-payload contract the
//! HTTP session surface and worker bridge use, so neither collaborator
//! needs a second serialization scheme for the wasm target.

use wasm_bindgen::prelude::*;

use crate::api;
use crate::board::notation;
use crate::board::GameState;
use crate::config::{Difficulty, Mode};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

#[wasm_bindgen]
pub struct WasmEngine(GameState);

#[wasm_bindgen]
impl WasmEngine {
    /// `spec.md` §6 `new_game`: `mode`/`difficulty` are parsed
    /// case-insensitively, defaulting to full/medium on anything unrecognized.
    #[wasm_bindgen(constructor)]
    pub fn new(mode: &str, difficulty: &str) -> WasmEngine {
        WasmEngine(api::new_game(Mode::parse(mode), Difficulty::parse(difficulty)))
    }

    /// Applies a caller's move (either wire shape `notation::parse_move`
    /// accepts) and returns the resulting `ActionStatus` as JSON.
    #[wasm_bindgen(js_name = "applyMove")]
    pub fn apply_move(&mut self, move_json: &str) -> Result<String, JsValue> {
        let mv = notation::parse_move(&self.0, move_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let status = api::apply_move(&mut self.0, mv);
        serde_json::to_string(&status).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Picks and applies a move for the side to move, returning its
    /// `ActionStatus` as JSON (`spec.md` §6 `bot_move`).
    #[wasm_bindgen(js_name = "botMove")]
    pub fn bot_move(&mut self) -> Result<String, JsValue> {
        let status = api::bot_move(&mut self.0);
        serde_json::to_string(&status).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// A deep-copy snapshot of the position, including the side to move's
    /// legal moves, as JSON (`spec.md` §6 `serialize_state`).
    #[wasm_bindgen(js_name = "serializeState")]
    pub fn serialize_state(&self) -> Result<String, JsValue> {
        serde_json::to_string(&api::serialize_state(&self.0)).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// `square_index -> piece` payload for a UI's sprite layer, as a JSON
    /// object (`spec.md` §6 `piece_sprites`).
    #[wasm_bindgen(js_name = "pieceSprites")]
    pub fn piece_sprites(&self) -> Result<String, JsValue> {
        let sprites: std::collections::BTreeMap<String, crate::board::Piece> = api::piece_sprites(&self.0)
            .into_iter()
            .map(|(square, piece)| (square.to_string(), piece))
            .collect();
        serde_json::to_string(&sprites).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
