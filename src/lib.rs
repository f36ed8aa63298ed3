#![allow(dead_code)]

//! Commander Chess — the game engine core.
//!
//! This crate implements the rule system, move generator, position
//! representation, and adversarial search for Commander Chess, a two-player
//! abstract strategy game played on an 11x12 grid of sea, river and land
//! terrain. The HTTP session surface, browser transport, front-end
//! presentation and benchmark runner that embed this engine all live outside
//! this crate; they talk to it exclusively through the [`api`] surface.

pub mod api;
pub mod board;
pub mod config;
pub mod error;
pub mod eval;
pub mod search;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub mod prelude {
    pub use super::api::*;
    pub use super::board::prelude::*;
    pub use super::config::*;
    pub use super::error::*;

    pub use std::collections::{HashMap, HashSet};

    pub type Result<T> = std::result::Result<T, crate::error::EngineError>;
}
