//! CLI flags for the simulator binary (`spec.md` §6, "Simulator CLI").
//!
//! A `clap`-derived flag struct parsed once in `main`, consulted by
//! [`super::run`]. A few fields keep
//! `spec.md`'s exact underscored flag names (`--time_ms`, `--max_plies`,
//! `--eval_backend`) rather than clap's default kebab-case.

use std::time::Duration;

use clap::Parser;

use crate::config::{Difficulty, EngineConfig, EvalBackend, Mode};

/// Whether consecutive games in the series vary their opening plies
/// (`Alternate`) or always play the engine's own top choice from move one
/// (`Fixed`), matching `spec.md`'s `--start alternate|fixed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartMode {
    Alternate,
    Fixed,
}

impl StartMode {
    fn parse(s: &str) -> StartMode {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => StartMode::Fixed,
            _ => StartMode::Alternate,
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(name = "cc-sim", about = "Commander Chess self-play simulator")]
pub struct SimOptions {
    /// Runs the self-play simulator — the binary's only mode.
    #[arg(long)]
    pub sim: bool,

    #[arg(long, default_value_t = 1)]
    pub games: u32,

    #[arg(long, default_value_t = 1)]
    pub seed: u64,

    /// Overrides the difficulty's own search depth budget.
    #[arg(long)]
    pub depth: Option<i32>,

    #[arg(long = "time_ms")]
    pub time_ms: Option<u64>,

    #[arg(long = "max_plies", default_value_t = 400)]
    pub max_plies: u32,

    #[arg(long = "start", default_value = "alternate")]
    pub(crate) start_raw: String,

    #[arg(long = "eval_backend", default_value = "cpu")]
    pub(crate) eval_backend_raw: String,

    /// Forces the Hard-difficulty MCTS+αβ root driver regardless of depth.
    #[arg(long)]
    pub mcts: bool,

    /// Not among `spec.md`'s simulator flags, but carried over from the
    /// engine's own mode surface (`spec.md` §6) so the simulator can
    /// exercise every win-condition mode, not only "full".
    #[arg(long = "mode", default_value = "full")]
    pub(crate) mode_raw: String,
}

impl SimOptions {
    pub fn start(&self) -> StartMode {
        StartMode::parse(&self.start_raw)
    }

    pub fn parsed_mode(&self) -> Mode {
        Mode::parse(&self.mode_raw)
    }

    /// Builds the `EngineConfig` every game in the series uses: the
    /// difficulty's own (depth, time) budget, overridden by `--depth`/
    /// `--time_ms` when given, `--mcts` forcing the Hard driver, and
    /// `--eval_backend` overriding the environment-derived default.
    pub fn engine_config(&self, mode: Mode) -> EngineConfig {
        let difficulty = if self.mcts { Difficulty::Hard } else { Difficulty::Medium };
        let mut config = EngineConfig::new(mode, difficulty);
        if let Some(depth) = self.depth {
            config.max_depth = depth;
        }
        if let Some(ms) = self.time_ms {
            config.time_limit = Duration::from_millis(ms);
        }
        config.eval_backend = EvalBackend::parse(&self.eval_backend_raw);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_mode_defaults_to_alternate_on_garbage_input() {
        assert_eq!(StartMode::parse("bogus"), StartMode::Alternate);
        assert_eq!(StartMode::parse("Fixed"), StartMode::Fixed);
    }
}
