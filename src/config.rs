//! Configuration surface: game mode, difficulty, and environment overrides.
//!
//! Mirrors `spec.md` §6. Modes and difficulties are tagged enums rather than
//! the source's bare strings (see the Design Notes' re-architecture list),
//! parsed case-insensitively at the boundary where a caller still hands us a
//! string.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Win-condition ruleset in force for a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Full,
    Marine,
    Air,
    Land,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Full
    }
}

impl Mode {
    pub fn parse(s: &str) -> Mode {
        match s.trim().to_ascii_lowercase().as_str() {
            "marine" => Mode::Marine,
            "air" => Mode::Air,
            "land" => Mode::Land,
            _ => Mode::Full,
        }
    }
}

/// CPU difficulty. Maps to a search budget per `spec.md` §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

impl Difficulty {
    pub fn parse(s: &str) -> Difficulty {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" | "beginner" => Difficulty::Easy,
            "hard" | "expert" => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }

    /// (max_depth, wall-clock time limit) per `spec.md` §6.
    pub fn budget(&self) -> (i32, Duration) {
        match self {
            Difficulty::Easy => (4, Duration::from_millis(2500)),
            Difficulty::Medium => (6, Duration::from_millis(3000)),
            Difficulty::Hard => (8, Duration::from_millis(8000)),
        }
    }

    /// Hard difficulty additionally enables the MCTS root driver (§4.5).
    pub fn uses_mcts(&self) -> bool {
        matches!(self, Difficulty::Hard)
    }
}

/// Backend selector for the evaluator. `Webgpu` always falls back to the CPU
/// evaluator (spec §9 Open Questions): "callers selecting it must not depend
/// on different scores."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvalBackend {
    #[default]
    Cpu,
    Webgpu,
    Auto,
}

impl EvalBackend {
    pub fn parse(s: &str) -> EvalBackend {
        match s.trim().to_ascii_lowercase().as_str() {
            "webgpu" => EvalBackend::Webgpu,
            "auto" => EvalBackend::Auto,
            _ => EvalBackend::Cpu,
        }
    }
}

/// Search budget and resource overrides, resolved once per `GameState` from
/// difficulty plus environment override points named in `spec.md` §6.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub mode: Mode,
    pub difficulty: Difficulty,
    pub max_depth: i32,
    pub time_limit: Duration,
    pub tt_size_mib: usize,
    pub force_single_thread: bool,
    pub eval_backend: EvalBackend,
}

/// Transposition table fallback ladder used on WebAssembly when the
/// configured size fails to allocate (`spec.md` §5 Resource policy).
pub const TT_SIZE_FALLBACK_MIB: [usize; 8] = [2048, 1024, 512, 256, 128, 64, 32, 8];

impl EngineConfig {
    pub fn new(mode: Mode, difficulty: Difficulty) -> EngineConfig {
        let (max_depth, time_limit) = difficulty.budget();
        EngineConfig {
            mode,
            difficulty,
            max_depth,
            time_limit,
            tt_size_mib: Self::env_tt_size_mib(),
            force_single_thread: Self::env_force_single_thread(),
            eval_backend: Self::env_eval_backend(),
        }
    }

    fn env_tt_size_mib() -> usize {
        std::env::var("CC_TT_SIZE_MIB")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(TT_SIZE_FALLBACK_MIB[0])
    }

    fn env_force_single_thread() -> bool {
        std::env::var("CC_FORCE_SINGLE_THREAD")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    fn env_eval_backend() -> EvalBackend {
        std::env::var("CC_EVAL_BACKEND")
            .ok()
            .map(|v| EvalBackend::parse(&v))
            .unwrap_or_default()
    }

    pub fn worker_count(&self) -> usize {
        if self.force_single_thread {
            1
        } else {
            std::thread::available_parallelism().map_or(1, |v| v.into())
        }
    }
}
