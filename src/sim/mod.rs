//! The benchmark/simulator runner `spec.md` §1 names ("invokes a `--sim`
//! entry point and aggregates win/draw counts"): plays a series of self-play
//! games to `--max_plies` or a terminal position and prints the
//! `RESULTS:`/`total seconds:` lines `run_sim_window.sh` parses.

pub mod options;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Instant;

pub use options::{SimOptions, StartMode};

use crate::board::{movegen, GameState, Move};
use crate::search::root;

#[derive(Debug, Default)]
struct Tally {
    red_wins: u32,
    blue_wins: u32,
    draws: u32,
}

enum Outcome {
    Red,
    Blue,
    Draw,
}

/// Runs the configured series of self-play games, printing the `RESULTS:`
/// and `total seconds:` lines, and returns the elapsed wall-clock seconds.
pub fn run(options: &SimOptions) -> f64 {
    let started = Instant::now();
    let mut tally = Tally::default();

    for game_index in 0..options.games.max(1) {
        match play_one_game(options, game_index as u64) {
            Outcome::Red => tally.red_wins += 1,
            Outcome::Blue => tally.blue_wins += 1,
            Outcome::Draw => tally.draws += 1,
        }
    }

    let elapsed = started.elapsed().as_secs_f64();
    println!(
        "RESULTS: games={} red_wins={} blue_wins={} draws={}",
        options.games, tally.red_wins, tally.blue_wins, tally.draws
    );
    println!("total seconds: {:.3}", elapsed);
    elapsed
}

fn play_one_game(options: &SimOptions, game_index: u64) -> Outcome {
    let mode = options.parsed_mode();
    let config = options.engine_config(mode);
    let mut state = GameState::new_game(mode, config.difficulty);
    state.config = config;

    for ply in 0..options.max_plies {
        if state.game_over {
            break;
        }

        let mv = if options.start() == StartMode::Alternate && ply < 2 {
            diversified_opening_move(&state, options.seed, game_index, ply)
        } else {
            root::pick_move(&state).map(|p| p.mv)
        };

        let Some(mv) = mv else { break };
        if crate::board::moves::apply_move(&mut state, mv).is_err() {
            break;
        }
    }

    classify(&state)
}

fn classify(state: &GameState) -> Outcome {
    match &state.result {
        Some(r) if r.starts_with("Red wins") => Outcome::Red,
        Some(r) if r.starts_with("Blue wins") => Outcome::Blue,
        _ => Outcome::Draw,
    }
}

/// A deterministic pseudo-random opening pick seeded from `(seed,
/// game_index, ply)`, the same hashing trick `board::zobrist` uses for its
/// own table seed, rather than pulling in a PRNG crate for two plies of
/// opening variety per game.
fn diversified_opening_move(state: &GameState, seed: u64, game_index: u64, ply: u32) -> Option<Move> {
    let moves = movegen::all_legal_moves(state, state.side_to_move);
    if moves.is_empty() {
        return None;
    }
    let mut hasher = DefaultHasher::new();
    (seed, game_index, ply).hash(&mut hasher);
    let index = (hasher.finish() as usize) % moves.len();
    Some(moves[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_short_fixed_series_produces_a_results_line() {
        let options = SimOptions {
            sim: true,
            games: 1,
            seed: 7,
            depth: Some(2),
            time_ms: Some(50),
            max_plies: 6,
            start_raw: "fixed".to_string(),
            eval_backend_raw: "cpu".to_string(),
            mcts: false,
            mode_raw: "full".to_string(),
        };
        let elapsed = run(&options);
        assert!(elapsed >= 0.0);
    }
}
