//! The hand-crafted evaluator (`spec.md` §4.3).
//!
//! Returns an integer score "from the perspective of the side to move",
//! larger when that side is better — the convention a negamax search wants.
//! Every term is computed from Red's perspective and flipped with
//! `Side::perspective()`, the same sign trick a `Player`-style enum
//! provides for two-player scoring generally.

pub mod attack_cache;
pub mod king_safety;
pub mod material;
pub mod mobility;
pub mod pst;

use crate::board::{GameState, PieceKind, Side};

pub use attack_cache::AttackCache;

/// 0..=256 opening-to-endgame scalar derived from remaining non-Commander
/// material (`spec.md` §4.3, "phase-interpolated on an opening<->endgame
/// scalar derived from remaining material").
pub fn phase_weight(state: &GameState) -> i32 {
    const OPENING_MATERIAL: i32 = 2 * (300 + 3 * 180 + 3 * 140 + 2 * 420 + 2 * 160 + 2 * 380 + 2 * 260 + 2 * 400 + 2 * 500 + 2 * 460);
    let remaining: i32 = state
        .pieces
        .iter()
        .filter(|p| p.kind != PieceKind::Commander)
        .map(|p| p.kind.base_value())
        .sum();
    (remaining * 256 / OPENING_MATERIAL.max(1)).clamp(0, 256)
}

/// Full static evaluation of `state`, from the perspective of `state`'s side
/// to move.
pub fn evaluate(state: &GameState) -> i32 {
    let cache = AttackCache::compute(state);
    let opening_weight = phase_weight(state);
    let midgame_weight = 256 - (opening_weight - 128).abs() * 2;

    let red = side_score(state, &cache, Side::Red, opening_weight, midgame_weight);
    let blue = side_score(state, &cache, Side::Blue, opening_weight, midgame_weight);
    let from_red = red - blue;

    from_red * state.side_to_move.perspective()
}

fn side_score(state: &GameState, cache: &AttackCache, side: Side, opening_weight: i32, midgame_weight: i32) -> i32 {
    let material_diff = material::material_score(state, side) - material::material_score(state, side.opponent());

    material::material_score(state, side)
        + material::piece_pair_bonus(state, side)
        + pst::space_advance_score(state, side, opening_weight)
        + pst::hero_proximity_bonus(state, side)
        + king_safety::commander_threat_bonus(state, side)
        + king_safety::commander_safety(state, cache, side, midgame_weight)
        + king_safety::attack_pressure(state, cache, side)
        + mobility::mobility_score(cache, side)
        + mobility::hanging_penalty(state, cache, side)
        + mobility::navy_safety(state, cache, side)
        + mobility::air_force_safety(state, cache, side)
        + mobility::anti_aircraft_coverage_bonus(state, side)
        + mobility::missile_aim_bonus(state, side)
        + mobility::mode_objective_pressure(state, side)
        + mobility::tempo_and_contempt(state, side)
        + mobility::material_conversion_bonus(state, side, material_diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, Mode};

    #[test]
    fn fresh_position_is_near_zero() {
        let state = GameState::new_game(Mode::Full, Difficulty::Medium);
        let score = evaluate(&state);
        // Tempo + contempt favour the side to move by a small constant;
        // nothing else should break the starting position's symmetry.
        assert!(score.abs() < 50, "expected near-symmetric score, got {}", score);
    }

    #[test]
    fn phase_weight_starts_near_the_opening() {
        let state = GameState::new_game(Mode::Full, Difficulty::Medium);
        assert!(phase_weight(&state) > 200);
    }
}
