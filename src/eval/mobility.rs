//! Mobility, hanging pieces, and the per-kind safety/coverage terms that
//! hang off the attack cache (`spec.md` §4.3).

use crate::board::{GameState, PieceKind, Side};
use crate::config::Mode;

use super::attack_cache::AttackCache;

/// Approximate mobility: the count of squares `side` attacks. Kept as a
/// plain per-side quantity — like every other term `side_score` sums — so
/// the `red - blue` subtraction in `eval::evaluate` is what turns it into a
/// differential, rather than this function pre-differencing it itself.
pub fn mobility_score(cache: &AttackCache, side: Side) -> i32 {
    cache.popcount(side) as i32
}

/// Penalty for a piece sitting on a square attacked more times than it is
/// defended, scaled by what's hanging.
pub fn hanging_penalty(state: &GameState, cache: &AttackCache, side: Side) -> i32 {
    let mut penalty = 0;
    for p in state.pieces_of(side).filter(|p| !p.is_carried()) {
        let attackers = cache.attackers_on(side.opponent(), p.coord());
        let defenders = cache.attackers_on(side, p.coord());
        if attackers > defenders {
            let overload = (attackers - defenders) as i32;
            penalty += overload * p.material_value() / 10;
        }
    }
    -penalty
}

/// Navy safety: attackers minus defenders on each Navy square, plus a flat
/// sea-presence bonus.
pub fn navy_safety(state: &GameState, cache: &AttackCache, side: Side) -> i32 {
    let mut score = 0;
    for p in state.pieces_of(side).filter(|p| p.kind == PieceKind::Navy && !p.is_carried()) {
        let attackers = cache.attackers_on(side.opponent(), p.coord()) as i32;
        let defenders = cache.attackers_on(side, p.coord()) as i32;
        score += 15 - (attackers - defenders) * 20;
    }
    score
}

/// Air Force safety: a heavy penalty for an undefended Af under attack.
pub fn air_force_safety(state: &GameState, cache: &AttackCache, side: Side) -> i32 {
    let mut penalty = 0;
    for p in state.pieces_of(side).filter(|p| p.kind == PieceKind::AirForce && !p.is_carried()) {
        let attackers = cache.attackers_on(side.opponent(), p.coord());
        let defenders = cache.attackers_on(side, p.coord());
        if attackers > 0 && defenders == 0 {
            penalty += 160;
        }
    }
    -penalty
}

/// Anti-Aircraft coverage bonus for friendly Air Force sitting within 1-3
/// squares of a friendly Anti-Aircraft piece.
pub fn anti_aircraft_coverage_bonus(state: &GameState, side: Side) -> i32 {
    let mut score = 0;
    for af in state.pieces_of(side).filter(|p| p.kind == PieceKind::AirForce && !p.is_carried()) {
        let covered = state
            .pieces_of(side)
            .filter(|p| p.kind == PieceKind::AntiAircraft)
            .any(|aa| (1..=3).contains(&af.coord().chebyshev(&aa.coord())));
        if covered {
            score += 12;
        }
    }
    score
}

/// Missile aim bonus: reward a Missile sitting 2-4 squares from the enemy
/// Commander, where it threatens to strike soon.
pub fn missile_aim_bonus(state: &GameState, side: Side) -> i32 {
    let Some(enemy_commander) = state.commander_of(side.opponent()) else {
        return 0;
    };
    state
        .pieces_of(side)
        .filter(|p| p.kind == PieceKind::Missile && !p.is_carried())
        .filter(|p| (2..=4).contains(&p.coord().chebyshev(&enemy_commander.coord())))
        .count() as i32
        * 15
}

/// Mode-objective pressure: reward reducing the opponent's objective-kind
/// piece count toward the alternate win condition in force.
pub fn mode_objective_pressure(state: &GameState, side: Side) -> i32 {
    let target_kind = match state.mode() {
        Mode::Full => return 0,
        Mode::Marine => PieceKind::Navy,
        Mode::Air => PieceKind::AirForce,
        Mode::Land => {
            let enemy_land = state
                .pieces_of(side.opponent())
                .filter(|p| !matches!(p.kind, PieceKind::Navy | PieceKind::AirForce))
                .count() as i32;
            return (8 - enemy_land).max(0) * 25;
        }
    };
    let enemy_remaining = state.pieces_of(side.opponent()).filter(|p| p.kind == target_kind).count() as i32;
    (2 - enemy_remaining).max(0) * 120
}

/// Tempo (a small bonus for the side to move) plus a constant contempt
/// nudge away from accepting a draw.
pub fn tempo_and_contempt(state: &GameState, side: Side) -> i32 {
    const TEMPO: i32 = 10;
    const CONTEMPT: i32 = 8;
    (if state.side_to_move == side { TEMPO } else { 0 }) + CONTEMPT
}

/// When ahead on material, reward trades that shrink the opponent's piece
/// count (simplification toward a won endgame).
pub fn material_conversion_bonus(state: &GameState, side: Side, material_diff: i32) -> i32 {
    if material_diff <= 0 {
        return 0;
    }
    let my_pieces = state.pieces_of(side).count() as i32;
    let enemy_pieces = state.pieces_of(side.opponent()).count() as i32;
    if enemy_pieces < my_pieces {
        (my_pieces - enemy_pieces) * 6
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Difficulty;

    #[test]
    fn fresh_position_has_equal_mobility_when_cache_symmetric() {
        let state = GameState::new_game(Mode::Full, Difficulty::Medium);
        let cache = AttackCache::compute(&state);
        assert_eq!(mobility_score(&cache, Side::Red), mobility_score(&cache, Side::Blue));
    }

    #[test]
    fn no_hanging_pieces_at_the_start() {
        let state = GameState::new_game(Mode::Full, Difficulty::Medium);
        let cache = AttackCache::compute(&state);
        assert_eq!(hanging_penalty(&state, &cache, Side::Red), 0);
    }
}
