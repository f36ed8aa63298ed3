//! Commander safety and the attack-pressure ring around it (`spec.md`
//! §4.3). Named `king_safety` after the chess term the corpus uses for the
//! same shape of term; the piece in question is the Commander.

use crate::board::{movegen, Coord, GameState, Side, EIGHT_DIRS};

use super::attack_cache::AttackCache;

/// Attacker count mapped through this ladder, scaled by the midgame weight.
const ATTACKER_WEIGHT: [i32; 7] = [0, 40, 120, 260, 450, 700, 1000];

pub fn commander_safety(state: &GameState, cache: &AttackCache, side: Side, midgame_weight: i32) -> i32 {
    let Some(commander) = state.commander_of(side) else {
        return 0;
    };
    let attackers = cache.attackers_on(side.opponent(), commander.coord()) as usize;
    let base = -ATTACKER_WEIGHT[attackers.min(ATTACKER_WEIGHT.len() - 1)] * midgame_weight / 256;

    let shelter = EIGHT_DIRS
        .iter()
        .filter(|&&d| {
            let sq = commander.coord() + d;
            sq.in_bounds() && state.piece_at(sq).map_or(false, |p| p.side == side)
        })
        .count() as i32
        * 8;

    let escape_squares = EIGHT_DIRS
        .iter()
        .filter(|&&d| {
            let sq = commander.coord() + d;
            sq.in_bounds()
                && state.piece_at(sq).map_or(true, |p| p.side != side)
                && cache.attackers_on(side.opponent(), sq) == 0
        })
        .count();
    let virtual_mobility_penalty = if escape_squares <= 1 { 60 } else { 0 };

    base + shelter - virtual_mobility_penalty
}

/// Commander-threat bonus: any non-hero piece attacking the enemy
/// Commander's square.
pub fn commander_threat_bonus(state: &GameState, side: Side) -> i32 {
    let Some(enemy_commander) = state.commander_of(side.opponent()) else {
        return 0;
    };
    let target = enemy_commander.coord();
    state
        .pieces_of(side)
        .filter(|p| !p.hero && !p.is_carried())
        .filter(|p| movegen::generate_legal(state, p.id).iter().any(|c| c.dest == target))
        .count() as i32
        * 45
}

/// The 3x3 ring around the enemy Commander: direct attackers, defenders,
/// and escape squares, all from `side`'s perspective.
pub fn attack_pressure(state: &GameState, cache: &AttackCache, side: Side) -> i32 {
    let Some(enemy_commander) = state.commander_of(side.opponent()) else {
        return 0;
    };
    let center = enemy_commander.coord();

    let direct_attackers = cache.attackers_on(side, center) as i32;
    let direct_defenders = cache.attackers_on(side.opponent(), center) as i32;

    let mut ring_attackers = 0;
    let mut ring_defenders = 0;
    let mut ring_escapes = 0;
    for &d in EIGHT_DIRS.iter() {
        let sq: Coord = center + d;
        if !sq.in_bounds() {
            continue;
        }
        ring_attackers += cache.attackers_on(side, sq) as i32;
        ring_defenders += cache.attackers_on(side.opponent(), sq) as i32;
        if state.piece_at(sq).is_none() && cache.attackers_on(side.opponent(), sq) == 0 {
            ring_escapes += 1;
        }
    }

    direct_attackers * 30 - direct_defenders * 10 + ring_attackers * 8 - ring_defenders * 4 - ring_escapes * 5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, Mode};

    #[test]
    fn fresh_commanders_are_unattacked() {
        let state = GameState::new_game(Mode::Full, Difficulty::Medium);
        let cache = AttackCache::compute(&state);
        assert_eq!(commander_safety(&state, &cache, Side::Red, 256), commander_safety(&state, &cache, Side::Blue, 256));
    }
}
