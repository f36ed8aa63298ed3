//! A small hand-coded opening heuristic for Blue (`spec.md` §4.5, §9 Design
//! Notes: "re-architect as a table of position predicates mapped to ranked
//! candidate moves, scored the same way the root driver scores everything
//! else" — replacing the source's flat square-to-square opening list with
//! something `root::cpu_pick_move` can rank and fall through from).

use crate::board::{movegen, GameState, Move, PieceKind, Side};

type Predicate = fn(&GameState) -> bool;
type Candidates = fn(&GameState) -> Vec<Move>;

const BOOK: &[(Predicate, Candidates)] = &[
    (is_blue_first_move, develop_toward_center),
    (is_blue_early_game, advance_infantry_and_armor),
];

/// Consults the book for Blue's opening, if `state` matches an entry and at
/// least one candidate is still legal. `None` means the book has nothing to
/// say and the caller should fall back to full search.
pub fn consult(state: &GameState) -> Option<Vec<Move>> {
    if state.side_to_move != Side::Blue {
        return None;
    }
    for &(predicate, candidates) in BOOK {
        if !predicate(state) {
            continue;
        }
        let legal: Vec<Move> = candidates(state)
            .into_iter()
            .filter(|mv| movegen::generate_legal(state, mv.piece_id).iter().any(|c| c.dest == mv.dest()))
            .collect();
        if !legal.is_empty() {
            return Some(legal);
        }
    }
    None
}

fn ply_count(state: &GameState) -> usize {
    state.hash_history.len()
}

fn is_blue_first_move(state: &GameState) -> bool {
    ply_count(state) <= 1
}

fn is_blue_early_game(state: &GameState) -> bool {
    (2..=6).contains(&ply_count(state))
}

fn develop_toward_center(state: &GameState) -> Vec<Move> {
    state
        .pieces_of(Side::Blue)
        .filter(|p| matches!(p.kind, PieceKind::Tank | PieceKind::Infantry))
        .flat_map(|p| movegen::legal_destinations(state, p.id))
        .collect()
}

fn advance_infantry_and_armor(state: &GameState) -> Vec<Move> {
    state
        .pieces_of(Side::Blue)
        .filter(|p| matches!(p.kind, PieceKind::Infantry | PieceKind::Tank | PieceKind::Artillery))
        .flat_map(|p| movegen::legal_destinations(state, p.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, Mode};

    #[test]
    fn says_nothing_for_red() {
        let state = GameState::new_game(Mode::Full, Difficulty::Medium);
        assert!(consult(&state).is_none());
    }

    #[test]
    fn offers_legal_candidates_for_blue_first_move() {
        let mut state = GameState::new_game(Mode::Full, Difficulty::Medium);
        let red_move = movegen::all_legal_moves(&state, Side::Red)[0];
        crate::board::moves::apply_move(&mut state, red_move).unwrap();
        assert_eq!(state.side_to_move, Side::Blue);

        let candidates = consult(&state).expect("book should cover Blue's first move");
        for mv in candidates {
            assert!(movegen::generate_legal(&state, mv.piece_id).iter().any(|c| c.dest == mv.dest()));
        }
    }
}
