//! Move-tree counting for validating an oracle and timing generation.
//!
//! Finished positions are leaves: a node that ends the game is counted at the
//! depth where it occurs and never expanded.

use std::sync::Arc;
use std::thread;

use crate::errors::{EngineError, EngineResult};
use crate::game_state::game_state::GameState;
use crate::game_state::onitama_types::CandidateMove;
use crate::move_generation::move_generator::MoveOracle;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: usize,
    pub captures: usize,
    /// Leaf moves that captured a master.
    pub stone_wins: usize,
    /// Leaf moves that put a master on the opposing arch.
    pub stream_wins: usize,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.stone_wins += rhs.stone_wins;
        self.stream_wins += rhs.stream_wins;
    }
}

pub fn perft(oracle: &dyn MoveOracle, game_state: &GameState, depth: u8) -> EngineResult<PerftCounts> {
    if depth == 0 {
        return Ok(PerftCounts {
            nodes: 1,
            ..PerftCounts::default()
        });
    }

    let mut total = PerftCounts::default();
    for mv in oracle.legal_moves(game_state, game_state.current_player) {
        perft_recurse(oracle, game_state, &mv, depth, 1, &mut total)?;
    }
    Ok(total)
}

/// Same counts as `perft`, one thread per root move.
pub fn perft_multi_threaded(
    oracle: Arc<dyn MoveOracle>,
    game_state: &GameState,
    depth: u8,
) -> EngineResult<PerftCounts> {
    if depth == 0 {
        return perft(oracle.as_ref(), game_state, depth);
    }

    let root_moves = oracle.legal_moves(game_state, game_state.current_player);
    let mut handles = Vec::with_capacity(root_moves.len());

    for mv in root_moves {
        let oracle_ref = Arc::clone(&oracle);
        let root = game_state.clone();
        handles.push(thread::spawn(move || {
            let mut local = PerftCounts::default();
            let result = perft_recurse(oracle_ref.as_ref(), &root, &mv, depth, 1, &mut local);
            (result, local)
        }));
    }

    let mut total = PerftCounts::default();
    for handle in handles {
        let (result, local) = handle
            .join()
            .map_err(|_| EngineError::InvalidState("perft worker thread panicked".to_owned()))?;
        result?;
        total.merge(local);
    }

    Ok(total)
}

fn perft_recurse(
    oracle: &dyn MoveOracle,
    parent: &GameState,
    mv: &CandidateMove,
    search_depth: u8,
    current_depth: u8,
    counts: &mut PerftCounts,
) -> EngineResult<()> {
    let next = oracle.apply_move(parent, mv)?;
    let finished = oracle.is_terminal(&next);

    if current_depth == search_depth || finished {
        counts.nodes += 1;
        if mv.captures {
            counts.captures += 1;
        }
        if finished {
            let mover = parent.current_player;
            if next.master_square(mover.opponent()).is_none() {
                counts.stone_wins += 1;
            } else {
                counts.stream_wins += 1;
            }
        }
        return Ok(());
    }

    for child in oracle.legal_moves(&next, next.current_player) {
        perft_recurse(oracle, &next, &child, search_depth, current_depth + 1, counts)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::onitama_types::{Piece, Player, Square};
    use crate::move_generation::legal_move_generator::StandardRules;

    #[test]
    fn depth_zero_is_one_node() {
        let counts = perft(&StandardRules, &GameState::new_game(), 0).expect("perft runs");
        assert_eq!(counts.nodes, 1);
    }

    #[test]
    fn opening_depth_one_matches_move_count() {
        let counts = perft(&StandardRules, &GameState::new_game(), 1).expect("perft runs");
        assert_eq!(counts.nodes, 10);
        assert_eq!(counts.captures, 0);
        assert_eq!(counts.stone_wins + counts.stream_wins, 0);
    }

    #[test]
    fn threaded_counts_match_single_thread() {
        let game = GameState::new_game();
        let single = perft(&StandardRules, &game, 3).expect("perft runs");
        let threaded = perft_multi_threaded(Arc::new(StandardRules), &game, 3).expect("perft runs");
        assert_eq!(single, threaded);
        assert!(single.nodes > 100);
    }

    #[test]
    fn winning_moves_are_counted_as_leaves() {
        // Boar steps Red's master onto the Blue arch; Tiger lets the student
        // capture the Blue master. Blue has no winning reply to any other move.
        let mut game = GameState::empty_with_card_names(
            ["Boar", "Tiger"],
            ["Ox", "Horse"],
            "Crab",
            Player::Red,
        )
        .expect("cards exist");
        game.place(Square::new(1, 2), Piece::master(Player::Red));
        game.place(Square::new(2, 4), Piece::student(Player::Red));
        game.place(Square::new(0, 4), Piece::master(Player::Blue));
        let counts = perft(&StandardRules, &game, 2).expect("perft runs");
        assert_eq!(counts.stream_wins, 1);
        assert_eq!(counts.stone_wins, 1);
    }
}
