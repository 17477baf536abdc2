//! Rules-engine seam consumed by every strategy.
//!
//! Search never reasons about piece movement directly: it asks an oracle for
//! candidate moves and terminal status, and asks the transition function for
//! successor positions. Any rules implementation can sit behind this trait.

use crate::errors::EngineResult;
use crate::game_state::game_state::GameState;
use crate::game_state::onitama_types::{CandidateMove, Player};
use crate::move_generation::legal_move_apply::apply_move;

pub trait MoveOracle: Send + Sync {
    /// Legal moves for `player` in `state`, in no particular order.
    /// Empty when the game is over or the side is stuck.
    fn legal_moves(&self, state: &GameState, player: Player) -> Vec<CandidateMove>;

    fn is_terminal(&self, state: &GameState) -> bool;

    /// The winner of a terminal position, `None` while the game runs.
    fn winner(&self, state: &GameState) -> Option<Player>;

    /// Successor position; never mutates `state`.
    fn apply_move(&self, state: &GameState, mv: &CandidateMove) -> EngineResult<GameState> {
        apply_move(state, mv)
    }
}

/// Oracle that never offers a move. Useful for exercising the no-move paths.
pub struct NullMoveOracle;

impl MoveOracle for NullMoveOracle {
    fn legal_moves(&self, _state: &GameState, _player: Player) -> Vec<CandidateMove> {
        Vec::new()
    }

    fn is_terminal(&self, state: &GameState) -> bool {
        state.is_finished()
    }

    fn winner(&self, state: &GameState) -> Option<Player> {
        state.winner
    }
}
