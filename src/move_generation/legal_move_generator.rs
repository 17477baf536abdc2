//! Base-game legal move generation.
//!
//! Every owned piece may use either card in its owner's hand. A target must be
//! on the board and not hold a friendly or neutral piece. Variant pieces and
//! dual-role cards are not handled here; neutral pieces simply block.

use crate::game_state::game_state::GameState;
use crate::game_state::onitama_types::{CandidateMove, Player};
use crate::move_generation::legal_move_checks::{board_winner, is_terminal};
use crate::move_generation::move_generator::MoveOracle;

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl MoveOracle for StandardRules {
    fn legal_moves(&self, state: &GameState, player: Player) -> Vec<CandidateMove> {
        if is_terminal(state) {
            return Vec::new();
        }
        generate_moves(state, player)
    }

    fn is_terminal(&self, state: &GameState) -> bool {
        is_terminal(state)
    }

    fn winner(&self, state: &GameState) -> Option<Player> {
        board_winner(state)
    }
}

/// Pseudo-legal and legal coincide in Onitama: there is no self-check rule.
pub fn generate_moves(state: &GameState, player: Player) -> Vec<CandidateMove> {
    let mut moves = Vec::with_capacity(40);
    let enemy = player.opponent();
    for (from, _) in state.pieces_of(player) {
        for (card_index, card) in state.hand(player).iter().enumerate() {
            for offset in card.offsets() {
                let Some(to) = offset.apply(from) else {
                    continue;
                };
                let captures = match state.piece_at(to) {
                    None => false,
                    Some(p) if p.is_owned_by(enemy) => true,
                    Some(_) => continue,
                };
                moves.push(CandidateMove {
                    from,
                    to,
                    card_index,
                    captures,
                });
            }
        }
    }
    moves
}
