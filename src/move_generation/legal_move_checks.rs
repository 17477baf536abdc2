//! Terminal-state and threat detection.
//!
//! These checks read only the board, so the evaluator, the oracle, and the
//! search priority rules all agree on what "game over" and "master in danger"
//! mean for a given position.

use crate::game_state::game_state::GameState;
use crate::game_state::onitama_rules::goal_square;
use crate::game_state::onitama_types::{CandidateMove, Player, Square};

/// Winner decided by the board alone: a missing master loses, a master on the
/// opposing temple arch wins. A recorded `winner` takes precedence.
pub fn board_winner(game_state: &GameState) -> Option<Player> {
    if let Some(w) = game_state.winner {
        return Some(w);
    }
    for player in [Player::Red, Player::Blue] {
        match game_state.master_square(player) {
            None => return Some(player.opponent()),
            Some(sq) if sq == goal_square(player) => return Some(player),
            Some(_) => {}
        }
    }
    None
}

#[inline]
pub fn is_terminal(game_state: &GameState) -> bool {
    board_winner(game_state).is_some()
}

/// Squares of the opponent's pieces that could capture `player`'s master if
/// the opponent moved right now with its current hand.
pub fn master_attackers(game_state: &GameState, player: Player) -> Vec<Square> {
    let Some(master) = game_state.master_square(player) else {
        return Vec::new();
    };
    let enemy = player.opponent();
    let mut attackers = Vec::new();
    for (from, _) in game_state.pieces_of(enemy) {
        let hits = game_state
            .hand(enemy)
            .iter()
            .any(|card| card.offsets().any(|o| o.apply(from) == Some(master)));
        if hits {
            attackers.push(from);
        }
    }
    attackers
}

#[inline]
pub fn is_master_threatened(game_state: &GameState, player: Player) -> bool {
    !master_attackers(game_state, player).is_empty()
}

/// The move lands on the opposing master.
pub fn is_master_capture(game_state: &GameState, mv: &CandidateMove) -> bool {
    let Some(mover) = game_state.piece_at(mv.from).and_then(|p| p.owner()) else {
        return false;
    };
    game_state
        .piece_at(mv.to)
        .is_some_and(|p| p.is_master() && p.is_owned_by(mover.opponent()))
}

/// The move walks the mover's own master onto its goal square.
pub fn is_goal_arrival(game_state: &GameState, mv: &CandidateMove) -> bool {
    match game_state.piece_at(mv.from) {
        Some(p) if p.is_master() => match p.owner() {
            Some(owner) => mv.to == goal_square(owner),
            None => false,
        },
        _ => false,
    }
}

/// The move wins on the spot, by either route.
#[inline]
pub fn is_winning_move(game_state: &GameState, mv: &CandidateMove) -> bool {
    is_master_capture(game_state, mv) || is_goal_arrival(game_state, mv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::onitama_types::Piece;

    fn bare() -> GameState {
        GameState::empty_with_card_names(["Tiger", "Crab"], ["Ox", "Boar"], "Horse", Player::Red)
            .expect("cards exist")
    }

    #[test]
    fn new_game_is_not_terminal() {
        assert!(!is_terminal(&GameState::new_game()));
        assert_eq!(board_winner(&GameState::new_game()), None);
    }

    #[test]
    fn missing_master_loses() {
        let mut game = bare();
        game.place(Square::new(4, 2), Piece::master(Player::Red));
        assert_eq!(board_winner(&game), Some(Player::Red));
    }

    #[test]
    fn master_on_goal_wins_even_with_both_masters_present() {
        let mut game = bare();
        game.place(Square::new(0, 2), Piece::master(Player::Red));
        game.place(Square::new(3, 3), Piece::master(Player::Blue));
        assert_eq!(board_winner(&game), Some(Player::Red));
    }

    #[test]
    fn attackers_are_found_with_current_hand() {
        let mut game = bare();
        game.place(Square::new(4, 2), Piece::master(Player::Red));
        game.place(Square::new(0, 2), Piece::master(Player::Blue));
        // Blue holds Ox/Boar rotated: both step one row down toward Red.
        game.place(Square::new(3, 2), Piece::student(Player::Blue));
        assert_eq!(master_attackers(&game, Player::Red), vec![Square::new(3, 2)]);
        assert!(!is_master_threatened(&game, Player::Blue));
    }

    #[test]
    fn winning_move_classification() {
        let mut game = bare();
        game.place(Square::new(1, 2), Piece::master(Player::Red));
        game.place(Square::new(2, 4), Piece::master(Player::Blue));
        let to_goal = CandidateMove {
            from: Square::new(1, 2),
            to: Square::new(0, 2),
            card_index: 0,
            captures: false,
        };
        assert!(is_goal_arrival(&game, &to_goal));
        assert!(!is_master_capture(&game, &to_goal));
        assert!(is_winning_move(&game, &to_goal));
    }
}
