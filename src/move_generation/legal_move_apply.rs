//! Applies a move and rotates the played card through the shared slot.

use crate::errors::{EngineError, EngineResult};
use crate::game_state::game_state::GameState;
use crate::game_state::onitama_rules::goal_square;
use crate::game_state::onitama_types::{CandidateMove, HAND_SIZE};

/// Play `mv` on a copy of `game_state` and return the copy.
///
/// The mover is the owner of the piece on the from-square. Card exchange,
/// rotation, turn switch, and win detection all happen here so callers never
/// touch hands or the shared card themselves.
pub fn apply_move(game_state: &GameState, mv: &CandidateMove) -> EngineResult<GameState> {
    if game_state.is_finished() {
        return Err(EngineError::InvalidMove("game is already finished".to_owned()));
    }
    if mv.card_index >= HAND_SIZE {
        return Err(EngineError::InvalidMove(format!(
            "card index {} out of range",
            mv.card_index
        )));
    }

    let moving = game_state
        .piece_at(mv.from)
        .ok_or_else(|| EngineError::InvalidMove(format!("no piece on {:?}", mv.from)))?;
    let mover = moving
        .owner()
        .ok_or_else(|| EngineError::InvalidMove("neutral pieces cannot be moved".to_owned()))?;

    let played = game_state.hand(mover)[mv.card_index];
    let reachable = played.offsets().any(|o| o.apply(mv.from) == Some(mv.to));
    if !reachable {
        return Err(EngineError::InvalidMove(format!(
            "{} cannot reach {:?} from {:?}",
            played.name, mv.to, mv.from
        )));
    }

    let target = game_state.piece_at(mv.to);
    if let Some(occupant) = target {
        if !occupant.is_owned_by(mover.opponent()) {
            return Err(EngineError::InvalidMove(format!(
                "target {:?} is blocked",
                mv.to
            )));
        }
    }

    let mut next = game_state.clone();

    next.clear(mv.from);
    next.place(mv.to, moving);

    // The played card turns to face the opponent; the old shared card is
    // already facing the mover.
    let incoming = next.shared_card;
    next.shared_card = played.rotated();
    next.players[mover.index()].cards[mv.card_index] = incoming;

    next.current_player = mover.opponent();

    let captured_master = target.is_some_and(|p| p.is_master());
    let reached_goal = moving.is_master() && mv.to == goal_square(mover);
    if captured_master || reached_goal {
        next.finish(mover);
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::move_cards::Offset;
    use crate::game_state::onitama_types::{GamePhase, Piece, Player, Square};

    fn mv(from: (u8, u8), to: (u8, u8), card_index: usize, captures: bool) -> CandidateMove {
        CandidateMove {
            from: Square::new(from.0, from.1),
            to: Square::new(to.0, to.1),
            card_index,
            captures,
        }
    }

    #[test]
    fn apply_move_does_not_mutate_input() {
        let game = GameState::new_game();
        let before = game.clone();
        // Red Tiger (card 0): student on e1 jumps two rows forward.
        let next = apply_move(&game, &mv((4, 4), (2, 4), 0, false)).expect("legal move");
        assert_eq!(game, before);
        assert_ne!(next, before);
        let _ = apply_move(&game, &mv((4, 0), (2, 0), 0, false)).expect("legal move");
        assert_eq!(game, before);
    }

    #[test]
    fn played_card_becomes_shared_rotated_and_shared_enters_hand_unrotated() {
        let game = GameState::new_game();
        let played = game.hand(Player::Red)[0];
        let shared = game.shared_card;

        let next = apply_move(&game, &mv((4, 4), (2, 4), 0, false)).expect("legal move");

        assert!(next.shared_card.same_card(&played));
        let before: Vec<Offset> = played.offsets().collect();
        let after: Vec<Offset> = next.shared_card.offsets().collect();
        assert_eq!(
            after,
            before.iter().map(|o| o.negated()).collect::<Vec<_>>()
        );
        assert_eq!(next.hand(Player::Red)[0], shared);
        assert_eq!(next.hand(Player::Red)[1], game.hand(Player::Red)[1]);
        assert_eq!(next.hand(Player::Blue), game.hand(Player::Blue));
        assert_eq!(next.current_player, Player::Blue);
    }

    #[test]
    fn capturing_master_finishes_game() {
        let mut game = GameState::empty_with_card_names(
            ["Tiger", "Crab"],
            ["Ox", "Boar"],
            "Horse",
            Player::Red,
        )
        .expect("cards exist");
        game.place(Square::new(4, 2), Piece::master(Player::Red));
        game.place(Square::new(3, 1), Piece::student(Player::Red));
        game.place(Square::new(1, 1), Piece::master(Player::Blue));

        let next = apply_move(&game, &mv((3, 1), (1, 1), 0, true)).expect("tiger jump");
        assert_eq!(next.winner, Some(Player::Red));
        assert_eq!(next.phase, GamePhase::Finished);
        assert_eq!(next.piece_count(Player::Blue), 0);
    }

    #[test]
    fn master_reaching_goal_finishes_game() {
        let mut game = GameState::empty_with_card_names(
            ["Tiger", "Crab"],
            ["Ox", "Boar"],
            "Horse",
            Player::Red,
        )
        .expect("cards exist");
        game.place(Square::new(1, 2), Piece::master(Player::Red));
        game.place(Square::new(2, 4), Piece::master(Player::Blue));

        let next = apply_move(&game, &mv((1, 2), (0, 2), 1, false)).expect("crab step");
        assert_eq!(next.winner, Some(Player::Red));
        assert!(next.is_finished());
    }

    #[test]
    fn rejects_friendly_target_bad_geometry_and_bad_card_index() {
        let game = GameState::new_game();
        assert!(matches!(
            apply_move(&game, &mv((4, 1), (4, 3), 1, false)),
            Err(EngineError::InvalidMove(_))
        ));
        assert!(matches!(
            apply_move(&game, &mv((4, 1), (3, 3), 0, false)),
            Err(EngineError::InvalidMove(_))
        ));
        assert!(matches!(
            apply_move(&game, &mv((4, 1), (2, 1), 2, false)),
            Err(EngineError::InvalidMove(_))
        ));
        assert!(matches!(
            apply_move(&game, &mv((2, 2), (1, 2), 0, false)),
            Err(EngineError::InvalidMove(_))
        ));
    }
}
