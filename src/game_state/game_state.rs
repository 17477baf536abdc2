//! Core position representation.
//!
//! `GameState` is the value every search explores. It is plain data with an
//! explicit field-wise `Clone` (no interior pointers), so every copy is a fully
//! independent position and sibling branches never alias each other.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::errors::{EngineError, EngineResult};
use crate::game_state::move_cards::{card_by_name, MoveCard, STANDARD_DECK};
use crate::game_state::onitama_rules::{home_row, DEFAULT_DEAL, TEMPLE_COLUMN};
use crate::game_state::onitama_types::*;

/// One side's hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerState {
    pub cards: [MoveCard; HAND_SIZE],
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameState {
    /// `[row][col]`, row 0 is Blue's home row.
    pub board: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
    /// Indexed by `Player::index()`.
    pub players: [PlayerState; 2],
    pub shared_card: MoveCard,
    pub current_player: Player,
    pub winner: Option<Player>,
    pub phase: GamePhase,
}

impl GameState {
    /// Standard opening with the fixed `DEFAULT_DEAL`.
    pub fn new_game() -> Self {
        let cards = DEFAULT_DEAL.map(|name| card_by_name(name).unwrap_or(STANDARD_DECK[0]));
        Self::with_deal(cards)
    }

    /// Standard opening with five random cards from the base deck.
    pub fn new_random_game<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = STANDARD_DECK;
        deck.shuffle(rng);
        Self::with_deal([deck[0], deck[1], deck[2], deck[3], deck[4]])
    }

    /// Standard piece layout; `cards` is Red's two, Blue's two, then the shared card.
    /// The shared card's stamp decides who moves first.
    pub fn with_deal(cards: [MoveCard; 5]) -> Self {
        let first = cards[4].stamp;
        let mut state = Self::empty_with_cards(
            [cards[0], cards[1]],
            [cards[2], cards[3]],
            cards[4],
            first,
        );
        for player in [Player::Red, Player::Blue] {
            let row = home_row(player);
            for col in 0..BOARD_SIZE as u8 {
                let piece = if col == TEMPLE_COLUMN {
                    Piece::master(player)
                } else {
                    Piece::student(player)
                };
                state.place(Square::new(row, col), piece);
            }
        }
        state
    }

    /// An empty board with the given hands. Cards are oriented for their
    /// holders; the shared card is oriented for `to_move`, who receives it next.
    pub fn empty_with_cards(
        red: [MoveCard; HAND_SIZE],
        blue: [MoveCard; HAND_SIZE],
        shared: MoveCard,
        to_move: Player,
    ) -> Self {
        Self {
            board: [[None; BOARD_SIZE]; BOARD_SIZE],
            players: [
                PlayerState {
                    cards: red.map(|c| c.oriented_for(Player::Red)),
                },
                PlayerState {
                    cards: blue.map(|c| c.oriented_for(Player::Blue)),
                },
            ],
            shared_card: shared.oriented_for(to_move),
            current_player: to_move,
            winner: None,
            phase: GamePhase::Playing,
        }
    }

    /// Build from card names; fails on unknown names.
    pub fn empty_with_card_names(
        red: [&str; HAND_SIZE],
        blue: [&str; HAND_SIZE],
        shared: &str,
        to_move: Player,
    ) -> EngineResult<Self> {
        let lookup = |name: &str| {
            card_by_name(name).ok_or_else(|| EngineError::InvalidState(format!("unknown card {name}")))
        };
        Ok(Self::empty_with_cards(
            [lookup(red[0])?, lookup(red[1])?],
            [lookup(blue[0])?, lookup(blue[1])?],
            lookup(shared)?,
            to_move,
        ))
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board[square.row as usize][square.col as usize]
    }

    #[inline]
    pub fn place(&mut self, square: Square, piece: Piece) {
        self.board[square.row as usize][square.col as usize] = Some(piece);
    }

    #[inline]
    pub fn clear(&mut self, square: Square) -> Option<Piece> {
        self.board[square.row as usize][square.col as usize].take()
    }

    #[inline]
    pub fn hand(&self, player: Player) -> &[MoveCard; HAND_SIZE] {
        &self.players[player.index()].cards
    }

    /// All occupied squares in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    pub fn pieces_of(&self, player: Player) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces().filter(move |(_, p)| p.is_owned_by(player))
    }

    pub fn master_square(&self, player: Player) -> Option<Square> {
        self.pieces_of(player)
            .find(|(_, p)| p.is_master())
            .map(|(sq, _)| sq)
    }

    pub fn piece_count(&self, player: Player) -> usize {
        self.pieces_of(player).count()
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.phase == GamePhase::Finished
    }

    /// Record a result; `winner` and `phase` always change together.
    #[inline]
    pub fn finish(&mut self, winner: Player) {
        self.winner = Some(winner);
        self.phase = GamePhase::Finished;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::onitama_rules::goal_square;

    #[test]
    fn new_game_has_five_pieces_per_side_and_masters_on_arches() {
        let game = GameState::new_game();
        for player in [Player::Red, Player::Blue] {
            assert_eq!(game.piece_count(player), 5);
            assert_eq!(
                game.master_square(player),
                Some(goal_square(player.opponent()))
            );
        }
        assert_eq!(game.winner, None);
        assert_eq!(game.phase, GamePhase::Playing);
    }

    #[test]
    fn shared_card_stamp_picks_first_player() {
        let game = GameState::new_game();
        assert_eq!(game.current_player, game.shared_card.stamp);
    }

    #[test]
    fn blue_hand_is_rotated_red_hand_is_not() {
        let game = GameState::new_game();
        assert!(game.hand(Player::Red).iter().all(|c| !c.is_rotated()));
        assert!(game.hand(Player::Blue).iter().all(|c| c.is_rotated()));
    }

    #[test]
    fn clone_is_independent() {
        let game = GameState::new_game();
        let mut copy = game.clone();
        copy.clear(Square::new(4, 0));
        copy.finish(Player::Blue);
        assert!(game.piece_at(Square::new(4, 0)).is_some());
        assert!(!game.is_finished());
        assert_ne!(game, copy);
    }

    #[test]
    fn unknown_card_name_is_rejected() {
        let err = GameState::empty_with_card_names(
            ["Tiger", "Crab"],
            ["Monkey", "Nope"],
            "Dragon",
            Player::Red,
        )
        .expect_err("unknown card should fail");
        assert!(matches!(err, EngineError::InvalidState(_)));
    }

    #[test]
    fn random_deal_uses_five_distinct_cards() {
        use rand::{rngs::StdRng, SeedableRng};
        let mut rng = StdRng::seed_from_u64(7);
        let game = GameState::new_random_game(&mut rng);
        let mut names: Vec<&str> = game
            .players
            .iter()
            .flat_map(|p| p.cards.iter().map(|c| c.name))
            .chain(std::iter::once(game.shared_card.name))
            .collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 5);
    }
}
