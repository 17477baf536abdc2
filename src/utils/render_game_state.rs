//! Terminal-oriented Unicode board renderer.
//!
//! Draws the 5x5 board with file/rank labels matching `move_notation`, then
//! the hands and the shared card, for debugging and the demo binaries.

use crate::game_state::game_state::GameState;
use crate::game_state::move_cards::MoveCard;
use crate::game_state::onitama_types::{Affiliation, Piece, PieceRole, Player, Square, BOARD_SIZE};

/// Render the board to a Unicode string for terminal output.
///
/// Blue's home row is drawn on top, so rank 5 is the first line.
pub fn render_game_state(game_state: &GameState) -> String {
    let mut out = String::new();

    out.push_str("  a b c d e\n");
    for row in 0..BOARD_SIZE as u8 {
        let rank = char::from(b'0' + (BOARD_SIZE as u8 - row));
        out.push(rank);
        out.push(' ');
        for col in 0..BOARD_SIZE as u8 {
            match game_state.piece_at(Square::new(row, col)) {
                Some(piece) => out.push(piece_to_unicode(piece)),
                None => out.push('·'),
            }
            if usize::from(col) + 1 < BOARD_SIZE {
                out.push(' ');
            }
        }
        out.push(' ');
        out.push(rank);
        out.push('\n');
    }
    out.push_str("  a b c d e\n");

    for player in [Player::Blue, Player::Red] {
        let marker = if game_state.current_player == player {
            '>'
        } else {
            ' '
        };
        let hand = game_state.hand(player);
        out.push_str(&format!(
            "{marker} {:<4} {} {}\n",
            player.name(),
            card_label(&hand[0]),
            card_label(&hand[1])
        ));
    }
    out.push_str(&format!("  shared {}", card_label(&game_state.shared_card)));
    if let Some(winner) = game_state.winner {
        out.push_str(&format!("\n  winner {}", winner.name()));
    }

    out
}

fn card_label(card: &MoveCard) -> String {
    if card.is_rotated() {
        format!("{}*", card.name)
    } else {
        card.name.to_owned()
    }
}

fn piece_to_unicode(piece: Piece) -> char {
    match (piece.affiliation, piece.role) {
        (Affiliation::Player(Player::Red), PieceRole::Master) => '♔',
        (Affiliation::Player(Player::Red), PieceRole::Student) => '♙',
        (Affiliation::Player(Player::Blue), PieceRole::Master) => '♚',
        (Affiliation::Player(Player::Blue), PieceRole::Student) => '♟',
        (Affiliation::Neutral, _) => '◆',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_board_layout() {
        let text = render_game_state(&GameState::new_game());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "  a b c d e");
        assert_eq!(lines[1], "5 ♟ ♟ ♚ ♟ ♟ 5");
        assert_eq!(lines[3], "3 · · · · · 3");
        assert_eq!(lines[5], "1 ♙ ♙ ♔ ♙ ♙ 1");
        assert!(text.contains("> red  Tiger Crab"));
        assert!(text.contains("  blue Monkey* Crane*"));
        assert!(text.contains("shared Dragon"));
    }
}
