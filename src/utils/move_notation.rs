//! Text notation for squares and moves.
//!
//! Squares read `a1..e5`: files a..e are columns 0..4 and rank 1 is Red's
//! home row (row 4). Moves read `<Card>:<from><to>`, e.g. `Tiger:c1c3`.

use crate::errors::{EngineError, EngineResult};
use crate::game_state::game_state::GameState;
use crate::game_state::onitama_types::{CandidateMove, Square, BOARD_SIZE};

pub fn square_to_text(square: Square) -> String {
    let file = char::from(b'a' + square.col);
    let rank = BOARD_SIZE as u8 - square.row;
    format!("{file}{rank}")
}

pub fn parse_square(text: &str) -> EngineResult<Square> {
    let bytes = text.as_bytes();
    if bytes.len() != 2 {
        return Err(EngineError::InvalidMove(format!("bad square '{text}'")));
    }
    let file = bytes[0].to_ascii_lowercase();
    let rank = bytes[1];
    if !(b'a'..b'a' + BOARD_SIZE as u8).contains(&file)
        || !(b'1'..b'1' + BOARD_SIZE as u8).contains(&rank)
    {
        return Err(EngineError::InvalidMove(format!("bad square '{text}'")));
    }
    Ok(Square::new(
        BOARD_SIZE as u8 - (rank - b'0'),
        file - b'a',
    ))
}

/// Name `mv` using the card it plays from the mover's hand.
pub fn move_to_text(game_state: &GameState, mv: &CandidateMove) -> EngineResult<String> {
    let mover = game_state
        .piece_at(mv.from)
        .and_then(|p| p.owner())
        .ok_or_else(|| EngineError::InvalidMove(format!("no piece on {}", square_to_text(mv.from))))?;
    let card = game_state
        .hand(mover)
        .get(mv.card_index)
        .ok_or_else(|| EngineError::InvalidMove(format!("card index {}", mv.card_index)))?;
    Ok(format!(
        "{}:{}{}",
        card.name,
        square_to_text(mv.from),
        square_to_text(mv.to)
    ))
}

/// Resolve notation against `legal`, the moves available in `game_state`.
pub fn parse_move(
    game_state: &GameState,
    text: &str,
    legal: &[CandidateMove],
) -> EngineResult<CandidateMove> {
    let (card_name, squares) = text
        .split_once(':')
        .ok_or_else(|| EngineError::InvalidMove(format!("expected <Card>:<from><to>, got '{text}'")))?;
    if squares.len() != 4 || !squares.is_ascii() {
        return Err(EngineError::InvalidMove(format!("bad squares in '{text}'")));
    }
    let from = parse_square(&squares[..2])?;
    let to = parse_square(&squares[2..])?;

    legal
        .iter()
        .copied()
        .find(|mv| {
            mv.from == from
                && mv.to == to
                && move_to_text(game_state, mv)
                    .ok()
                    .and_then(|t| t.split_once(':').map(|(c, _)| c.eq_ignore_ascii_case(card_name)))
                    .unwrap_or(false)
        })
        .ok_or_else(|| EngineError::InvalidMove(format!("'{text}' is not legal here")))
}
