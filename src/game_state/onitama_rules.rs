//! Canonical Onitama rule constants.
//!
//! Home rows, temple arches (goal squares), and the fixed opening deal used
//! when a caller does not shuffle its own.

use crate::game_state::onitama_types::{Player, Square};

/// Column of both temple arches and of each master's starting square.
pub const TEMPLE_COLUMN: u8 = 2;

/// Row a player's pieces start on.
#[inline]
pub const fn home_row(player: Player) -> u8 {
    match player {
        Player::Red => 4,
        Player::Blue => 0,
    }
}

/// Square `player`'s master must reach to win by the way of the stream.
#[inline]
pub const fn goal_square(player: Player) -> Square {
    Square::new(home_row(player.opponent()), TEMPLE_COLUMN)
}

/// Card names dealt by `GameState::new_game`: Red's hand, Blue's hand, shared.
pub const DEFAULT_DEAL: [&str; 5] = ["Tiger", "Crab", "Monkey", "Crane", "Dragon"];
