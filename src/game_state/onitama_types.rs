//! Core value types shared by the board model, move generation, and search.
//!
//! Everything here is small and `Copy` so whole positions can be cloned
//! field-by-field without touching the heap.

pub use crate::game_state::game_state::GameState;

/// Board edge length. The board is always 5x5.
pub const BOARD_SIZE: usize = 5;

/// Number of movement cards each player holds.
pub const HAND_SIZE: usize = 2;

/// Side of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Player {
    Red,
    Blue,
}

impl Player {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Player::Red => 0,
            Player::Blue => 1,
        }
    }

    #[inline]
    pub const fn opponent(self) -> Self {
        match self {
            Player::Red => Player::Blue,
            Player::Blue => Player::Red,
        }
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Player::Red => "red",
            Player::Blue => "blue",
        }
    }
}

/// Who a piece belongs to. Neutral pieces exist only in variant games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Affiliation {
    Player(Player),
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceRole {
    Master,
    Student,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub affiliation: Affiliation,
    pub role: PieceRole,
}

impl Piece {
    #[inline]
    pub const fn master(player: Player) -> Self {
        Self {
            affiliation: Affiliation::Player(player),
            role: PieceRole::Master,
        }
    }

    #[inline]
    pub const fn student(player: Player) -> Self {
        Self {
            affiliation: Affiliation::Player(player),
            role: PieceRole::Student,
        }
    }

    #[inline]
    pub fn owner(self) -> Option<Player> {
        match self.affiliation {
            Affiliation::Player(p) => Some(p),
            Affiliation::Neutral => None,
        }
    }

    #[inline]
    pub fn is_owned_by(self, player: Player) -> bool {
        self.owner() == Some(player)
    }

    #[inline]
    pub fn is_master(self) -> bool {
        self.role == PieceRole::Master
    }
}

/// Board coordinate. Row 0 is Blue's home row, row 4 is Red's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    pub row: u8,
    pub col: u8,
}

impl Square {
    #[inline]
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Offset this square by a board delta, returning `None` off the board.
    #[inline]
    pub fn offset(self, d_row: i8, d_col: i8) -> Option<Self> {
        let row = i16::from(self.row) + i16::from(d_row);
        let col = i16::from(self.col) + i16::from(d_col);
        let limit = BOARD_SIZE as i16;
        if (0..limit).contains(&row) && (0..limit).contains(&col) {
            Some(Self::new(row as u8, col as u8))
        } else {
            None
        }
    }

    /// Chebyshev distance, i.e. king-move steps between two squares.
    #[inline]
    pub fn chebyshev(self, other: Self) -> u8 {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }

    /// Manhattan distance to the board centre.
    #[inline]
    pub fn center_distance(self) -> u8 {
        self.row.abs_diff(2) + self.col.abs_diff(2)
    }

    /// True for the nine squares of the inner 3x3 block.
    #[inline]
    pub fn is_center_block(self) -> bool {
        (1..=3).contains(&self.row) && (1..=3).contains(&self.col)
    }

    /// Iterate every board square in row-major order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_SIZE as u8)
            .flat_map(|row| (0..BOARD_SIZE as u8).map(move |col| Square::new(row, col)))
    }
}

/// Finished-vs-running marker. Tracks `GameState::winner` exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GamePhase {
    #[default]
    Playing,
    Finished,
}

/// A move proposed by the oracle. Transient: produced, searched, discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CandidateMove {
    pub from: Square,
    pub to: Square,
    /// Index into the mover's hand (`0..HAND_SIZE`).
    pub card_index: usize,
    pub captures: bool,
}
