//! Movement cards and the standard 16-card deck.
//!
//! Card patterns are stored once as static tables in Red's orientation
//! (forward means toward row 0). A card held by the other side is the same
//! table flagged as rotated, which negates every offset on read. Cloning a
//! card therefore never allocates.

use crate::game_state::onitama_types::{Player, Square};

/// Board delta in rows/columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Offset {
    pub d_row: i8,
    pub d_col: i8,
}

impl Offset {
    /// Build from card notation: `dx` to the right, `forward` toward the opponent.
    pub const fn card(dx: i8, forward: i8) -> Self {
        Self {
            d_row: -forward,
            d_col: dx,
        }
    }

    #[inline]
    pub const fn negated(self) -> Self {
        Self {
            d_row: -self.d_row,
            d_col: -self.d_col,
        }
    }

    #[inline]
    pub fn apply(self, square: Square) -> Option<Square> {
        square.offset(self.d_row, self.d_col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveCard {
    pub name: &'static str,
    /// Colour stamp printed on the card; decides who opens the game.
    pub stamp: Player,
    pattern: &'static [Offset],
    /// Alternate pattern for variant pieces (wind spirit) or dual-role cards.
    secondary: Option<&'static [Offset]>,
    rotated: bool,
}

impl MoveCard {
    pub const fn new(name: &'static str, stamp: Player, pattern: &'static [Offset]) -> Self {
        Self {
            name,
            stamp,
            pattern,
            secondary: None,
            rotated: false,
        }
    }

    pub const fn with_secondary(mut self, secondary: &'static [Offset]) -> Self {
        self.secondary = Some(secondary);
        self
    }

    #[inline]
    pub fn is_rotated(&self) -> bool {
        self.rotated
    }

    /// The same card turned 180 degrees.
    #[inline]
    pub fn rotated(mut self) -> Self {
        self.rotated = !self.rotated;
        self
    }

    /// Orient the card for `holder`: unrotated for Red, rotated for Blue.
    #[inline]
    pub fn oriented_for(mut self, holder: Player) -> Self {
        self.rotated = holder == Player::Blue;
        self
    }

    /// Offsets as currently oriented on the board.
    pub fn offsets(&self) -> impl Iterator<Item = Offset> + '_ {
        let rotated = self.rotated;
        self.pattern
            .iter()
            .map(move |o| if rotated { o.negated() } else { *o })
    }

    pub fn secondary_offsets(&self) -> Option<impl Iterator<Item = Offset> + '_> {
        let rotated = self.rotated;
        self.secondary.map(|pattern| {
            pattern
                .iter()
                .map(move |o| if rotated { o.negated() } else { *o })
        })
    }

    /// Same physical card, ignoring orientation.
    #[inline]
    pub fn same_card(&self, other: &MoveCard) -> bool {
        self.name == other.name
    }
}

const TIGER: &[Offset] = &[Offset::card(0, 2), Offset::card(0, -1)];
const DRAGON: &[Offset] = &[
    Offset::card(-2, 1),
    Offset::card(2, 1),
    Offset::card(-1, -1),
    Offset::card(1, -1),
];
const FROG: &[Offset] = &[Offset::card(-2, 0), Offset::card(-1, 1), Offset::card(1, -1)];
const RABBIT: &[Offset] = &[Offset::card(-1, -1), Offset::card(1, 1), Offset::card(2, 0)];
const CRAB: &[Offset] = &[Offset::card(0, 1), Offset::card(-2, 0), Offset::card(2, 0)];
const ELEPHANT: &[Offset] = &[
    Offset::card(-1, 1),
    Offset::card(1, 1),
    Offset::card(-1, 0),
    Offset::card(1, 0),
];
const GOOSE: &[Offset] = &[
    Offset::card(-1, 1),
    Offset::card(-1, 0),
    Offset::card(1, 0),
    Offset::card(1, -1),
];
const ROOSTER: &[Offset] = &[
    Offset::card(1, 1),
    Offset::card(-1, 0),
    Offset::card(1, 0),
    Offset::card(-1, -1),
];
const MONKEY: &[Offset] = &[
    Offset::card(-1, 1),
    Offset::card(1, 1),
    Offset::card(-1, -1),
    Offset::card(1, -1),
];
const MANTIS: &[Offset] = &[Offset::card(-1, 1), Offset::card(1, 1), Offset::card(0, -1)];
const HORSE: &[Offset] = &[Offset::card(0, 1), Offset::card(-1, 0), Offset::card(0, -1)];
const OX: &[Offset] = &[Offset::card(0, 1), Offset::card(1, 0), Offset::card(0, -1)];
const CRANE: &[Offset] = &[Offset::card(0, 1), Offset::card(-1, -1), Offset::card(1, -1)];
const BOAR: &[Offset] = &[Offset::card(0, 1), Offset::card(-1, 0), Offset::card(1, 0)];
const EEL: &[Offset] = &[Offset::card(-1, 1), Offset::card(-1, -1), Offset::card(1, 0)];
const COBRA: &[Offset] = &[Offset::card(-1, 0), Offset::card(1, 1), Offset::card(1, -1)];

/// The base-game deck.
pub const STANDARD_DECK: [MoveCard; 16] = [
    MoveCard::new("Tiger", Player::Blue, TIGER),
    MoveCard::new("Dragon", Player::Red, DRAGON),
    MoveCard::new("Frog", Player::Red, FROG),
    MoveCard::new("Rabbit", Player::Blue, RABBIT),
    MoveCard::new("Crab", Player::Blue, CRAB),
    MoveCard::new("Elephant", Player::Red, ELEPHANT),
    MoveCard::new("Goose", Player::Blue, GOOSE),
    MoveCard::new("Rooster", Player::Red, ROOSTER),
    MoveCard::new("Monkey", Player::Blue, MONKEY),
    MoveCard::new("Mantis", Player::Red, MANTIS),
    MoveCard::new("Horse", Player::Red, HORSE),
    MoveCard::new("Ox", Player::Blue, OX),
    MoveCard::new("Crane", Player::Blue, CRANE),
    MoveCard::new("Boar", Player::Red, BOAR),
    MoveCard::new("Eel", Player::Blue, EEL),
    MoveCard::new("Cobra", Player::Red, COBRA),
];

/// Look up a standard card by name (case-insensitive), unrotated.
pub fn card_by_name(name: &str) -> Option<MoveCard> {
    STANDARD_DECK
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name))
        .copied()
}
