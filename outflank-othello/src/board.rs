//! The 8x8 grid of [`Cell`]s that owns all positional truth.
//!
//! Cells live in a flat array indexed by [`Location::index`], so a [`Board`] is
//! a plain `Copy` value and search code can take private copies cheaply.

use crate::location::Location;
use crate::moves::{find_legal_moves, LegalMoves};
use crate::{EDGE_LENGTH, NUM_SPACES};
use derive_more::{Display, Error};
use std::fmt;

/// One of the two sides in a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub enum Color {
    Black,
    White,
}

impl Default for Color {
    /// Gets the starting color (black).
    fn default() -> Self {
        Self::Black
    }
}

impl std::ops::Not for Color {
    type Output = Self;

    /// Gets the other color.
    fn not(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

/// Occupancy of a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Occupant {
    Empty,
    Owned(Color),
}

impl Occupant {
    #[inline]
    pub fn is_empty(self) -> bool {
        self == Occupant::Empty
    }

    #[inline]
    pub fn is_owned_by(self, color: Color) -> bool {
        self == Occupant::Owned(color)
    }

    fn to_char(self) -> char {
        match self {
            Occupant::Empty => '.',
            Occupant::Owned(Color::Black) => '#',
            Occupant::Owned(Color::White) => 'O',
        }
    }
}

/// A single board position. The location is fixed at construction; only the
/// occupant changes, and only through the capture code in this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    location: Location,
    occupant: Occupant,
}

impl Cell {
    #[inline]
    pub fn location(&self) -> Location {
        self.location
    }

    #[inline]
    pub fn occupant(&self) -> Occupant {
        self.occupant
    }
}

/// A complete Othello position.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Cell; NUM_SPACES],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// A board with every cell empty.
    pub fn empty() -> Self {
        let cells = std::array::from_fn(|index| Cell {
            location: Location::from_index_unchecked(index as u8),
            occupant: Occupant::Empty,
        });
        Self { cells }
    }

    /// The standard starting position: white on D4 and E5, black on E4 and D5.
    pub fn new() -> Self {
        let mut board = Self::empty();
        for &(row, col, color) in &[
            (3, 3, Color::White),
            (3, 4, Color::Black),
            (4, 3, Color::Black),
            (4, 4, Color::White),
        ] {
            if let Some(loc) = Location::from_coords(row, col) {
                board.set(loc, Occupant::Owned(color));
            }
        }
        board
    }

    #[inline]
    pub fn cell(&self, loc: Location) -> &Cell {
        &self.cells[loc.index()]
    }

    #[inline]
    pub fn occupant(&self, loc: Location) -> Occupant {
        self.cells[loc.index()].occupant
    }

    /// Iterate over all cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Count the cells owned by `color`.
    pub fn count(&self, color: Color) -> u8 {
        self.cells
            .iter()
            .filter(|cell| cell.occupant.is_owned_by(color))
            .count() as u8
    }

    pub fn count_empty(&self) -> u8 {
        self.cells.iter().filter(|cell| cell.occupant.is_empty()).count() as u8
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| !cell.occupant.is_empty())
    }

    /// Fraction of the board that is occupied, in [0, 1].
    pub fn fill_fraction(&self) -> f64 {
        (NUM_SPACES as u8 - self.count_empty()) as f64 / NUM_SPACES as f64
    }

    /// Score the board as: # `color` pieces - # opponent pieces.
    #[inline]
    pub fn score_absolute_difference(&self, color: Color) -> i8 {
        self.count(color) as i8 - self.count(!color) as i8
    }

    /// The legal moves for `color` in this position.
    #[inline]
    pub fn legal_moves(&self, color: Color) -> LegalMoves {
        find_legal_moves(self, color)
    }

    /// Overwrite the occupant of one cell. Only the capture code and the
    /// text parser use this; everything else goes through [`crate::apply_move`].
    #[inline]
    pub(crate) fn set(&mut self, loc: Location, occupant: Occupant) {
        self.cells[loc.index()].occupant = occupant;
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   A B C D E F G H")?;
        for (index, cell) in self.cells.iter().enumerate() {
            if index % EDGE_LENGTH == 0 {
                write!(f, "\n {} ", index / EDGE_LENGTH + 1)?;
            }
            write!(f, "{} ", cell.occupant.to_char())?;
        }
        writeln!(f)
    }
}

#[derive(Debug, PartialEq, Eq, Display, Error)]
pub enum ParseBoardError {
    #[display(fmt = "unrecognized board character {:?}", symbol)]
    BadCharacter { symbol: char },
    #[display(fmt = "expected 64 cells, found {}", found)]
    WrongLength { found: usize },
}

/// Parse a board from 64 cell characters in row-major order.
/// `X`, `B` or `#` is black, `O` or `W` is white, `-` or `.` is empty;
/// whitespace is ignored, so the output of `Display` minus its labels parses back.
impl std::str::FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut board = Self::empty();
        let mut found = 0;

        for symbol in s.chars().filter(|c| !c.is_whitespace()) {
            let occupant = match symbol.to_ascii_uppercase() {
                'X' | 'B' | '#' => Occupant::Owned(Color::Black),
                'O' | 'W' => Occupant::Owned(Color::White),
                '-' | '.' => Occupant::Empty,
                _ => return Err(ParseBoardError::BadCharacter { symbol }),
            };
            if found < NUM_SPACES {
                board.set(Location::from_index_unchecked(found as u8), occupant);
            }
            found += 1;
        }

        if found != NUM_SPACES {
            return Err(ParseBoardError::WrongLength { found });
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(row: usize, col: usize) -> Location {
        Location::from_coords(row, col).unwrap()
    }

    #[test]
    fn starting_position() {
        let board = Board::new();
        assert_eq!(board.count(Color::Black), 2);
        assert_eq!(board.count(Color::White), 2);
        assert_eq!(board.count_empty(), 60);
        assert_eq!(board.occupant(loc(3, 3)), Occupant::Owned(Color::White));
        assert_eq!(board.occupant(loc(3, 4)), Occupant::Owned(Color::Black));
        assert_eq!(board.occupant(loc(4, 3)), Occupant::Owned(Color::Black));
        assert_eq!(board.occupant(loc(4, 4)), Occupant::Owned(Color::White));
    }

    #[test]
    fn cells_keep_their_coordinates() {
        let board = Board::new();
        for (index, cell) in board.cells().enumerate() {
            assert_eq!(cell.location().index(), index);
        }
    }

    #[test]
    fn parse_board() {
        let board: Board = "
            --------
            --------
            --------
            ---OX---
            ---XO---
            --------
            --------
            --------"
            .parse()
            .unwrap();
        assert_eq!(board, Board::new());
    }

    #[test]
    fn parse_board_errors() {
        assert_eq!(
            "XO".parse::<Board>(),
            Err(ParseBoardError::WrongLength { found: 2 })
        );
        assert_eq!(
            "?".repeat(64).parse::<Board>(),
            Err(ParseBoardError::BadCharacter { symbol: '?' })
        );
    }

    #[test]
    fn display_board() {
        let text = Board::new().to_string();
        assert!(text.starts_with("   A B C D E F G H"));
        assert!(text.contains(" 4 . . . O # . . . "));
        assert!(text.contains(" 5 . . . # O . . . "));
    }

    #[test]
    fn full_board() {
        let board: Board = "X".repeat(64).parse().unwrap();
        assert!(board.is_full());
        assert_eq!(board.fill_fraction(), 1.0);
        assert_eq!(board.score_absolute_difference(Color::Black), 64);
    }
}
