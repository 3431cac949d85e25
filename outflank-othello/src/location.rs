//! Code for working with [`Location`]s and [`Direction`]s on the Othello board.

use crate::{EDGE_LENGTH, NUM_SPACES};
use derive_more::{Display, Error};
use std::fmt::{self, Formatter, Write};

/// A location on the Othello board, stored as a row-major index.
///
/// Locations order by row, then by column, which is the tie-breaking order
/// every strategy in this workspace uses.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Location(u8);

/// One of the eight compass directions a ray can travel in.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// All eight directions, clockwise from north.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// The (row, column) step taken when moving one cell in this direction.
    #[inline]
    pub fn delta(self) -> (i8, i8) {
        match self {
            Direction::North => (-1, 0),
            Direction::NorthEast => (-1, 1),
            Direction::East => (0, 1),
            Direction::SouthEast => (1, 1),
            Direction::South => (1, 0),
            Direction::SouthWest => (1, -1),
            Direction::West => (0, -1),
            Direction::NorthWest => (-1, -1),
        }
    }

    /// Find the direction pointing from `from` to `to`, if they share a row,
    /// column or diagonal. Returns None when the locations are equal.
    pub fn between(from: Location, to: Location) -> Option<Direction> {
        let (from_row, from_col) = from.to_coords();
        let (to_row, to_col) = to.to_coords();
        let d_row = to_row as i8 - from_row as i8;
        let d_col = to_col as i8 - from_col as i8;

        if (d_row, d_col) == (0, 0) {
            return None;
        }
        if d_row != 0 && d_col != 0 && d_row.abs() != d_col.abs() {
            return None;
        }

        let step = (d_row.signum(), d_col.signum());
        Self::ALL.iter().copied().find(|dir| dir.delta() == step)
    }
}

impl Location {
    /// Convert from a row-major square index.
    /// Returns None if the index is off the board.
    #[inline]
    pub fn from_index(index: u8) -> Option<Self> {
        if (index as usize) < NUM_SPACES {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Convert from a row-major square index without checking its range.
    #[inline]
    pub(crate) const fn from_index_unchecked(index: u8) -> Self {
        Self(index)
    }

    /// Convert into a row-major square index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Convert from zero-indexed row and column coordinates.
    /// Returns None if the coordinates provided are not valid.
    pub fn from_coords(row: usize, col: usize) -> Option<Self> {
        if row >= EDGE_LENGTH || col >= EDGE_LENGTH {
            None
        } else {
            Some(Self((row * EDGE_LENGTH + col) as u8))
        }
    }

    /// Get the zero-indexed (row, column) coordinates.
    #[inline]
    pub fn to_coords(self) -> (usize, usize) {
        (self.row(), self.col())
    }

    #[inline]
    pub fn row(self) -> usize {
        self.index() / EDGE_LENGTH
    }

    #[inline]
    pub fn col(self) -> usize {
        self.index() % EDGE_LENGTH
    }

    /// Step one cell in `dir`, or None if that walks off the board.
    #[inline]
    pub fn step(self, dir: Direction) -> Option<Self> {
        let (d_row, d_col) = dir.delta();
        let row = self.row() as i8 + d_row;
        let col = self.col() as i8 + d_col;
        if row < 0 || col < 0 {
            return None;
        }
        Self::from_coords(row as usize, col as usize)
    }

    /// Iterate over the cells reached by walking from here in `dir`,
    /// excluding this location itself.
    #[inline]
    pub fn ray(self, dir: Direction) -> Ray {
        Ray { next: self.step(dir), dir }
    }

    /// Iterate over all 64 locations in row-major order.
    pub fn all() -> impl Iterator<Item = Location> {
        (0..NUM_SPACES as u8).map(Location)
    }

    /// Returns true for the four corner squares.
    pub fn is_corner(self) -> bool {
        let last = EDGE_LENGTH - 1;
        (self.row() == 0 || self.row() == last) && (self.col() == 0 || self.col() == last)
    }

    /// Returns true for squares on the outer ring, corners included.
    pub fn is_edge(self) -> bool {
        let last = EDGE_LENGTH - 1;
        self.row() == 0 || self.row() == last || self.col() == 0 || self.col() == last
    }
}

/// Iterator over the locations along one direction, produced by [`Location::ray`].
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    next: Option<Location>,
    dir: Direction,
}

impl Iterator for Ray {
    type Item = Location;

    fn next(&mut self) -> Option<Location> {
        let current = self.next?;
        self.next = current.step(self.dir);
        Some(current)
    }
}

/// Convert this [`Location`] into string notation ("A4").
impl fmt::Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let row_str = "12345678".chars().nth(self.row()).ok_or(fmt::Error)?;
        let col_str = "ABCDEFGH".chars().nth(self.col()).ok_or(fmt::Error)?;
        f.write_char(col_str)?;
        f.write_char(row_str)
    }
}

#[derive(Debug, PartialEq, Eq, Display, Error)]
#[display(fmt = "invalid location string")]
pub struct ParseLocationError;

/// Build a [`Location`] from a 1-indexed string notation ("A4").
impl std::str::FromStr for Location {
    type Err = ParseLocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let col_str = chars.next().ok_or(ParseLocationError)?.to_ascii_uppercase();
        let col = "ABCDEFGH".find(col_str).ok_or(ParseLocationError)?;
        let row = chars
            .next()
            .ok_or(ParseLocationError)?
            .to_digit(10)
            .ok_or(ParseLocationError)? as usize;

        if row == 0 || chars.next().is_some() {
            return Err(ParseLocationError);
        }

        Self::from_coords(row - 1, col).ok_or(ParseLocationError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn location_from_index() {
        assert_eq!(Location::from_index(0), Some(Location(0)));
        assert_eq!(Location::from_index(63), Some(Location(63)));
        assert_eq!(Location::from_index(64), None);
    }

    #[test]
    fn location_from_coords() {
        assert_eq!(Location::from_coords(0, 0), Some(Location(0)));
        assert_eq!(Location::from_coords(7, 7), Some(Location(63)));
        assert_eq!(Location::from_coords(2, 3), Some(Location(19)));
        assert_eq!(Location::from_coords(0, 8), None);
        assert_eq!(Location::from_coords(8, 0), None);
    }

    #[test]
    fn location_to_coords() {
        assert_eq!(Location(0).to_coords(), (0, 0));
        assert_eq!(Location(63).to_coords(), (7, 7));
        assert_eq!(Location(19).to_coords(), (2, 3));
    }

    #[test]
    fn location_order_is_row_major() {
        let a = Location::from_coords(2, 7).unwrap();
        let b = Location::from_coords(3, 0).unwrap();
        let c = Location::from_coords(3, 2).unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn location_from_str_success() {
        assert_eq!(Location::from_str("A1"), Ok(Location(0)));
        assert_eq!(Location::from_str("h8"), Ok(Location(63)));
        assert_eq!(Location::from_str("D3"), Location::from_coords(2, 3).ok_or(ParseLocationError));
    }

    #[test]
    fn location_from_str_fail() {
        assert_eq!(Location::from_str(""), Err(ParseLocationError));
        assert_eq!(Location::from_str("A12"), Err(ParseLocationError));
        assert_eq!(Location::from_str("AA"), Err(ParseLocationError));
        assert_eq!(Location::from_str("A9"), Err(ParseLocationError));
        assert_eq!(Location::from_str("A0"), Err(ParseLocationError));
        assert_eq!(Location::from_str("I5"), Err(ParseLocationError));
    }

    #[test]
    fn location_to_str() {
        assert_eq!(Location(63).to_string(), "H8");
        assert_eq!(Location(0).to_string(), "A1");
        assert_eq!(Location::from_str("E2").unwrap().to_string(), "E2");
    }

    #[test]
    fn ray_stops_at_edge() {
        let corner = Location::from_coords(0, 0).unwrap();
        assert_eq!(corner.ray(Direction::North).count(), 0);
        assert_eq!(corner.ray(Direction::SouthEast).count(), 7);
        let cells: Vec<_> = Location::from_coords(3, 5).unwrap().ray(Direction::East).collect();
        assert_eq!(
            cells,
            vec![
                Location::from_coords(3, 6).unwrap(),
                Location::from_coords(3, 7).unwrap()
            ]
        );
    }

    #[test]
    fn direction_between() {
        let origin = Location::from_coords(4, 4).unwrap();
        let diag = Location::from_coords(1, 7).unwrap();
        assert_eq!(Direction::between(origin, diag), Some(Direction::NorthEast));
        let knight = Location::from_coords(2, 5).unwrap();
        assert_eq!(Direction::between(origin, knight), None);
        assert_eq!(Direction::between(origin, origin), None);
    }

    #[test]
    fn corners_and_edges() {
        assert!(Location::from_coords(7, 0).unwrap().is_corner());
        assert!(Location::from_coords(7, 3).unwrap().is_edge());
        assert!(!Location::from_coords(7, 3).unwrap().is_corner());
        assert!(!Location::from_coords(3, 3).unwrap().is_edge());
    }
}
