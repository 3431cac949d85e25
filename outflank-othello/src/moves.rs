//! Legal-move derivation by ray casting.

use crate::board::{Board, Color, Occupant};
use crate::location::{Direction, Location};
use arrayvec::ArrayVec;
use std::fmt;

/// The origins justifying one destination: at most one per direction.
pub type Origins = ArrayVec<Location, 8>;

/// A legal destination together with every origin whose ray captures toward it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegalMove {
    pub destination: Location,
    pub origins: Origins,
}

/// All legal moves for one player, sorted by destination (row-major).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LegalMoves {
    moves: Vec<LegalMove>,
}

impl LegalMoves {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Look up the move landing on `destination`.
    pub fn get(&self, destination: Location) -> Option<&LegalMove> {
        self.moves
            .binary_search_by_key(&destination, |mv| mv.destination)
            .ok()
            .map(|index| &self.moves[index])
    }

    #[inline]
    pub fn contains(&self, destination: Location) -> bool {
        self.get(destination).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LegalMove> {
        self.moves.iter()
    }

    /// The legal destinations, lowest row and column first.
    pub fn destinations(&self) -> impl Iterator<Item = Location> + '_ {
        self.moves.iter().map(|mv| mv.destination)
    }
}

impl<'a> IntoIterator for &'a LegalMoves {
    type Item = &'a LegalMove;
    type IntoIter = std::slice::Iter<'a, LegalMove>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}

impl fmt::Display for LegalMoves {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = self
            .moves
            .iter()
            .map(|mv| {
                let origins: Vec<String> = mv.origins.iter().map(|o| o.to_string()).collect();
                format!("{} <- [{}]", mv.destination, origins.join(", "))
            })
            .collect::<Vec<String>>()
            .join(", ");

        f.write_fmt(format_args!("{{{}}}", string))
    }
}

/// Walk from `destination` along `dir`. If a run of at least one `opponent`
/// cell ends on a cell owned by `actor`, return that cell.
#[inline]
pub(crate) fn origin_along(
    board: &Board,
    actor: Color,
    destination: Location,
    dir: Direction,
) -> Option<Location> {
    let mut run = 0;
    for loc in destination.ray(dir) {
        match board.occupant(loc) {
            Occupant::Owned(color) if color == actor => {
                return if run > 0 { Some(loc) } else { None };
            }
            Occupant::Owned(_) => run += 1,
            Occupant::Empty => return None,
        }
    }
    None
}

/// Find every legal destination for `actor` on `board`, each with the set of
/// origins that justify it. An empty result means `actor` must pass.
pub fn find_legal_moves(board: &Board, actor: Color) -> LegalMoves {
    let moves = board
        .cells()
        .filter(|cell| cell.occupant().is_empty())
        .filter_map(|cell| {
            let destination = cell.location();
            let origins: Origins = Direction::ALL
                .iter()
                .filter_map(|&dir| origin_along(board, actor, destination, dir))
                .collect();

            if origins.is_empty() {
                None
            } else {
                Some(LegalMove {
                    destination,
                    origins,
                })
            }
        })
        .collect();

    LegalMoves { moves }
}

/// Returns true if `actor` has at least one legal move. Cheaper than building
/// the full [`LegalMoves`] when only existence matters.
pub fn has_legal_move(board: &Board, actor: Color) -> bool {
    board
        .cells()
        .filter(|cell| cell.occupant().is_empty())
        .any(|cell| {
            Direction::ALL
                .iter()
                .any(|&dir| origin_along(board, actor, cell.location(), dir).is_some())
        })
}
