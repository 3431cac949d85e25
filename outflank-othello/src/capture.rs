//! Applying captures for a chosen destination.

use crate::board::{Board, Color, Occupant};
use crate::location::{Direction, Location};
use crate::moves::find_legal_moves;
use arrayvec::ArrayVec;
use derive_more::{Display, Error};

/// A destination/origin combination that [`crate::find_legal_moves`] could not
/// have produced. This signals a bug in the caller, not a bad user choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, Error)]
pub enum CaptureError {
    #[display(fmt = "destination {} is already occupied", destination)]
    Occupied { destination: Location },
    #[display(fmt = "no origins supplied for destination {}", destination)]
    NoOrigins { destination: Location },
    #[display(fmt = "origin {} is not in line with destination {}", origin, destination)]
    NotInLine {
        origin: Location,
        destination: Location,
    },
    #[display(fmt = "origin {} is not owned by the acting player", origin)]
    ForeignOrigin { origin: Location },
    #[display(fmt = "cells between {} and {} are not all opponent pieces", origin, destination)]
    BrokenRun {
        origin: Location,
        destination: Location,
    },
}

/// Claim `destination` for `actor`, flipping every opponent cell strictly
/// between it and each of `origins`. Returns the number of flipped cells.
///
/// Every origin is validated before the board is touched, so on error the
/// board is unchanged. If `actor` already owns `destination` nothing happens.
pub fn apply_move(
    board: &mut Board,
    actor: Color,
    destination: Location,
    origins: &[Location],
) -> Result<u8, CaptureError> {
    match board.occupant(destination) {
        Occupant::Owned(owner) if owner == actor => return Ok(0),
        Occupant::Owned(_) => return Err(CaptureError::Occupied { destination }),
        Occupant::Empty => {}
    }

    if origins.is_empty() {
        return Err(CaptureError::NoOrigins { destination });
    }

    // Collect the flips for every origin first; mutate only once all are valid.
    let mut runs: ArrayVec<(Direction, Location), 8> = ArrayVec::new();
    for &origin in origins {
        let dir = Direction::between(destination, origin).ok_or(CaptureError::NotInLine {
            origin,
            destination,
        })?;

        if !board.occupant(origin).is_owned_by(actor) {
            return Err(CaptureError::ForeignOrigin { origin });
        }

        let mut between = destination.ray(dir).take_while(|&loc| loc != origin).peekable();
        if between.peek().is_none()
            || !between.all(|loc| board.occupant(loc).is_owned_by(!actor))
        {
            return Err(CaptureError::BrokenRun {
                origin,
                destination,
            });
        }

        if runs.iter().all(|&(seen, _)| seen != dir) {
            runs.push((dir, origin));
        }
    }

    let mut flipped = 0;
    for (dir, origin) in runs {
        for loc in destination.ray(dir).take_while(|&loc| loc != origin) {
            board.set(loc, Occupant::Owned(actor));
            flipped += 1;
        }
    }
    board.set(destination, Occupant::Owned(actor));

    tracing::trace!(%destination, ?actor, flipped, "applied capture");
    Ok(flipped)
}

impl Board {
    /// Play `destination` for `color` using every origin the move finder
    /// reports for it. Returns None (and leaves the board alone) if the
    /// destination is not a legal move.
    pub fn place(&mut self, destination: Location, color: Color) -> Option<u8> {
        let legal = find_legal_moves(self, color);
        let mv = legal.get(destination)?;
        apply_move(self, color, destination, &mv.origins).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(row: usize, col: usize) -> Location {
        Location::from_coords(row, col).unwrap()
    }

    #[test]
    fn opening_capture() {
        let mut board = Board::new();
        let flipped = apply_move(&mut board, Color::Black, loc(2, 3), &[loc(4, 3)]).unwrap();
        assert_eq!(flipped, 1);
        assert_eq!(board.count(Color::Black), 4);
        assert_eq!(board.count(Color::White), 1);
        assert!(board.occupant(loc(3, 3)).is_owned_by(Color::Black));
        assert!(board.occupant(loc(2, 3)).is_owned_by(Color::Black));
    }

    #[test]
    fn flips_along_every_origin() {
        let mut board: Board = "
            -OX-----
            O-------
            X-------
            --------
            --------
            --------
            --------
            --------"
            .parse()
            .unwrap();
        let flipped = apply_move(&mut board, Color::Black, loc(0, 0), &[loc(0, 2), loc(2, 0)]).unwrap();
        assert_eq!(flipped, 2);
        assert_eq!(board.count(Color::Black), 5);
        assert_eq!(board.count(Color::White), 0);
    }

    #[test]
    fn owned_destination_is_a_no_op() {
        let mut board = Board::new();
        let before = board;
        assert_eq!(apply_move(&mut board, Color::Black, loc(3, 4), &[loc(3, 3)]), Ok(0));
        assert_eq!(board, before);
    }

    #[test]
    fn contract_violations_leave_board_untouched() {
        let mut board = Board::new();
        let before = board;

        assert_eq!(
            apply_move(&mut board, Color::Black, loc(3, 3), &[loc(3, 4)]),
            Err(CaptureError::Occupied { destination: loc(3, 3) })
        );
        assert_eq!(
            apply_move(&mut board, Color::Black, loc(2, 3), &[]),
            Err(CaptureError::NoOrigins { destination: loc(2, 3) })
        );
        assert_eq!(
            apply_move(&mut board, Color::Black, loc(2, 3), &[loc(4, 4)]),
            Err(CaptureError::NotInLine {
                origin: loc(4, 4),
                destination: loc(2, 3)
            })
        );
        assert_eq!(
            apply_move(&mut board, Color::Black, loc(2, 3), &[loc(3, 3)]),
            Err(CaptureError::ForeignOrigin { origin: loc(3, 3) })
        );
        // The first origin is fine, the second is not: nothing may flip.
        assert_eq!(
            apply_move(&mut board, Color::Black, loc(2, 3), &[loc(4, 3), loc(2, 5)]),
            Err(CaptureError::ForeignOrigin { origin: loc(2, 5) })
        );
        assert_eq!(
            apply_move(&mut board, Color::Black, loc(2, 2), &[loc(4, 4)]),
            Err(CaptureError::ForeignOrigin { origin: loc(4, 4) })
        );
        assert_eq!(board, before);
    }

    #[test]
    fn partially_valid_origins_are_rejected_atomically() {
        let mut board: Board = "
            -OX-----
            X-------
            --------
            --------
            --------
            --------
            --------
            --------"
            .parse()
            .unwrap();
        let before = board;
        // East is a real capture, south has no opponent run.
        assert_eq!(
            apply_move(&mut board, Color::Black, loc(0, 0), &[loc(0, 2), loc(1, 0)]),
            Err(CaptureError::BrokenRun {
                origin: loc(1, 0),
                destination: loc(0, 0)
            })
        );
        assert_eq!(board, before);
    }

    #[test]
    fn place_uses_move_finder() {
        let mut board = Board::new();
        assert_eq!(board.place(loc(0, 0), Color::Black), None);
        assert_eq!(board.place(loc(5, 4), Color::Black), Some(1));
        assert_eq!(board.count(Color::Black), 4);
    }
}
