//! Implements game-level Othello logic: whose turn it is, passing, and the end
//! of the game.
//!
//! [`Game`] is a small `Copy` value, so search code can branch on it freely
//! without ever touching a live board.

use crate::board::{Board, Color};
use crate::capture::{apply_move, CaptureError};
use crate::location::{Location, ParseLocationError};
use crate::moves::{find_legal_moves, has_legal_move, LegalMoves};
use derive_more::{Display, Error};
use std::fmt;

/// An action in an Othello game: pass or place a piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    Piece(Location),
    Pass,
}

impl From<Location> for Move {
    fn from(loc: Location) -> Self {
        Self::Piece(loc)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Piece(loc) => write!(f, "{}", loc),
            Move::Pass => f.write_str("pass"),
        }
    }
}

/// Build a [`Move`] from "pass" or a location ("D3").
impl std::str::FromStr for Move {
    type Err = ParseLocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("pass") {
            Ok(Move::Pass)
        } else {
            s.parse().map(Move::Piece)
        }
    }
}

/// The final result of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum Outcome {
    #[display(fmt = "{} wins", _0)]
    Winner(Color),
    #[display(fmt = "draw")]
    Draw,
}

impl Outcome {
    /// Decide the outcome from final piece counts: strictly more pieces wins.
    pub fn from_board(board: &Board) -> Self {
        let black = board.count(Color::Black);
        let white = board.count(Color::White);
        if black > white {
            Outcome::Winner(Color::Black)
        } else if white > black {
            Outcome::Winner(Color::White)
        } else {
            Outcome::Draw
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, Error)]
pub enum IllegalMove {
    #[display(fmt = "the game is already over")]
    GameOver,
    #[display(fmt = "cannot pass while a placement is available")]
    PassWithMoves,
    #[display(fmt = "{} is not a legal destination", destination)]
    NotLegal { destination: Location },
    #[display(fmt = "capture failed: {}", source)]
    Capture { source: CaptureError },
}

/// The complete state of an Othello game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Game {
    pub board: Board,
    pub active: Color,
    pub just_passed: bool,
}

impl Default for Game {
    /// The starting position with black to move.
    fn default() -> Self {
        Self::new(Board::new(), Color::default())
    }
}

impl Game {
    pub fn new(board: Board, active: Color) -> Self {
        Self {
            board,
            active,
            just_passed: false,
        }
    }

    /// Get the legal moves for the active player.
    #[inline]
    pub fn legal_moves(&self) -> LegalMoves {
        find_legal_moves(&self.board, self.active)
    }

    /// The game ends when the board is full or neither side can place a piece.
    pub fn is_finished(&self) -> bool {
        self.board.is_full()
            || (!has_legal_move(&self.board, self.active)
                && !has_legal_move(&self.board, !self.active))
    }

    /// The outcome, or None while the game is still running.
    pub fn outcome(&self) -> Option<Outcome> {
        if self.is_finished() {
            Some(Outcome::from_board(&self.board))
        } else {
            None
        }
    }

    /// The winner of a finished game; None for a draw or an unfinished game.
    pub fn winner(&self) -> Option<Color> {
        match self.outcome() {
            Some(Outcome::Winner(color)) => Some(color),
            _ => None,
        }
    }

    /// Hand the turn to the opponent without touching the board.
    #[inline]
    pub fn pass(self) -> Self {
        Self {
            board: self.board,
            active: !self.active,
            just_passed: true,
        }
    }

    /// Play a legal move, already looked up in `legal`, and hand over the turn.
    /// `legal` must be the legal moves of this position.
    pub fn play(self, legal: &LegalMoves, destination: Location) -> Result<Self, IllegalMove> {
        let mv = legal
            .get(destination)
            .ok_or(IllegalMove::NotLegal { destination })?;
        let mut board = self.board;
        apply_move(&mut board, self.active, destination, &mv.origins)
            .map_err(|source| IllegalMove::Capture { source })?;

        Ok(Self {
            board,
            active: !self.active,
            just_passed: false,
        })
    }

    /// Apply an action for the active player, checking that it is legal.
    pub fn apply_move(self, mv: Move) -> Result<Self, IllegalMove> {
        if self.is_finished() {
            return Err(IllegalMove::GameOver);
        }

        match mv {
            Move::Pass => {
                if has_legal_move(&self.board, self.active) {
                    Err(IllegalMove::PassWithMoves)
                } else {
                    Ok(self.pass())
                }
            }
            Move::Piece(destination) => self.play(&self.legal_moves(), destination),
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board)?;
        writeln!(
            f,
            "Black: {}  White: {}  To move: {}",
            self.board.count(Color::Black),
            self.board.count(Color::White),
            self.active
        )?;
        if self.just_passed {
            f.write_str("(Last move was a pass)\n")?;
        }
        Ok(())
    }
}
