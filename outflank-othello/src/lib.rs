//! `outflank-othello` implements the rules of Othello for engines and UIs.
//!
//! The crate is layered:
//!
//!  - [`Board`] owns the 64 [`Cell`]s and answers positional queries.
//!  - [`find_legal_moves`] derives the [`LegalMoves`] of a player by casting rays
//!    from every empty cell, and [`apply_move`] performs the captures one of those
//!    moves justifies, atomically.
//!  - [`Game`] is a small copyable value bundling a board with the side to move,
//!    which is what search code walks over.

pub mod test_utils;

mod board;
mod capture;
mod game;
mod location;
mod moves;

pub use board::*;
pub use capture::*;
pub use game::*;
pub use location::*;
pub use moves::*;

/// The number of spaces on one edge of an Othello board.
pub const EDGE_LENGTH: usize = 8;

/// The number of spaces on an Othello board.
pub const NUM_SPACES: usize = 64;
