//! `outflank-player` chooses and plays Othello moves.
//!
//!  - [`Strategy`] is the single entry point every computer player implements:
//!    [`Greedy`] (one-ply heuristic), [`Minimax`], [`Expectimax`] and [`Mcts`].
//!  - [`GameEngine`] runs a game between two [`Player`]s, human or computer, as
//!    an explicit turn state machine.
//!  - [`connectors`] let a human seat be driven from the outside world.

pub mod connectors;

mod budget;
mod engine;
mod expectimax;
mod heuristic;
mod mcts;
mod minimax;
mod strategy;

pub use budget::{Budget, CancelFlag};
pub use engine::*;
pub use expectimax::{Expectimax, ExpectimaxConfig};
pub use heuristic::{evaluate, Greedy, Weights};
pub use mcts::{Mcts, MctsConfig, SearchTree};
pub use minimax::{Minimax, MinimaxConfig, MAX_DEPTH};
pub use strategy::*;
