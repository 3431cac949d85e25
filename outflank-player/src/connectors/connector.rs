use crate::engine::{MoveRejected, TurnRecord};
use async_trait::async_trait;
use outflank_othello::{Board, Color, LegalMoves, Location};

/// What the outside world answered when asked for a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reply {
    Move(Location),
    Quit,
}

/// A player-facing abstract interface to a way of playing Othello with "the outside world."
#[async_trait]
pub trait Connector {
    /// Alert the [`Connector`] that we're finished with setup.
    /// This must be called before the game can progress.
    fn set_ready(&mut self);

    /// Find out what color the outside world is playing.
    fn color(&self) -> Color;

    /// Report a move applied by either side, with the board after it.
    fn observe(&mut self, record: &TurnRecord, board: &Board);

    /// Report that the last move received was refused.
    fn reject(&mut self, reason: &MoveRejected);

    /// Ask for the next move. Only called while `legal` is non-empty, since
    /// passes are made automatically.
    async fn request_move(&mut self, board: &Board, legal: &LegalMoves) -> Reply;
}
