//! Runs one game between two players as an explicit turn state machine.
//!
//! The engine owns the only live [`Board`]. Humans submit moves through
//! [`GameEngine::submit_move`]; computer seats are asked for theirs through
//! [`GameEngine::computer_turn`]. Passing is never a move: when the side to
//! move is stuck, the engine hands the turn back and notes the pass in the
//! [`TurnRecord`] of the move that caused it.

use crate::budget::Budget;
use crate::strategy::Strategy;
use derive_more::{Display, Error};
use outflank_othello::{apply_move, find_legal_moves, Board, Color, LegalMoves, Location, Outcome};
use std::fmt;
use tracing::{debug, error, info};

/// Who decides a seat's moves.
pub enum Controller {
    Human,
    Computer(Box<dyn Strategy>),
}

/// A seat at the table.
pub struct Player {
    name: String,
    color: Color,
    controller: Controller,
}

impl Player {
    pub fn human(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            color,
            controller: Controller::Human,
        }
    }

    pub fn computer(name: impl Into<String>, color: Color, strategy: Box<dyn Strategy>) -> Self {
        Self {
            name: name.into(),
            color,
            controller: Controller::Computer(strategy),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn is_human(&self) -> bool {
        matches!(self.controller, Controller::Human)
    }

    pub fn strategy(&self) -> Option<&dyn Strategy> {
        match &self.controller {
            Controller::Human => None,
            Controller::Computer(strategy) => Some(strategy.as_ref()),
        }
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let controller = match &self.controller {
            Controller::Human => "human",
            Controller::Computer(strategy) => strategy.name(),
        };
        f.debug_struct("Player")
            .field("name", &self.name)
            .field("color", &self.color)
            .field("controller", &controller)
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum TurnState {
    #[display(fmt = "waiting for {}", _0)]
    AwaitingMove(Color),
    #[display(fmt = "{} is thinking", _0)]
    ComputingMove(Color),
    #[display(fmt = "finished, {}", _0)]
    Finished(Outcome),
    /// A strategy broke its contract; the game cannot continue.
    #[display(fmt = "aborted by {}'s strategy", _0)]
    Aborted(Color),
}

/// One applied move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnRecord {
    pub color: Color,
    pub destination: Location,
    pub flipped: u8,
    /// The opponent had no reply and passed back to `color`.
    pub passed: Option<Color>,
}

impl fmt::Display for TurnRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} played {} ({} flipped)",
            self.color, self.destination, self.flipped
        )?;
        if let Some(passer) = self.passed {
            write!(f, ", {} passes", passer)?;
        }
        Ok(())
    }
}

/// A submitted move was refused. The engine state is unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, Error)]
pub enum MoveRejected {
    #[display(fmt = "the game is over")]
    GameOver,
    #[display(fmt = "the game was aborted")]
    Aborted,
    #[display(fmt = "it is {}'s turn, not {}'s", expected, actual)]
    NotYourTurn { expected: Color, actual: Color },
    #[display(fmt = "{} is not played by a human", color)]
    NotHuman { color: Color },
    #[display(fmt = "{} is not played by a computer", color)]
    NotComputer { color: Color },
    #[display(fmt = "{} is not a legal move for {}", destination, color)]
    IllegalDestination { color: Color, destination: Location },
}

#[derive(Clone, Debug, PartialEq, Eq, Display, Error)]
pub enum ComputerTurnError {
    #[display(fmt = "{}", source)]
    Rejected { source: MoveRejected },
    #[display(
        fmt = "strategy {} returned {:?} for {}, which is not a legal move",
        strategy,
        chosen,
        color
    )]
    StrategyViolation {
        strategy: String,
        color: Color,
        chosen: Option<Location>,
    },
}

impl From<MoveRejected> for ComputerTurnError {
    fn from(source: MoveRejected) -> Self {
        ComputerTurnError::Rejected { source }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, Error)]
pub enum EngineError {
    #[display(fmt = "both players are {}", color)]
    SameColor { color: Color },
}

pub struct GameEngine {
    board: Board,
    black: Player,
    white: Player,
    state: TurnState,
    history: Vec<TurnRecord>,
}

impl GameEngine {
    /// Start a game from the standard opening with black to move.
    pub fn new(first: Player, second: Player) -> Result<Self, EngineError> {
        Self::with_position(first, second, Board::new(), Color::Black)
    }

    /// Start a game from an arbitrary position. If `to_move` is stuck the
    /// opponent moves first, and a position where neither side can move
    /// starts out finished.
    pub fn with_position(
        first: Player,
        second: Player,
        board: Board,
        to_move: Color,
    ) -> Result<Self, EngineError> {
        if first.color == second.color {
            return Err(EngineError::SameColor { color: first.color });
        }
        let (black, white) = if first.color == Color::Black {
            (first, second)
        } else {
            (second, first)
        };

        let mut engine = Self {
            board,
            black,
            white,
            state: TurnState::AwaitingMove(to_move),
            history: Vec::new(),
        };
        engine.state = engine.next_state(!to_move).0;
        debug!(black = ?engine.black, white = ?engine.white, state = %engine.state, "game started");
        Ok(engine)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// The side to move, while the game is running.
    pub fn active(&self) -> Option<Color> {
        match self.state {
            TurnState::AwaitingMove(color) | TurnState::ComputingMove(color) => Some(color),
            TurnState::Finished(_) | TurnState::Aborted(_) => None,
        }
    }

    pub fn player(&self, color: Color) -> &Player {
        match color {
            Color::Black => &self.black,
            Color::White => &self.white,
        }
    }

    pub fn legal_moves(&self, color: Color) -> LegalMoves {
        find_legal_moves(&self.board, color)
    }

    pub fn score(&self, color: Color) -> u8 {
        self.board.count(color)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, TurnState::Finished(_))
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.state, TurnState::Aborted(_))
    }

    /// The result of a finished game; None while it runs or after an abort.
    pub fn winner(&self) -> Option<Outcome> {
        match self.state {
            TurnState::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Every move applied so far, oldest first.
    pub fn history(&self) -> &[TurnRecord] {
        &self.history
    }

    /// Play a human's move.
    pub fn submit_move(
        &mut self,
        color: Color,
        destination: Location,
    ) -> Result<TurnRecord, MoveRejected> {
        self.check_turn(color)?;
        if !self.player(color).is_human() {
            return Err(MoveRejected::NotHuman { color });
        }
        self.apply(color, destination)
    }

    /// Ask `color`'s strategy for a move and play it.
    ///
    /// A strategy that returns nothing, or a destination that is not legal,
    /// aborts the game.
    pub fn computer_turn(
        &mut self,
        color: Color,
        budget: &Budget,
    ) -> Result<TurnRecord, ComputerTurnError> {
        self.check_turn(color)?;
        if self.player(color).is_human() {
            return Err(MoveRejected::NotComputer { color }.into());
        }

        self.state = TurnState::ComputingMove(color);
        let seat = match color {
            Color::Black => &self.black,
            Color::White => &self.white,
        };
        let (name, chosen) = match &seat.controller {
            Controller::Computer(strategy) => (
                strategy.name(),
                strategy.choose_move(&self.board, color, budget),
            ),
            Controller::Human => ("human", None),
        };

        match chosen {
            Some(destination) if self.legal_moves(color).contains(destination) => {
                Ok(self.apply(color, destination)?)
            }
            _ => {
                self.state = TurnState::Aborted(color);
                error!(strategy = name, %color, ?chosen, "strategy returned an illegal move, aborting the game");
                Err(ComputerTurnError::StrategyViolation {
                    strategy: name.to_string(),
                    color,
                    chosen,
                })
            }
        }
    }

    /// Let computer seats move until the game ends or a human is to move.
    /// Every turn gets the same `budget`, so a deadline is shared by all of them.
    pub fn play_out(&mut self, budget: &Budget) -> Result<TurnState, ComputerTurnError> {
        while let TurnState::AwaitingMove(color) = self.state {
            if self.player(color).is_human() {
                break;
            }
            self.computer_turn(color, budget)?;
        }
        Ok(self.state)
    }

    fn check_turn(&self, color: Color) -> Result<(), MoveRejected> {
        match self.state {
            TurnState::Finished(_) => Err(MoveRejected::GameOver),
            TurnState::Aborted(_) => Err(MoveRejected::Aborted),
            TurnState::AwaitingMove(expected) | TurnState::ComputingMove(expected)
                if expected != color =>
            {
                Err(MoveRejected::NotYourTurn {
                    expected,
                    actual: color,
                })
            }
            _ => Ok(()),
        }
    }

    /// The state after `mover` has moved, and who passed on the way there.
    fn next_state(&self, mover: Color) -> (TurnState, Option<Color>) {
        let finished = TurnState::Finished(Outcome::from_board(&self.board));
        if self.board.is_full() {
            (finished, None)
        } else if !self.legal_moves(!mover).is_empty() {
            (TurnState::AwaitingMove(!mover), None)
        } else if !self.legal_moves(mover).is_empty() {
            (TurnState::AwaitingMove(mover), Some(!mover))
        } else {
            (finished, None)
        }
    }

    fn apply(&mut self, color: Color, destination: Location) -> Result<TurnRecord, MoveRejected> {
        let legal = self.legal_moves(color);
        let rejected = MoveRejected::IllegalDestination { color, destination };
        let mv = legal.get(destination).ok_or(rejected)?;
        let flipped =
            apply_move(&mut self.board, color, destination, &mv.origins).map_err(|_| rejected)?;

        let (state, passed) = self.next_state(color);
        self.state = state;
        let record = TurnRecord {
            color,
            destination,
            flipped,
            passed,
        };
        self.history.push(record);

        debug!(%color, %destination, flipped, "applied move");
        if let Some(passer) = passed {
            debug!(%passer, "no legal move, passing");
        }
        if let TurnState::Finished(outcome) = state {
            info!(
                %outcome,
                black = self.board.count(Color::Black),
                white = self.board.count(Color::White),
                "game over"
            );
        }

        Ok(record)
    }
}

impl fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameEngine")
            .field("board", &self.board)
            .field("black", &self.black)
            .field("white", &self.white)
            .field("state", &self.state)
            .field("moves", &self.history.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(row: usize, col: usize) -> Location {
        Location::from_coords(row, col).unwrap()
    }

    fn humans() -> GameEngine {
        GameEngine::new(
            Player::human("ann", Color::Black),
            Player::human("bob", Color::White),
        )
        .unwrap()
    }

    #[test]
    fn seats_must_differ() {
        let result = GameEngine::new(
            Player::human("ann", Color::White),
            Player::human("bob", Color::White),
        );
        assert_eq!(
            result.unwrap_err(),
            EngineError::SameColor {
                color: Color::White
            }
        );
    }

    #[test]
    fn seats_are_sorted_by_color() {
        let engine = GameEngine::new(
            Player::human("bob", Color::White),
            Player::human("ann", Color::Black),
        )
        .unwrap();
        assert_eq!(engine.player(Color::Black).name(), "ann");
        assert_eq!(engine.state(), TurnState::AwaitingMove(Color::Black));
        assert_eq!(engine.active(), Some(Color::Black));
    }

    #[test]
    fn first_move() {
        let mut engine = humans();
        let record = engine.submit_move(Color::Black, loc(2, 3)).unwrap();
        assert_eq!(
            record,
            TurnRecord {
                color: Color::Black,
                destination: loc(2, 3),
                flipped: 1,
                passed: None,
            }
        );
        assert_eq!(engine.state(), TurnState::AwaitingMove(Color::White));
        assert_eq!(engine.score(Color::Black), 4);
        assert_eq!(engine.score(Color::White), 1);
        assert_eq!(engine.history(), &[record]);
    }

    #[test]
    fn rejections_leave_state_alone() {
        let mut engine = humans();
        let before = *engine.board();

        assert_eq!(
            engine.submit_move(Color::White, loc(2, 4)),
            Err(MoveRejected::NotYourTurn {
                expected: Color::Black,
                actual: Color::White
            })
        );
        assert_eq!(
            engine.submit_move(Color::Black, loc(0, 0)),
            Err(MoveRejected::IllegalDestination {
                color: Color::Black,
                destination: loc(0, 0)
            })
        );
        assert_eq!(
            engine.computer_turn(Color::Black, &Budget::unlimited()),
            Err(ComputerTurnError::Rejected {
                source: MoveRejected::NotComputer {
                    color: Color::Black
                }
            })
        );

        assert_eq!(*engine.board(), before);
        assert_eq!(engine.state(), TurnState::AwaitingMove(Color::Black));
        assert!(engine.history().is_empty());
    }
}
