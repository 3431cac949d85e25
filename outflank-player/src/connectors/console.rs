//! [`Connector`] for a person typing moves into a terminal.

use super::{Connector, Reply};
use crate::engine::{MoveRejected, TurnRecord};
use async_std::io;
use async_trait::async_trait;
use derive_more::{Display, Error};
use itertools::Itertools;
use outflank_othello::{Board, Color, LegalMoves, Location};
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Eq, Display, Error)]
pub enum ParseReplyError {
    #[display(fmt = "enter a move")]
    Empty,
    #[display(fmt = "passes are made automatically when no move is available")]
    Pass,
    #[display(fmt = "could not read {:?}; try \"2 3\", \"d3\" or \"quit\"", input)]
    Unrecognized { input: String },
}

/// Read one line of input: zero-based `row col`, a square such as `d3`, or
/// `quit`.
pub fn parse_reply(line: &str) -> Result<Reply, ParseReplyError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseReplyError::Empty);
    }
    if ["quit", "exit", "q"]
        .iter()
        .any(|word| line.eq_ignore_ascii_case(word))
    {
        return Ok(Reply::Quit);
    }
    if line.eq_ignore_ascii_case("pass") {
        return Err(ParseReplyError::Pass);
    }

    let unrecognized = || ParseReplyError::Unrecognized {
        input: line.to_string(),
    };

    let mut segments = line.split_whitespace();
    match (segments.next(), segments.next(), segments.next()) {
        (Some(row), Some(col), None) => {
            let row: usize = row.parse().map_err(|_| unrecognized())?;
            let col: usize = col.parse().map_err(|_| unrecognized())?;
            Location::from_coords(row, col)
                .map(Reply::Move)
                .ok_or_else(unrecognized)
        }
        (Some(square), None, None) => square
            .parse::<Location>()
            .map(Reply::Move)
            .map_err(|_| unrecognized()),
        _ => Err(unrecognized()),
    }
}

pub struct ConsoleConnector {
    color: Color,
}

impl ConsoleConnector {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

#[async_trait]
impl Connector for ConsoleConnector {
    fn set_ready(&mut self) {
        println!("{} is played from this terminal. Type \"quit\" to stop.", self.color);
    }

    fn color(&self) -> Color {
        self.color
    }

    fn observe(&mut self, record: &TurnRecord, _board: &Board) {
        println!("{}", record);
    }

    fn reject(&mut self, reason: &MoveRejected) {
        println!("Move rejected: {}", reason);
    }

    async fn request_move(&mut self, _board: &Board, legal: &LegalMoves) -> Reply {
        let stdin = io::stdin();
        loop {
            println!(
                "{} to move. Legal moves: {}",
                self.color,
                legal.destinations().join(" ")
            );

            let mut buffer = String::new();
            match stdin.read_line(&mut buffer).await {
                // End of input.
                Ok(0) => return Reply::Quit,
                Ok(_) => {}
                Err(err) => {
                    warn!(%err, "failed to read from stdin");
                    return Reply::Quit;
                }
            }

            match parse_reply(&buffer) {
                Ok(reply) => return reply,
                Err(err) => {
                    warn!(input = buffer.trim(), %err, "unreadable move");
                    println!("{}", err);
                }
            }
        }
    }
}
