//! Connectors let a seat be played from outside the process.

mod connector;
mod console;

pub use connector::{Connector, Reply};
pub use console::{parse_reply, ConsoleConnector, ParseReplyError};
