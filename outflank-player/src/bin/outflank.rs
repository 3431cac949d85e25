//! Play Othello in the terminal, against the computer or between two strategies.

use anyhow::{anyhow, bail, Result};
use async_std::task;
use clap::Parser;
use outflank_othello::Color;
use outflank_player::connectors::{ConsoleConnector, Connector, Reply};
use outflank_player::{
    Budget, GameEngine, MctsConfig, ParseStrategyError, Player, StrategyConfig, StrategyKind,
    TurnState,
};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Who sits in a seat: a person at this terminal or a named strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Seat {
    Human,
    Computer(StrategyKind),
}

impl std::str::FromStr for Seat {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("human") {
            Ok(Seat::Human)
        } else {
            s.parse().map(Seat::Computer)
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "outflank", version, about)]
struct Args {
    /// Black's seat: "human", "greedy", "minimax", "expectimax" or "mcts".
    #[arg(long, default_value = "human")]
    black: Seat,

    /// White's seat: "human", "greedy", "minimax", "expectimax" or "mcts".
    #[arg(long, default_value = "minimax")]
    white: Seat,

    /// Search depth for minimax and expectimax.
    #[arg(long)]
    depth: Option<u8>,

    /// Search minimax root moves on separate threads.
    #[arg(long)]
    parallel: bool,

    /// Simulations per MCTS tree.
    #[arg(long, default_value_t = 1000)]
    iterations: u32,

    /// Independent MCTS trees searched in parallel.
    #[arg(long, default_value_t = 1)]
    workers: usize,

    /// Thinking time per computer move, in milliseconds.
    #[arg(long)]
    time_ms: Option<u64>,

    /// Seed for MCTS playouts.
    #[arg(long)]
    seed: Option<u64>,

    /// Log every move and search iteration.
    #[arg(short, long)]
    verbose: bool,
}

fn seat_player(seat: Seat, color: Color, config: &StrategyConfig) -> Result<Player> {
    Ok(match seat {
        Seat::Human => Player::human(format!("{} (human)", color), color),
        Seat::Computer(kind) => {
            Player::computer(format!("{} ({})", color, kind), color, config.build(kind)?)
        }
    })
}

async fn run(engine: &mut GameEngine, think_time: Option<Duration>) -> Result<()> {
    let mut connectors: Vec<ConsoleConnector> = [Color::Black, Color::White]
        .into_iter()
        .filter(|&color| engine.player(color).is_human())
        .map(ConsoleConnector::new)
        .collect();
    for connector in &mut connectors {
        connector.set_ready();
    }

    println!("{}", engine.board());
    loop {
        let color = match engine.state() {
            TurnState::AwaitingMove(color) => color,
            TurnState::Finished(outcome) => {
                println!(
                    "Game over: {}. Black {}, White {}.",
                    outcome,
                    engine.score(Color::Black),
                    engine.score(Color::White)
                );
                return Ok(());
            }
            state => bail!("game stopped: {}", state),
        };

        let record = if engine.player(color).is_human() {
            let connector = connectors
                .iter_mut()
                .find(|connector| connector.color() == color)
                .ok_or_else(|| anyhow!("no connector for {}", color))?;

            let legal = engine.legal_moves(color);
            match connector.request_move(engine.board(), &legal).await {
                Reply::Quit => {
                    info!(%color, "player quit");
                    return Ok(());
                }
                Reply::Move(destination) => match engine.submit_move(color, destination) {
                    Ok(record) => record,
                    Err(reason) => {
                        warn!(%color, %destination, %reason, "rejected move");
                        connector.reject(&reason);
                        continue;
                    }
                },
            }
        } else {
            let budget = think_time.map_or_else(Budget::unlimited, Budget::with_time);
            engine.computer_turn(color, &budget)?
        };

        if connectors.is_empty() {
            println!("{}", record);
        }
        for connector in &mut connectors {
            connector.observe(&record, engine.board());
        }
        println!("{}", engine.board());
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = StrategyConfig {
        depth: args.depth,
        parallel: args.parallel,
        mcts: MctsConfig {
            iterations: args.iterations,
            workers: args.workers,
            seed: args.seed,
            ..MctsConfig::default()
        },
        ..StrategyConfig::default()
    };

    let black = seat_player(args.black, Color::Black, &config)?;
    let white = seat_player(args.white, Color::White, &config)?;
    let mut engine = GameEngine::new(black, white)?;
    info!(black = ?engine.player(Color::Black), white = ?engine.player(Color::White), "starting game");

    let think_time = args.time_ms.map(Duration::from_millis);
    task::block_on(run(&mut engine, think_time))
}
