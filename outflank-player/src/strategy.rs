//! The [`Strategy`] interface shared by every computer player, and a small
//! factory for building one by name.

use crate::budget::Budget;
use crate::expectimax::{Expectimax, ExpectimaxConfig};
use crate::heuristic::{Greedy, Weights};
use crate::mcts::{Mcts, MctsConfig};
use crate::minimax::{Minimax, MinimaxConfig};
use derive_more::{Display, Error};
use outflank_othello::{Board, Color, Location};

/// A move-selection policy for a computer player.
pub trait Strategy: Send + Sync {
    /// A short name for logs.
    fn name(&self) -> &'static str;

    /// Choose a destination for `player` on `board`.
    ///
    /// The result must be one of `player`'s legal destinations; it is None only
    /// when `player` has no legal move. Implementations work on private copies
    /// of `board` and return their best move so far once `budget` runs out.
    fn choose_move(&self, board: &Board, player: Color, budget: &Budget) -> Option<Location>;
}

/// Invalid strategy settings, rejected when the strategy is constructed.
#[derive(Clone, Debug, PartialEq, Display, Error)]
pub enum ConfigError {
    #[display(fmt = "search depth must be between 1 and {}, got {}", max, depth)]
    Depth { depth: u8, max: u8 },
    #[display(fmt = "iteration budget must be positive")]
    Iterations,
    #[display(fmt = "exploration constant must be finite and non-negative, got {}", value)]
    Exploration { value: f64 },
    #[display(fmt = "worker count must be positive")]
    Workers,
    #[display(fmt = "late-game fill threshold must be within [0, 1], got {}", value)]
    FillThreshold { value: f64 },
}

/// The built-in strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum StrategyKind {
    #[display(fmt = "greedy")]
    Greedy,
    #[display(fmt = "minimax")]
    Minimax,
    #[display(fmt = "expectimax")]
    Expectimax,
    #[display(fmt = "mcts")]
    Mcts,
}

#[derive(Clone, Debug, PartialEq, Eq, Display, Error)]
#[display(fmt = "unknown strategy {:?}", name)]
pub struct ParseStrategyError {
    pub name: String,
}

impl std::str::FromStr for StrategyKind {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "greedy" | "heuristic" | "custom" => Ok(StrategyKind::Greedy),
            "minimax" => Ok(StrategyKind::Minimax),
            "expectimax" => Ok(StrategyKind::Expectimax),
            "mcts" => Ok(StrategyKind::Mcts),
            _ => Err(ParseStrategyError { name: s.to_string() }),
        }
    }
}

/// Settings for every built-in strategy. Fields that do not apply to the
/// chosen kind are ignored.
#[derive(Clone, Debug, Default)]
pub struct StrategyConfig {
    pub weights: Weights,
    /// Search depth for minimax and expectimax; None keeps each one's default.
    pub depth: Option<u8>,
    pub parallel: bool,
    pub mcts: MctsConfig,
}

impl StrategyConfig {
    pub fn build(&self, kind: StrategyKind) -> Result<Box<dyn Strategy>, ConfigError> {
        let strategy: Box<dyn Strategy> = match kind {
            StrategyKind::Greedy => Box::new(Greedy::new(self.weights.clone())?),
            StrategyKind::Minimax => {
                let defaults = MinimaxConfig::default();
                Box::new(Minimax::new(MinimaxConfig {
                    depth: self.depth.unwrap_or(defaults.depth),
                    parallel: self.parallel,
                    weights: self.weights.clone(),
                })?)
            }
            StrategyKind::Expectimax => {
                let defaults = ExpectimaxConfig::default();
                Box::new(Expectimax::new(ExpectimaxConfig {
                    depth: self.depth.unwrap_or(defaults.depth),
                    weights: self.weights.clone(),
                })?)
            }
            StrategyKind::Mcts => Box::new(Mcts::new(self.mcts.clone())?),
        };
        Ok(strategy)
    }
}

/// Pick the highest-scoring candidate, preferring the earliest on ties.
/// Candidates arrive in row-major order, so this breaks ties by lowest row,
/// then lowest column.
pub(crate) fn first_best<S: PartialOrd + Copy>(
    candidates: impl IntoIterator<Item = (Location, S)>,
) -> Option<(Location, S)> {
    let mut best: Option<(Location, S)> = None;
    for (loc, score) in candidates {
        match best {
            Some((_, best_score)) if !(score > best_score) => {}
            _ => best = Some((loc, score)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(row: usize, col: usize) -> Location {
        Location::from_coords(row, col).unwrap()
    }

    #[test]
    fn parse_kinds() {
        assert_eq!("custom".parse::<StrategyKind>(), Ok(StrategyKind::Greedy));
        assert_eq!("Minimax".parse::<StrategyKind>(), Ok(StrategyKind::Minimax));
        assert_eq!("expectimax".parse::<StrategyKind>(), Ok(StrategyKind::Expectimax));
        assert_eq!(" mcts ".parse::<StrategyKind>(), Ok(StrategyKind::Mcts));
        assert_eq!(
            "alphazero".parse::<StrategyKind>(),
            Err(ParseStrategyError {
                name: "alphazero".to_string()
            })
        );
    }

    #[test]
    fn build_every_kind() {
        let config = StrategyConfig::default();
        for kind in [
            StrategyKind::Greedy,
            StrategyKind::Minimax,
            StrategyKind::Expectimax,
            StrategyKind::Mcts,
        ] {
            let strategy = config.build(kind).unwrap();
            assert_eq!(strategy.name(), kind.to_string());
        }
    }

    #[test]
    fn build_rejects_bad_depth() {
        let config = StrategyConfig {
            depth: Some(0),
            ..StrategyConfig::default()
        };
        assert!(matches!(
            config.build(StrategyKind::Minimax),
            Err(ConfigError::Depth { depth: 0, .. })
        ));
        assert!(config.build(StrategyKind::Greedy).is_ok());
    }

    #[test]
    fn first_best_prefers_earliest() {
        let picked = first_best(vec![(loc(2, 3), 1), (loc(3, 2), 5), (loc(4, 5), 5)]);
        assert_eq!(picked, Some((loc(3, 2), 5)));
        assert_eq!(first_best(Vec::<(Location, i32)>::new()), None);
    }
}
