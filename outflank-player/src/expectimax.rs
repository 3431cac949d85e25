//! Depth-limited search that treats the opponent as a uniformly random player.

use crate::budget::Budget;
use crate::heuristic::{evaluate, Weights};
use crate::minimax::{terminal_score, validate_depth, OutOfTime};
use crate::strategy::{first_best, ConfigError, Strategy};
use outflank_othello::{Board, Color, Game, Location};
use tracing::{debug, warn};

#[derive(Clone, Debug)]
pub struct ExpectimaxConfig {
    pub depth: u8,
    pub weights: Weights,
}

impl Default for ExpectimaxConfig {
    fn default() -> Self {
        Self {
            depth: 3,
            weights: Weights::default(),
        }
    }
}

/// Maximizes over its own moves and averages over the opponent's replies.
/// Averages cannot be bounded, so there is no pruning.
#[derive(Clone, Debug)]
pub struct Expectimax {
    config: ExpectimaxConfig,
}

impl Expectimax {
    pub fn new(config: ExpectimaxConfig) -> Result<Self, ConfigError> {
        validate_depth(config.depth)?;
        config.weights.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExpectimaxConfig {
        &self.config
    }

    /// The value of `game` for `maximizer`.
    fn value(
        &self,
        game: Game,
        depth: u8,
        maximizer: Color,
        budget: &Budget,
    ) -> Result<f64, OutOfTime> {
        if budget.is_exhausted() {
            return Err(OutOfTime);
        }

        if game.board.is_full() {
            return Ok(terminal_score(&game.board, maximizer) as f64);
        }

        let moves = game.legal_moves();
        if moves.is_empty() {
            if game.just_passed {
                return Ok(terminal_score(&game.board, maximizer) as f64);
            }
            return self.value(game.pass(), depth, maximizer, budget);
        }

        if depth == 0 {
            return Ok(evaluate(&game.board, maximizer, &self.config.weights) as f64);
        }

        let mut best = f64::NEG_INFINITY;
        let mut total = 0.0;
        let mut count = 0;
        for mv in &moves {
            let next = match game.play(&moves, mv.destination) {
                Ok(next) => next,
                Err(_) => continue,
            };
            let value = self.value(next, depth - 1, maximizer, budget)?;
            best = best.max(value);
            total += value;
            count += 1;
        }

        if game.active == maximizer {
            Ok(best)
        } else {
            Ok(total / count as f64)
        }
    }

    fn search_root(
        &self,
        game: Game,
        depth: u8,
        budget: &Budget,
    ) -> Result<Option<(Location, f64)>, OutOfTime> {
        let moves = game.legal_moves();
        let mut scores = Vec::with_capacity(moves.len());
        for mv in &moves {
            if let Ok(child) = game.play(&moves, mv.destination) {
                let value = self.value(child, depth - 1, game.active, budget)?;
                scores.push((mv.destination, value));
            }
        }
        Ok(first_best(scores))
    }
}

impl Strategy for Expectimax {
    fn name(&self) -> &'static str {
        "expectimax"
    }

    fn choose_move(&self, board: &Board, player: Color, budget: &Budget) -> Option<Location> {
        let game = Game::new(*board, player);
        if game.legal_moves().is_empty() {
            return None;
        }

        let unlimited = Budget::unlimited();
        let mut best = None;
        for depth in 1..=self.config.depth {
            let limit = if depth == 1 { &unlimited } else { budget };
            match self.search_root(game, depth, limit) {
                Ok(Some((loc, value))) => {
                    debug!(strategy = "expectimax", depth, %loc, value, "completed iteration");
                    best = Some(loc);
                }
                Ok(None) => break,
                Err(OutOfTime) => {
                    warn!(
                        strategy = "expectimax",
                        depth,
                        "budget exhausted, keeping the previous iteration"
                    );
                    break;
                }
            }
        }

        best
    }
}
