//! Depth-limited alpha-beta search over the static evaluation.
//!
//! The search is written negamax-style: every score is from the point of view
//! of the side to move, which works because [`evaluate`] is antisymmetric.

use crate::budget::Budget;
use crate::heuristic::{evaluate, Weights};
use crate::strategy::{first_best, ConfigError, Strategy};
use outflank_othello::{Board, Color, Game, LegalMoves, Location};
use tracing::{debug, warn};

/// The deepest search a [`Minimax`] or [`crate::Expectimax`] may be configured with.
pub const MAX_DEPTH: u8 = 12;

/// Added to the final disc difference of a decided game so any win outranks
/// any heuristic score.
pub(crate) const WIN_SCORE: i32 = 1_000_000;

// Symmetric bounds; i32::MIN cannot be negated.
const INFINITY: i32 = i32::MAX;

/// The budget ran out before the current iteration finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct OutOfTime;

pub(crate) fn validate_depth(depth: u8) -> Result<(), ConfigError> {
    if depth == 0 || depth > MAX_DEPTH {
        return Err(ConfigError::Depth {
            depth,
            max: MAX_DEPTH,
        });
    }
    Ok(())
}

/// Score a finished game for `color`.
pub(crate) fn terminal_score(board: &Board, color: Color) -> i32 {
    let diff = board.score_absolute_difference(color) as i32;
    match diff.signum() {
        1 => WIN_SCORE + diff,
        -1 => -WIN_SCORE + diff,
        _ => 0,
    }
}

#[derive(Clone, Debug)]
pub struct MinimaxConfig {
    /// Plies searched by the final iteration.
    pub depth: u8,
    /// Search the root's children on separate threads.
    pub parallel: bool,
    pub weights: Weights,
}

impl Default for MinimaxConfig {
    fn default() -> Self {
        Self {
            depth: 4,
            parallel: false,
            weights: Weights::default(),
        }
    }
}

/// Alpha-beta search with iterative deepening.
#[derive(Clone, Debug)]
pub struct Minimax {
    config: MinimaxConfig,
}

impl Minimax {
    pub fn new(config: MinimaxConfig) -> Result<Self, ConfigError> {
        validate_depth(config.depth)?;
        config.weights.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MinimaxConfig {
        &self.config
    }

    /// Fail-hard window search. Passing does not use up depth; a second pass
    /// in a row ends the game.
    fn negamax(
        &self,
        game: Game,
        depth: u8,
        mut alpha: i32,
        beta: i32,
        budget: &Budget,
    ) -> Result<i32, OutOfTime> {
        if budget.is_exhausted() {
            return Err(OutOfTime);
        }

        if game.board.is_full() {
            return Ok(terminal_score(&game.board, game.active));
        }

        let moves = game.legal_moves();
        if moves.is_empty() {
            if game.just_passed {
                return Ok(terminal_score(&game.board, game.active));
            }
            return Ok(-self.negamax(game.pass(), depth, -beta, -alpha, budget)?);
        }

        if depth == 0 {
            return Ok(evaluate(&game.board, game.active, &self.config.weights));
        }

        for mv in &moves {
            let next = match game.play(&moves, mv.destination) {
                Ok(next) => next,
                Err(_) => continue,
            };
            let score = -self.negamax(next, depth - 1, -beta, -alpha, budget)?;

            if score >= beta {
                return Ok(beta);
            }
            if score > alpha {
                alpha = score;
            }
        }

        Ok(alpha)
    }

    /// Score every root move to `depth` plies and pick the best.
    fn search_root(
        &self,
        game: Game,
        moves: &LegalMoves,
        depth: u8,
        budget: &Budget,
    ) -> Result<Option<(Location, i32)>, OutOfTime> {
        let children: Vec<(Location, Game)> = moves
            .iter()
            .filter_map(|mv| {
                game.play(moves, mv.destination)
                    .ok()
                    .map(|child| (mv.destination, child))
            })
            .collect();

        if self.config.parallel && children.len() > 1 {
            let scores = std::thread::scope(|scope| {
                let handles: Vec<_> = children
                    .iter()
                    .map(|&(loc, child)| {
                        scope.spawn(move || {
                            self.negamax(child, depth - 1, -INFINITY, INFINITY, budget)
                                .map(|score| (loc, -score))
                        })
                    })
                    .collect();

                handles
                    .into_iter()
                    .map(|handle| {
                        handle
                            .join()
                            .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })?;
            return Ok(first_best(scores));
        }

        // Later children only need to beat the best score so far. A child that
        // fails low comes back as exactly `alpha`, which never replaces it.
        let mut alpha = -INFINITY;
        let mut scores = Vec::with_capacity(children.len());
        for (loc, child) in children {
            let score = -self.negamax(child, depth - 1, -INFINITY, -alpha, budget)?;
            alpha = alpha.max(score);
            scores.push((loc, score));
        }
        Ok(first_best(scores))
    }
}

impl Strategy for Minimax {
    fn name(&self) -> &'static str {
        "minimax"
    }

    fn choose_move(&self, board: &Board, player: Color, budget: &Budget) -> Option<Location> {
        let game = Game::new(*board, player);
        let moves = game.legal_moves();
        if moves.is_empty() {
            return None;
        }

        // The first iteration always completes, so a move is always available.
        let unlimited = Budget::unlimited();
        let mut best = None;
        for depth in 1..=self.config.depth {
            let limit = if depth == 1 { &unlimited } else { budget };
            match self.search_root(game, &moves, depth, limit) {
                Ok(Some((loc, score))) => {
                    debug!(strategy = "minimax", depth, %loc, score, "completed iteration");
                    best = Some(loc);
                    if score >= WIN_SCORE {
                        break;
                    }
                }
                Ok(None) => break,
                Err(OutOfTime) => {
                    warn!(
                        strategy = "minimax",
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::Greedy;
    use crate::CancelFlag;
    use outflank_othello::test_utils::random_midgame;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn loc(row: usize, col: usize) -> Location {
        Location::from_coords(row, col).unwrap()
    }

    fn minimax(depth: u8, parallel: bool) -> Minimax {
        Minimax::new(MinimaxConfig {
            depth,
            parallel,
            ..MinimaxConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn depth_is_validated() {
        for depth in [0, MAX_DEPTH + 1] {
            let config = MinimaxConfig {
                depth,
                ..MinimaxConfig::default()
            };
            assert_eq!(
                Minimax::new(config).unwrap_err(),
                ConfigError::Depth {
                    depth,
                    max: MAX_DEPTH
                }
            );
        }
        assert!(Minimax::new(MinimaxConfig::default()).is_ok());
    }

    #[test]
    fn terminal_scores_dominate() {
        let board: Board = format!("{}{}", "X".repeat(40), "O".repeat(24)).parse().unwrap();
        assert_eq!(terminal_score(&board, Color::Black), WIN_SCORE + 16);
        assert_eq!(terminal_score(&board, Color::White), -WIN_SCORE - 16);

        let drawn: Board = format!("{}{}", "X".repeat(32), "O".repeat(32)).parse().unwrap();
        assert_eq!(terminal_score(&drawn, Color::Black), 0);
    }

    #[test]
    fn finds_the_wipeout() {
        // H8 captures both white discs and ends the game; H6 captures one.
        let board: Board = "
            --------
            --------
            --------
            --------
            --------
            -----X--
            ------O-
            -----XO-"
            .parse()
            .unwrap();
        let chosen = minimax(3, false).choose_move(&board, Color::Black, &Budget::unlimited());
        assert_eq!(chosen, Some(loc(7, 7)));
    }

    #[test]
    fn no_moves_means_none() {
        let board: Board = "X".repeat(64).parse().unwrap();
        assert_eq!(
            minimax(2, false).choose_move(&board, Color::White, &Budget::unlimited()),
            None
        );
    }

    #[test]
    fn depth_one_matches_greedy() {
        let mut rng = StdRng::seed_from_u64(41);
        let greedy = Greedy::default();
        let shallow = minimax(1, false);

        for _ in 0..20 {
            let game = random_midgame(&mut rng);
            let moves = game.legal_moves();
            let any_terminal = moves
                .iter()
                .filter_map(|mv| game.play(&moves, mv.destination).ok())
                .any(|child| child.is_finished());
            if any_terminal {
                continue;
            }

            let budget = Budget::unlimited();
            assert_eq!(
                shallow.choose_move(&game.board, game.active, &budget),
                greedy.choose_move(&game.board, game.active, &budget)
            );
        }
    }

    #[test]
    fn parallel_root_agrees_with_sequential() {
        let mut rng = StdRng::seed_from_u64(42);
        let sequential = minimax(3, false);
        let parallel = minimax(3, true);

        for _ in 0..5 {
            let game = random_midgame(&mut rng);
            let budget = Budget::unlimited();
            assert_eq!(
                sequential.choose_move(&game.board, game.active, &budget),
                parallel.choose_move(&game.board, game.active, &budget)
            );
        }
    }

    #[test]
    fn cancelled_search_still_moves() {
        let flag = CancelFlag::new();
        flag.cancel();
        let budget = Budget::unlimited().with_cancel(flag);

        let board = Board::new();
        let chosen = minimax(MAX_DEPTH, true).choose_move(&board, Color::Black, &budget);
        let chosen = chosen.unwrap();
        assert!(board.legal_moves(Color::Black).contains(chosen));
    }
}
