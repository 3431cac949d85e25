//! Static position evaluation and the one-ply greedy strategy built on it.

use crate::budget::Budget;
use crate::strategy::{first_best, ConfigError, Strategy};
use outflank_othello::{apply_move, find_legal_moves, Board, Color, Direction, Location, Occupant};
use tracing::debug;

/// Weights of the linear evaluation. Every term is a difference between the
/// evaluated side and its opponent, so scores are antisymmetric.
#[derive(Clone, Debug, PartialEq)]
pub struct Weights {
    /// Per corner held. Corners can never be flipped back.
    pub corner: i32,
    /// Per edge cell chained to an owned corner along its edge.
    pub edge: i32,
    /// Per legal move available.
    pub mobility: i32,
    /// Per own disc touching an empty cell (counted against the owner).
    pub frontier: i32,
    /// Per disc while the board is less than `late_fill` full.
    pub disc_early: i32,
    /// Per disc once the board is at least `late_fill` full.
    pub disc_late: i32,
    /// Fill fraction in [0, 1] where disc counting switches to `disc_late`.
    pub late_fill: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            corner: 25,
            edge: 5,
            mobility: 5,
            frontier: 1,
            disc_early: 1,
            disc_late: 10,
            late_fill: 0.75,
        }
    }
}

impl Weights {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.late_fill) {
            return Err(ConfigError::FillThreshold {
                value: self.late_fill,
            });
        }
        Ok(())
    }
}

const CORNER_WALKS: [(usize, usize, [Direction; 2]); 4] = [
    (0, 0, [Direction::East, Direction::South]),
    (0, 7, [Direction::West, Direction::South]),
    (7, 0, [Direction::East, Direction::North]),
    (7, 7, [Direction::West, Direction::North]),
];

fn corners(board: &Board, color: Color) -> i32 {
    Location::all()
        .filter(|loc| loc.is_corner() && board.occupant(*loc).is_owned_by(color))
        .count() as i32
}

/// Edge cells that cannot be flipped: unbroken runs of `color` leading out of a
/// corner `color` owns.
fn stable_edges(board: &Board, color: Color) -> i32 {
    let mut stable = [false; outflank_othello::NUM_SPACES];

    for &(row, col, dirs) in CORNER_WALKS.iter() {
        let corner = match Location::from_coords(row, col) {
            Some(corner) if board.occupant(corner).is_owned_by(color) => corner,
            _ => continue,
        };
        for dir in dirs {
            for loc in corner
                .ray(dir)
                .take_while(|loc| board.occupant(*loc).is_owned_by(color))
            {
                stable[loc.index()] = true;
            }
        }
    }

    stable.iter().filter(|&&s| s).count() as i32
}

/// Discs of `color` adjacent to at least one empty cell.
fn frontier(board: &Board, color: Color) -> i32 {
    board
        .cells()
        .filter(|cell| cell.occupant().is_owned_by(color))
        .filter(|cell| {
            Direction::ALL.iter().any(|&dir| {
                cell.location()
                    .step(dir)
                    .map_or(false, |next| board.occupant(next) == Occupant::Empty)
            })
        })
        .count() as i32
}

fn mobility(board: &Board, color: Color) -> i32 {
    find_legal_moves(board, color).len() as i32
}

/// Score `board` from `color`'s point of view. Higher is better for `color`,
/// and `evaluate(b, c, w) == -evaluate(b, !c, w)`.
pub fn evaluate(board: &Board, color: Color, weights: &Weights) -> i32 {
    let corner_term = corners(board, color) - corners(board, !color);
    let edge_term = stable_edges(board, color) - stable_edges(board, !color);
    let mobility_term = mobility(board, color) - mobility(board, !color);
    let frontier_term = frontier(board, !color) - frontier(board, color);
    let disc_term = board.score_absolute_difference(color) as i32;

    let disc_weight = if board.fill_fraction() >= weights.late_fill {
        weights.disc_late
    } else {
        weights.disc_early
    };

    weights.corner * corner_term
        + weights.edge * edge_term
        + weights.mobility * mobility_term
        + weights.frontier * frontier_term
        + disc_weight * disc_term
}

/// Plays the move whose resulting position evaluates best. No lookahead.
#[derive(Clone, Debug)]
pub struct Greedy {
    weights: Weights,
}

impl Greedy {
    pub fn new(weights: Weights) -> Result<Self, ConfigError> {
        weights.validate()?;
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }
}

impl Default for Greedy {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
        }
    }
}

impl Strategy for Greedy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    /// One ply is cheap enough that the budget is never consulted.
    fn choose_move(&self, board: &Board, player: Color, _budget: &Budget) -> Option<Location> {
        let moves = find_legal_moves(board, player);
        let scored = moves.iter().filter_map(|mv| {
            let mut after = *board;
            apply_move(&mut after, player, mv.destination, &mv.origins).ok()?;
            Some((mv.destination, evaluate(&after, player, &self.weights)))
        });

        let (loc, score) = first_best(scored)?;
        debug!(strategy = "greedy", %loc, score, "chose move");
        Some(loc)
    }
}
