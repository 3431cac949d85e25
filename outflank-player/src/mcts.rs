//! Monte-carlo tree search with UCB1 selection and random playouts.

use crate::budget::Budget;
use crate::strategy::{first_best, ConfigError, Strategy};
use arrayvec::ArrayVec;
use itertools::Itertools;
use outflank_othello::{Board, Color, Game, Location, Move, Outcome, NUM_SPACES};
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::SeedableRng;
use std::collections::HashMap;
use std::io;
use tracing::{debug, warn};

/// Longest possible path through the tree: every placement fills a cell and
/// two passes in a row end the game.
const MAX_PLIES: usize = 2 * NUM_SPACES;

#[derive(Clone, Debug, PartialEq)]
pub struct MctsConfig {
    /// Simulations per tree.
    pub iterations: u32,
    /// The UCB1 exploration constant.
    pub exploration: f64,
    /// Independent trees searched in parallel; their root visits are summed.
    pub workers: usize,
    /// Seed for the playout generator. Worker `i` uses `seed + i`.
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            exploration: std::f64::consts::SQRT_2,
            workers: 1,
            seed: None,
        }
    }
}

impl MctsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::Iterations);
        }
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(ConfigError::Exploration {
                value: self.exploration,
            });
        }
        if self.workers == 0 {
            return Err(ConfigError::Workers);
        }
        Ok(())
    }
}

/// Picks the root move with the most simulations.
#[derive(Clone, Debug)]
pub struct Mcts {
    config: MctsConfig,
}

impl Mcts {
    pub fn new(config: MctsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Grow a single tree from `root` with the configured seed (or a random one).
    pub fn search(&self, root: Game, budget: &Budget) -> SearchTree {
        let seed = self.config.seed.unwrap_or_else(rand::random);
        self.grow(root, seed, budget)
    }

    /// Search `root` and write the resulting tree to `out` in Graphviz format.
    pub fn render_dot<W: io::Write>(
        &self,
        root: Game,
        budget: &Budget,
        out: &mut W,
    ) -> io::Result<()> {
        let tree = self.search(root, budget);
        dot::render(&tree, out)
    }

    fn grow(&self, root: Game, seed: u64, budget: &Budget) -> SearchTree {
        let mut tree = SearchTree::new(root, self.config.exploration, seed);
        for iteration in 0..self.config.iterations {
            if iteration > 0 && budget.is_exhausted() {
                warn!(
                    strategy = "mcts",
                    iteration,
                    planned = self.config.iterations,
                    "budget exhausted, stopping early"
                );
                break;
            }
            tree.step();
        }
        tree
    }

    /// Root visit counts summed over every worker's tree, in row-major order.
    fn root_visits(&self, root: Game, budget: &Budget) -> Vec<(Location, u32)> {
        let base_seed = self.config.seed.unwrap_or_else(rand::random);

        let trees: Vec<SearchTree> = if self.config.workers == 1 {
            vec![self.grow(root, base_seed, budget)]
        } else {
            std::thread::scope(|scope| {
                let handles: Vec<_> = (0..self.config.workers)
                    .map(|worker| {
                        let seed = base_seed.wrapping_add(worker as u64);
                        scope.spawn(move || self.grow(root, seed, budget))
                    })
                    .collect();

                handles
                    .into_iter()
                    .map(|handle| {
                        handle
                            .join()
                            .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                    })
                    .collect()
            })
        };

        let mut totals: Vec<(Location, u32)> =
            root.legal_moves().destinations().map(|loc| (loc, 0)).collect();
        for tree in &trees {
            for (action, visits) in tree.root_visits() {
                if let Move::Piece(loc) = action {
                    if let Some(total) = totals.iter_mut().find(|(dest, _)| *dest == loc) {
                        total.1 += visits;
                    }
                }
            }
        }
        totals
    }
}

impl Strategy for Mcts {
    fn name(&self) -> &'static str {
        "mcts"
    }

    fn choose_move(&self, board: &Board, player: Color, budget: &Budget) -> Option<Location> {
        let root = Game::new(*board, player);
        let visits = self.root_visits(root, budget);
        let (loc, count) = first_best(visits)?;
        debug!(strategy = "mcts", %loc, visits = count, "chose move");
        Some(loc)
    }
}

/// A search tree over positions. Positions reached along different move
/// orders share one node.
pub struct SearchTree {
    root: Game,
    positions: HashMap<Game, PositionData>,
    exploration: f64,
    rng: StdRng,
}

#[derive(Debug)]
enum PositionData {
    Internal(InternalPosition),
    /// A finished game.
    Leaf(Outcome),
}

#[derive(Debug)]
struct InternalPosition {
    actions: Vec<ActionData>,
}

#[derive(Copy, Clone, Debug)]
pub struct ActionData {
    action: Move,
    result: Game,

    visits: u32,
    /// Accumulated reward for the player making `action`.
    total_reward: f64,
}

impl SearchTree {
    pub fn new(root: Game, exploration: f64, seed: u64) -> Self {
        Self {
            root,
            positions: HashMap::new(),
            exploration,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn root(&self) -> Game {
        self.root
    }

    /// The number of expanded positions.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Run one simulation: select, expand, play out and back up.
    pub fn step(&mut self) {
        let (leaf, trajectory, previously_visited) = self.select_leaf();

        if !previously_visited {
            let expanded = self.expand(leaf);
            self.positions.insert(leaf, expanded);
        }

        let finished = match self.positions.get(&leaf) {
            Some(PositionData::Leaf(outcome)) => Some(*outcome),
            _ => None,
        };
        let outcome = match finished {
            Some(outcome) => outcome,
            None => self.playout(leaf),
        };

        self.update_statistics(&trajectory, outcome);
    }

    /// Visit counts of the root's actions; empty before the first simulation.
    pub fn root_visits(&self) -> Vec<(Move, u32)> {
        match self.positions.get(&self.root) {
            Some(PositionData::Internal(internal)) => internal
                .actions
                .iter()
                .map(|action| (action.action, action.visits))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Walk the tree by UCB until reaching a position outside it or a finished
    /// game. Returns: (leaf, trajectory, is_previously_visited).
    fn select_leaf(&self) -> (Game, ArrayVec<usize, MAX_PLIES>, bool) {
        let mut position = self.root;
        let mut trajectory = ArrayVec::new();

        while let Some(position_data) = self.positions.get(&position) {
            match position_data {
                PositionData::Internal(internal) => {
                    let action_idx = self.ucb_action_index(internal);
                    trajectory.push(action_idx);
                    position = internal.actions[action_idx].result;
                }
                PositionData::Leaf(_) => return (position, trajectory, true),
            }
        }

        (position, trajectory, false)
    }

    fn expand(&self, position: Game) -> PositionData {
        if let Some(outcome) = position.outcome() {
            return PositionData::Leaf(outcome);
        }

        let moves = position.legal_moves();
        let actions = if moves.is_empty() {
            vec![ActionData::new(Move::Pass, position.pass())]
        } else {
            moves
                .iter()
                .filter_map(|mv| {
                    let result = position.play(&moves, mv.destination).ok()?;
                    Some(ActionData::new(Move::Piece(mv.destination), result))
                })
                .collect()
        };

        PositionData::Internal(InternalPosition { actions })
    }

    /// Play uniformly random moves until the game ends.
    fn playout(&mut self, mut game: Game) -> Outcome {
        while !game.board.is_full() {
            let moves = game.legal_moves();
            match moves.iter().choose(&mut self.rng) {
                Some(mv) => match game.play(&moves, mv.destination) {
                    Ok(next) => game = next,
                    Err(_) => break,
                },
                None if game.just_passed => break,
                None => game = game.pass(),
            }
        }
        Outcome::from_board(&game.board)
    }

    /// Credit `outcome` to every action along `trajectory`, each from the
    /// point of view of the player who took it.
    fn update_statistics(&mut self, trajectory: &[usize], outcome: Outcome) {
        let mut position = self.root;

        for &action_idx in trajectory {
            let mover = position.active;
            let internal = match self.positions.get_mut(&position) {
                Some(PositionData::Internal(internal)) => internal,
                _ => break,
            };

            let action = &mut internal.actions[action_idx];
            action.visits += 1;
            action.total_reward += reward(outcome, mover);
            position = action.result;
        }
    }

    /// Unvisited actions first, in row-major order; then the highest UCB1 score.
    fn ucb_action_index(&self, position: &InternalPosition) -> usize {
        if let Some(unvisited) = position.actions.iter().position(|a| a.visits == 0) {
            return unvisited;
        }

        let parent_visits = position.num_visits();
        let mut best_index = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (index, action) in position.actions.iter().enumerate() {
            let score = action.ucb_score(self.exploration, parent_visits);
            if score > best_score {
                best_index = index;
                best_score = score;
            }
        }

        best_index
    }
}

impl InternalPosition {
    fn num_visits(&self) -> u32 {
        self.actions.iter().map(|action| action.visits).sum()
    }
}

impl ActionData {
    fn new(action: Move, result: Game) -> Self {
        Self {
            action,
            result,
            visits: 0,
            total_reward: 0.0,
        }
    }

    fn win_rate(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.total_reward / self.visits as f64
        }
    }

    fn ucb_score(&self, exploration: f64, parent_visits: u32) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }
        let spread = ((parent_visits as f64).ln() / self.visits as f64).sqrt();
        self.win_rate() + exploration * spread
    }
}

/// 1 for a win, 0.5 for a draw and 0 for a loss.
fn reward(outcome: Outcome, player: Color) -> f64 {
    match outcome {
        Outcome::Draw => 0.5,
        Outcome::Winner(winner) if winner == player => 1.0,
        Outcome::Winner(_) => 0.0,
    }
}

fn node_name(node: &Game) -> String {
    let cells: String = node
        .board
        .cells()
        .map(|cell| match cell.occupant() {
            outflank_othello::Occupant::Empty => 'e',
            outflank_othello::Occupant::Owned(Color::Black) => 'b',
            outflank_othello::Occupant::Owned(Color::White) => 'w',
        })
        .collect();
    format!("N{}_{}_{}", cells, node.active, node.just_passed)
}

// Graphviz code for debugging
impl<'a> dot::Labeller<'a, Game, (Game, ActionData)> for SearchTree {
    fn graph_id(&'a self) -> dot::Id<'a> {
        dot::Id::new("MCTS").expect("graph id is a valid identifier")
    }

    fn node_id(&'a self, node: &Game) -> dot::Id<'a> {
        dot::Id::new(node_name(node)).expect("node names are alphanumeric")
    }

    fn node_label(&'a self, node: &Game) -> dot::LabelText<'a> {
        let board_label = dot::LabelText::label(node.to_string());
        match self.positions.get(node) {
            None => board_label,
            Some(PositionData::Leaf(outcome)) => {
                board_label.prefix_line(dot::LabelText::label(format!("Result: {}", outcome)))
            }
            Some(PositionData::Internal(data)) => board_label.prefix_line(dot::LabelText::label(
                format!("Visits: {}", data.num_visits()),
            )),
        }
    }

    fn node_color(&'a self, node: &Game) -> Option<dot::LabelText<'a>> {
        match self.positions.get(node) {
            None => Some(dot::LabelText::label("crimson")),
            Some(PositionData::Leaf(_)) => Some(dot::LabelText::label("deepskyblue")),
            _ => None,
        }
    }

    fn edge_label(&'a self, edge: &(Game, ActionData)) -> dot::LabelText<'a> {
        let parent_visits = match self.positions.get(&edge.0) {
            Some(PositionData::Internal(data)) => data.num_visits(),
            _ => 0,
        };

        dot::LabelText::label(format!(
            "{}\nVisits: {}\nWin rate: {:.3}\nUCB score: {:.3}",
            edge.1.action,
            edge.1.visits,
            edge.1.win_rate(),
            edge.1.ucb_score(self.exploration, parent_visits)
        ))
    }
}

impl<'a> dot::GraphWalk<'a, Game, (Game, ActionData)> for SearchTree {
    fn nodes(&'a self) -> dot::Nodes<'a, Game> {
        let nodes: Vec<Game> = self
            .positions
            .iter()
            .flat_map(|(&node, data)| {
                let children = match data {
                    PositionData::Internal(internal) => {
                        internal.actions.iter().map(|action| action.result).collect()
                    }
                    PositionData::Leaf(_) => Vec::new(),
                };
                std::iter::once(node).chain(children)
            })
            .unique()
            .collect();
        std::borrow::Cow::Owned(nodes)
    }

    fn edges(&'a self) -> dot::Edges<'a, (Game, ActionData)> {
        let mut edges: Vec<(Game, ActionData)> = Vec::new();
        for (&node, data) in self.positions.iter() {
            if let PositionData::Internal(internal) = data {
                for action in internal.actions.iter() {
                    edges.push((node, *action))
                }
            }
        }
        std::borrow::Cow::Owned(edges)
    }

    fn source(&'a self, edge: &(Game, ActionData)) -> Game {
        edge.0
    }

    fn target(&'a self, edge: &(Game, ActionData)) -> Game {
        edge.1.result
    }
}
