//! Random positions for property-style tests.

use crate::game::{Game, Move};
use rand::seq::SliceRandom;
use rand::Rng;

/// Play up to `plies` uniformly random moves from the starting position,
/// passing when forced. Stops early if the game ends.
pub fn random_game<R: Rng>(rng: &mut R, plies: usize) -> Game {
    let mut game = Game::default();

    for _ in 0..plies {
        if game.is_finished() {
            break;
        }

        let moves = game.legal_moves();
        let destinations: Vec<_> = moves.destinations().collect();
        game = match destinations.choose(rng) {
            Some(&loc) => game.play(&moves, loc),
            None => game.apply_move(Move::Pass),
        }
        .unwrap_or(game);
    }

    game
}

/// A random position that is still running and where the side to move has at
/// least one placement. Plays between 8 and 40 plies.
pub fn random_midgame<R: Rng>(rng: &mut R) -> Game {
    loop {
        let plies = rng.gen_range(8..=40);
        let game = random_game(rng, plies);
        if !game.is_finished() && !game.legal_moves().is_empty() {
            return game;
        }
    }
}
