use outflank_othello::test_utils::random_midgame;
use outflank_othello::{Board, Color, Game};
use outflank_player::{Budget, CancelFlag, MctsConfig, Strategy, StrategyConfig, StrategyKind};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

const KINDS: [StrategyKind; 4] = [
    StrategyKind::Greedy,
    StrategyKind::Minimax,
    StrategyKind::Expectimax,
    StrategyKind::Mcts,
];

fn small_config() -> StrategyConfig {
    StrategyConfig {
        depth: Some(2),
        mcts: MctsConfig {
            iterations: 60,
            seed: Some(17),
            ..MctsConfig::default()
        },
        ..StrategyConfig::default()
    }
}

fn strategies(config: &StrategyConfig) -> Vec<Box<dyn Strategy>> {
    KINDS
        .iter()
        .map(|&kind| config.build(kind).unwrap())
        .collect()
}

#[test]
fn strategies_only_return_legal_moves() {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let strategies = strategies(&small_config());

    for _ in 0..8 {
        let game = random_midgame(&mut rng);
        let legal = game.legal_moves();
        for strategy in &strategies {
            let chosen = strategy
                .choose_move(&game.board, game.active, &Budget::unlimited())
                .unwrap_or_else(|| panic!("{} found no move", strategy.name()));
            assert!(
                legal.contains(chosen),
                "{} chose illegal {}",
                strategy.name(),
                chosen
            );
        }
    }
}

#[test]
fn strategies_leave_the_board_alone() {
    let mut rng = StdRng::seed_from_u64(0xB0A2D);
    let strategies = strategies(&small_config());
    let game = random_midgame(&mut rng);
    let before = game.board;

    for strategy in &strategies {
        strategy.choose_move(&game.board, game.active, &Budget::unlimited());
        assert_eq!(game.board, before);
    }
}

#[test]
fn strategies_without_moves_return_none() {
    // White has nothing to flank.
    let board: Board = "
        XO------
        --------
        --------
        --------
        --------
        --------
        --------
        --------"
        .parse()
        .unwrap();
    for strategy in strategies(&small_config()) {
        assert_eq!(
            strategy.choose_move(&board, Color::White, &Budget::unlimited()),
            None,
            "{}",
            strategy.name()
        );
    }
}

#[test]
fn exhausted_budgets_still_produce_legal_moves() {
    let config = StrategyConfig {
        depth: Some(8),
        parallel: true,
        mcts: MctsConfig {
            iterations: 100_000,
            workers: 2,
            seed: Some(3),
            ..MctsConfig::default()
        },
        ..StrategyConfig::default()
    };
    let game = Game::default();
    let legal = game.legal_moves();

    let flag = CancelFlag::new();
    flag.cancel();
    let cancelled = Budget::unlimited().with_cancel(flag);
    let expired = Budget::with_time(Duration::from_millis(0));

    for strategy in strategies(&config) {
        for budget in [&cancelled, &expired] {
            let chosen = strategy.choose_move(&game.board, game.active, budget).unwrap();
            assert!(legal.contains(chosen), "{}", strategy.name());
        }
    }
}

#[test]
fn short_time_budget_returns_promptly() {
    let config = StrategyConfig {
        depth: Some(12),
        mcts: MctsConfig {
            iterations: 1_000_000,
            ..MctsConfig::default()
        },
        ..StrategyConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(99);
    let game = random_midgame(&mut rng);

    for kind in [StrategyKind::Minimax, StrategyKind::Mcts] {
        let strategy = config.build(kind).unwrap();
        let started = std::time::Instant::now();
        let budget = Budget::with_time(Duration::from_millis(50));
        let chosen = strategy.choose_move(&game.board, game.active, &budget);
        assert!(chosen.is_some());
        assert!(started.elapsed() < Duration::from_secs(5), "{} overran", kind);
    }
}
