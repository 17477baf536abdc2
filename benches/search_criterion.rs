use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use onitama_engine::engines::time_management::SearchClock;
use onitama_engine::game_state::game_state::GameState;
use onitama_engine::game_state::onitama_types::Player;
use onitama_engine::move_generation::legal_move_generator::{generate_moves, StandardRules};
use onitama_engine::move_generation::perft::perft;
use onitama_engine::search::board_scoring::PositionEvaluator;
use onitama_engine::search::iterative_deepening::{iterative_deepening_search, SearchConfig};
use onitama_engine::search::monte_carlo::random_playout;
use onitama_engine::search::tactical_config::TacticalConfig;
use rand::{rngs::StdRng, SeedableRng};

/// Generous enough that no benchmarked search is cut short.
const UNBOUNDED_MS: u64 = 60_000;

fn bench_perft(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft_opening");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(4));
    group.sample_size(20);

    let game = GameState::new_game();
    for depth in 1..=4u8 {
        // Correctness guard before benchmarking.
        let warmup = perft(&StandardRules, &game, depth).expect("perft should run");
        group.throughput(Throughput::Elements(warmup.nodes as u64));
        group.bench_with_input(BenchmarkId::from_parameter(format!("d{depth}")), &depth, |b, &d| {
            b.iter(|| {
                let counts = perft(&StandardRules, black_box(&game), black_box(d))
                    .expect("perft benchmark run should succeed");
                assert_eq!(counts.nodes, warmup.nodes);
                black_box(counts.nodes)
            });
        });
    }
    group.finish();
}

fn bench_alpha_beta(c: &mut Criterion) {
    let mut group = c.benchmark_group("alpha_beta_opening");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(10);

    let oracle = Arc::new(StandardRules);
    let scorer = PositionEvaluator::new(oracle.clone(), Arc::new(TacticalConfig::default()));
    let game = GameState::new_game();
    let moves = generate_moves(&game, Player::Red);

    for depth in [2u8, 3, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(format!("d{depth}")), &depth, |b, &d| {
            b.iter(|| {
                let clock = SearchClock::start_ms(UNBOUNDED_MS);
                let outcome = iterative_deepening_search(
                    oracle.as_ref(),
                    &scorer,
                    black_box(&game),
                    &moves,
                    SearchConfig {
                        max_depth: d,
                        exact_root_scores: false,
                    },
                    &clock,
                    |_| {},
                )
                .expect("search should run");
                black_box(outcome.nodes)
            });
        });
    }
    group.finish();
}

fn bench_playouts(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_playout");
    group.sample_size(30);

    let game = GameState::new_game();
    group.bench_function("opening_100_plies", |b| {
        let mut rng = StdRng::seed_from_u64(17);
        b.iter(|| black_box(random_playout(&StandardRules, black_box(&game), Player::Red, 100, &mut rng)));
    });
    group.finish();
}

criterion_group!(search_benches, bench_perft, bench_alpha_beta, bench_playouts);
criterion_main!(search_benches);
