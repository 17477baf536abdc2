//! Standalone strategy-vs-strategy series runner.
//!
//! Run with:
//! `cargo run --release --bin engine_match_series`
//! `cargo run --release --bin engine_match_series -- alphabeta montecarlo --games 20 --verbose`
//!
//! Positional arguments name the two algorithms; `--preset <name>` picks the
//! tuning preset (default `default`).

use onitama_engine::engines::engine_service::EngineService;
use onitama_engine::errors::EngineError;
use onitama_engine::utils::engine_match_harness::{
    play_engine_match_series, MatchConfig, MatchSeriesConfig,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("onitama_engine=info"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn main() -> Result<(), EngineError> {
    init_tracing();

    let mut verbose = false;
    let mut games = 10u16;
    let mut preset = "default".to_owned();
    let mut players = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--verbose" | "-v" => verbose = true,
            "--games" => {
                games = args
                    .next()
                    .and_then(|n| n.parse().ok())
                    .ok_or_else(|| EngineError::InvalidState("--games needs a number".to_owned()))?;
            }
            "--preset" => {
                preset = args
                    .next()
                    .ok_or_else(|| EngineError::InvalidState("--preset needs a name".to_owned()))?;
            }
            _ => players.push(arg),
        }
    }
    let player1 = players.first().map_or("alphabeta", String::as_str);
    let player2 = players.get(1).map_or("montecarlo", String::as_str);

    let service = EngineService::standard(preset);
    let stats = play_engine_match_series(
        &service,
        player1,
        player2,
        MatchSeriesConfig {
            games,
            base_seed: 1234,
            per_game: MatchConfig {
                max_plies: 120,
                opening_min_plies: 0,
                opening_max_plies: 4,
                random_deal: true,
            },
            verbose,
        },
    )?;

    println!("player1={player1} player2={player2}");
    println!("{}", stats.report());
    println!("outcomes: {:?}", stats.outcomes);
    Ok(())
}
