//! Self-play demo: two algorithms play one game and each position is printed.
//!
//! `cargo run -- [red-algorithm] [blue-algorithm] [seed]`

use std::process::ExitCode;

use onitama_engine::engines::engine_service::EngineService;
use onitama_engine::errors::EngineResult;
use onitama_engine::game_state::game_state::GameState;
use onitama_engine::game_state::onitama_types::Player;
use onitama_engine::search::telemetry::ProgressChannel;
use onitama_engine::utils::move_notation::move_to_text;
use onitama_engine::utils::render_game_state::render_game_state;
use rand::{rngs::StdRng, SeedableRng};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const MAX_PLIES: u32 = 80;

fn main() -> ExitCode {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("onitama_engine=info"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let red = args.first().map_or("hybrid", String::as_str);
    let blue = args.get(1).map_or("alphabeta", String::as_str);
    let seed = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(7u64);

    match play(red, blue, seed) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("self-play stopped: {err}");
            ExitCode::FAILURE
        }
    }
}

fn play(red: &str, blue: &str, seed: u64) -> EngineResult<()> {
    let service = EngineService::standard("default");
    let oracle = service.oracle();
    let progress = ProgressChannel::default();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut state = GameState::new_random_game(&mut rng);

    println!("{}\n", render_game_state(&state));
    for ply in 0..MAX_PLIES {
        if oracle.is_terminal(&state) {
            break;
        }
        let mover = state.current_player;
        if oracle.legal_moves(&state, mover).is_empty() {
            println!("{} has no legal moves", mover.name());
            break;
        }
        let algorithm = match mover {
            Player::Red => red,
            Player::Blue => blue,
        };
        let result = service.choose_move_seeded(
            &state,
            mover,
            algorithm,
            &progress,
            seed.wrapping_add(u64::from(ply)),
        )?;
        println!(
            "{:>3}. {} ({}) {}  score {} depth {} in {} ms",
            ply + 1,
            mover.name(),
            algorithm,
            move_to_text(&state, &result.best_move)?,
            result.score,
            result.depth,
            result.elapsed_ms
        );
        state = oracle.apply_move(&state, &result.best_move)?;
        println!("{}\n", render_game_state(&state));
    }

    match oracle.winner(&state) {
        Some(winner) => println!("{} wins", winner.name()),
        None => println!("no winner after {MAX_PLIES} plies"),
    }
    Ok(())
}
