//! Head-to-head strategy match harness for local testing.
//!
//! Plays two algorithm identifiers against each other through an
//! `EngineService`, with an optional seeded random opening prefix.

use rand::{rngs::StdRng, seq::IndexedRandom, Rng, SeedableRng};
use std::time::Instant;
use tracing::info;

use crate::engines::engine_service::EngineService;
use crate::errors::{EngineError, EngineResult};
use crate::game_state::game_state::GameState;
use crate::game_state::onitama_types::Player;
use crate::search::telemetry::ProgressChannel;
use crate::utils::move_notation::move_to_text;

/// How a game was won.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinMethod {
    /// The loser's master was captured.
    Stone,
    /// The winner's master reached the opposing temple arch.
    Stream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    RedWin(WinMethod),
    BlueWin(WinMethod),
    /// The side to move had nothing to play.
    DrawNoMoves,
    DrawMaxPlies,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerId {
    Player1,
    Player2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesOutcome {
    PlayerWin {
        player: PlayerId,
        side: Player,
        method: WinMethod,
    },
    DrawNoMoves,
    DrawMaxPlies,
}

#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub max_plies: u16,
    pub opening_min_plies: u8,
    pub opening_max_plies: u8,
    /// Deal five random cards instead of the fixed opening deal.
    pub random_deal: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_plies: 120,
            opening_min_plies: 0,
            opening_max_plies: 4,
            random_deal: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatchResult {
    pub outcome: MatchOutcome,
    pub final_state: GameState,
    pub opening_moves: Vec<String>,
    pub played_moves: Vec<String>,
    pub red_move_count: u32,
    pub blue_move_count: u32,
    pub red_total_time_ns: u128,
    pub blue_total_time_ns: u128,
}

#[derive(Debug, Clone)]
pub struct MatchSeriesConfig {
    pub games: u16,
    pub base_seed: u64,
    pub per_game: MatchConfig,
    pub verbose: bool,
}

impl Default for MatchSeriesConfig {
    fn default() -> Self {
        Self {
            games: 9,
            base_seed: 0,
            per_game: MatchConfig::default(),
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MatchSeriesStats {
    pub games: u16,
    pub player1_wins: u16,
    pub player2_wins: u16,
    pub draws: u16,
    pub stone_wins: u16,
    pub stream_wins: u16,
    pub outcomes: Vec<SeriesOutcome>,
    pub player1_moves: u32,
    pub player2_moves: u32,
    pub player1_total_time_ns: u128,
    pub player2_total_time_ns: u128,
    pub player1_avg_move_time_ms: f64,
    pub player2_avg_move_time_ms: f64,
    pub overall_avg_move_time_ms: f64,
}

impl MatchSeriesStats {
    pub fn report(&self) -> String {
        format!(
            "games={} player1_wins={} player2_wins={} draws={} stone={} stream={} p1_avg_ms={:.3} p2_avg_ms={:.3} overall_avg_ms={:.3}",
            self.games,
            self.player1_wins,
            self.player2_wins,
            self.draws,
            self.stone_wins,
            self.stream_wins,
            self.player1_avg_move_time_ms,
            self.player2_avg_move_time_ms,
            self.overall_avg_move_time_ms
        )
    }
}

/// Play a single seeded match. `red` and `blue` are algorithm identifiers.
pub fn play_engine_match(
    service: &EngineService,
    red: &str,
    blue: &str,
    seed: u64,
    config: MatchConfig,
) -> EngineResult<MatchResult> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = if config.random_deal {
        GameState::new_random_game(&mut rng)
    } else {
        GameState::new_game()
    };
    let (state, opening_moves) = apply_seeded_random_opening(
        service,
        &start,
        &mut rng,
        config.opening_min_plies,
        config.opening_max_plies,
    )?;
    play_from_state(service, state, red, blue, seed, &config, opening_moves)
}

/// Play a single seeded match from a caller-provided position, with no
/// random opening.
pub fn play_engine_match_from_state(
    service: &EngineService,
    start_state: GameState,
    red: &str,
    blue: &str,
    seed: u64,
    config: MatchConfig,
) -> EngineResult<MatchResult> {
    play_from_state(service, start_state, red, blue, seed, &config, Vec::new())
}

fn play_from_state(
    service: &EngineService,
    mut state: GameState,
    red: &str,
    blue: &str,
    seed: u64,
    config: &MatchConfig,
    opening_moves: Vec<String>,
) -> EngineResult<MatchResult> {
    let oracle = service.oracle();
    let progress = ProgressChannel::default();

    let mut played_moves = Vec::<String>::new();
    let mut red_move_count = 0u32;
    let mut blue_move_count = 0u32;
    let mut red_total_time_ns = 0u128;
    let mut blue_total_time_ns = 0u128;

    let mut outcome = MatchOutcome::DrawMaxPlies;
    for ply in 0..config.max_plies {
        if let Some(winner) = oracle.winner(&state) {
            outcome = win_outcome(&state, winner);
            break;
        }

        let mover = state.current_player;
        let legal_moves = oracle.legal_moves(&state, mover);
        if legal_moves.is_empty() {
            outcome = MatchOutcome::DrawNoMoves;
            break;
        }

        let algorithm = match mover {
            Player::Red => red,
            Player::Blue => blue,
        };
        let started = Instant::now();
        let result = service.choose_move_seeded(
            &state,
            mover,
            algorithm,
            &progress,
            seed.wrapping_add(u64::from(ply)),
        )?;
        let elapsed_ns = started.elapsed().as_nanos();

        match mover {
            Player::Red => {
                red_move_count = red_move_count.saturating_add(1);
                red_total_time_ns = red_total_time_ns.saturating_add(elapsed_ns);
            }
            Player::Blue => {
                blue_move_count = blue_move_count.saturating_add(1);
                blue_total_time_ns = blue_total_time_ns.saturating_add(elapsed_ns);
            }
        }

        let chosen = result.best_move;
        if !legal_moves.contains(&chosen) {
            return Err(EngineError::InvalidMove(format!(
                "{algorithm} returned an illegal move {chosen:?}"
            )));
        }

        played_moves.push(move_to_text(&state, &chosen)?);
        state = oracle.apply_move(&state, &chosen)?;
    }

    // The last ply may have ended the game.
    if outcome == MatchOutcome::DrawMaxPlies {
        if let Some(winner) = oracle.winner(&state) {
            outcome = win_outcome(&state, winner);
        }
    }

    Ok(MatchResult {
        outcome,
        final_state: state,
        opening_moves,
        played_moves,
        red_move_count,
        blue_move_count,
        red_total_time_ns,
        blue_total_time_ns,
    })
}

fn win_outcome(state: &GameState, winner: Player) -> MatchOutcome {
    let method = if state.master_square(winner.opponent()).is_none() {
        WinMethod::Stone
    } else {
        WinMethod::Stream
    };
    match winner {
        Player::Red => MatchOutcome::RedWin(method),
        Player::Blue => MatchOutcome::BlueWin(method),
    }
}

/// Play a series of matches and aggregate win/loss/draw statistics.
///
/// Sides are randomized each game (deterministic from `base_seed`).
pub fn play_engine_match_series(
    service: &EngineService,
    player1: &str,
    player2: &str,
    config: MatchSeriesConfig,
) -> EngineResult<MatchSeriesStats> {
    let mut stats = MatchSeriesStats {
        games: config.games,
        ..MatchSeriesStats::default()
    };
    let mut side_rng = StdRng::seed_from_u64(config.base_seed ^ 0xA5A5_5A5A_0123_4567);

    for i in 0..config.games {
        let player1_is_red = side_rng.random_bool(0.5);
        let seed = config.base_seed.wrapping_add(u64::from(i));
        let (red, blue) = if player1_is_red {
            (player1, player2)
        } else {
            (player2, player1)
        };
        if config.verbose {
            info!(
                "[series] game {}/{} seed={} red={} blue={}",
                i + 1,
                config.games,
                seed,
                red,
                blue
            );
        }

        let result = play_engine_match(service, red, blue, seed, config.per_game.clone())?;

        let (p1_moves, p1_ns, p2_moves, p2_ns) = if player1_is_red {
            (
                result.red_move_count,
                result.red_total_time_ns,
                result.blue_move_count,
                result.blue_total_time_ns,
            )
        } else {
            (
                result.blue_move_count,
                result.blue_total_time_ns,
                result.red_move_count,
                result.red_total_time_ns,
            )
        };
        stats.player1_moves = stats.player1_moves.saturating_add(p1_moves);
        stats.player2_moves = stats.player2_moves.saturating_add(p2_moves);
        stats.player1_total_time_ns = stats.player1_total_time_ns.saturating_add(p1_ns);
        stats.player2_total_time_ns = stats.player2_total_time_ns.saturating_add(p2_ns);

        let win = match result.outcome {
            MatchOutcome::RedWin(method) => Some((Player::Red, method)),
            MatchOutcome::BlueWin(method) => Some((Player::Blue, method)),
            MatchOutcome::DrawNoMoves | MatchOutcome::DrawMaxPlies => None,
        };
        let mapped = match win {
            Some((side, method)) => {
                let player = if (side == Player::Red) == player1_is_red {
                    stats.player1_wins += 1;
                    PlayerId::Player1
                } else {
                    stats.player2_wins += 1;
                    PlayerId::Player2
                };
                match method {
                    WinMethod::Stone => stats.stone_wins += 1,
                    WinMethod::Stream => stats.stream_wins += 1,
                }
                SeriesOutcome::PlayerWin {
                    player,
                    side,
                    method,
                }
            }
            None => {
                stats.draws += 1;
                if result.outcome == MatchOutcome::DrawNoMoves {
                    SeriesOutcome::DrawNoMoves
                } else {
                    SeriesOutcome::DrawMaxPlies
                }
            }
        };
        stats.outcomes.push(mapped);

        if config.verbose {
            info!(
                "[series] game {}/{} result={:?} p1_wins={} p2_wins={} draws={}",
                i + 1,
                config.games,
                mapped,
                stats.player1_wins,
                stats.player2_wins,
                stats.draws
            );
        }
    }

    stats.player1_avg_move_time_ms =
        avg_ns_per_move_ms(stats.player1_total_time_ns, stats.player1_moves);
    stats.player2_avg_move_time_ms =
        avg_ns_per_move_ms(stats.player2_total_time_ns, stats.player2_moves);

    let total_ns = stats
        .player1_total_time_ns
        .saturating_add(stats.player2_total_time_ns);
    let total_moves = stats.player1_moves.saturating_add(stats.player2_moves);
    stats.overall_avg_move_time_ms = avg_ns_per_move_ms(total_ns, total_moves);

    Ok(stats)
}

#[inline]
fn avg_ns_per_move_ms(total_ns: u128, moves: u32) -> f64 {
    if moves == 0 {
        0.0
    } else {
        (total_ns as f64) / (moves as f64) / 1_000_000.0
    }
}

fn apply_seeded_random_opening(
    service: &EngineService,
    initial: &GameState,
    rng: &mut StdRng,
    min_plies: u8,
    max_plies: u8,
) -> EngineResult<(GameState, Vec<String>)> {
    let oracle = service.oracle();
    let mut state = initial.clone();
    let mut opening_moves = Vec::<String>::new();

    let low = min_plies.min(max_plies);
    let high = max_plies.max(min_plies);
    let target_plies = if low == high {
        low
    } else {
        rng.random_range(low..=high)
    };

    for _ in 0..target_plies {
        if oracle.is_terminal(&state) {
            break;
        }
        let legal_moves = oracle.legal_moves(&state, state.current_player);
        // Opening plies never end the game outright.
        let quiet: Vec<_> = legal_moves
            .into_iter()
            .filter(|mv| {
                oracle
                    .apply_move(&state, mv)
                    .map(|next| !oracle.is_terminal(&next))
                    .unwrap_or(false)
            })
            .collect();
        let Some(&chosen) = quiet.choose(rng) else {
            break;
        };

        opening_moves.push(move_to_text(&state, &chosen)?);
        state = oracle.apply_move(&state, &chosen)?;
    }

    Ok((state, opening_moves))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::onitama_types::{Piece, Square};
    use crate::move_generation::legal_move_generator::StandardRules;
    use crate::search::config_loader::{InMemorySource, TacticalConfigLoader};
    use std::sync::Arc;

    const FAST: &str = r#"{ "search": {
        "shallow_time_ms": 20, "minimax_time_ms": 50, "minimax_depth": 1,
        "alpha_beta_time_ms": 20, "alpha_beta_max_depth": 2,
        "monte_carlo_time_ms": 20, "hybrid_time_ms": 30, "hybrid_max_depth": 2 } }"#;

    fn service() -> EngineService {
        let loader = TacticalConfigLoader::new(Box::new(InMemorySource::new().with("fast", FAST)));
        EngineService::new(Arc::new(StandardRules), Arc::new(loader), "fast")
    }

    #[test]
    fn random_vs_easy_match_runs() {
        let result = play_engine_match(
            &service(),
            "random",
            "easy",
            42,
            MatchConfig {
                max_plies: 30,
                opening_min_plies: 2,
                opening_max_plies: 4,
                random_deal: true,
            },
        )
        .expect("match should run");

        assert!(result.opening_moves.len() >= 2);
        assert_eq!(
            result.played_moves.len() as u32,
            result.red_move_count + result.blue_move_count
        );
        assert!(result.red_move_count + result.blue_move_count > 0);
        if let MatchOutcome::RedWin(_) | MatchOutcome::BlueWin(_) = result.outcome {
            assert!(result.final_state.winner.is_some());
        }
    }

    #[test]
    fn seeded_opening_is_reproducible() {
        let service = service();
        let config = MatchConfig {
            max_plies: 0,
            opening_min_plies: 3,
            opening_max_plies: 3,
            random_deal: true,
        };
        let a = play_engine_match(&service, "random", "random", 9, config.clone()).expect("runs");
        let b = play_engine_match(&service, "random", "random", 9, config).expect("runs");
        assert_eq!(a.opening_moves, b.opening_moves);
        assert_eq!(a.final_state, b.final_state);
        assert_eq!(a.outcome, MatchOutcome::DrawMaxPlies);
    }

    #[test]
    fn forced_stream_win_is_classified() {
        // Red's master sits one Crab step below the Blue arch.
        let mut game = GameState::empty_with_card_names(
            ["Crab", "Boar"],
            ["Ox", "Horse"],
            "Tiger",
            Player::Red,
        )
        .expect("cards exist");
        game.place(Square::new(1, 2), Piece::master(Player::Red));
        game.place(Square::new(4, 4), Piece::master(Player::Blue));
        let result = play_engine_match_from_state(
            &service(),
            game,
            "alphabeta",
            "random",
            1,
            MatchConfig::default(),
        )
        .expect("match should run");
        assert_eq!(result.outcome, MatchOutcome::RedWin(WinMethod::Stream));
        assert_eq!(result.red_move_count, 1);
        assert!(result.opening_moves.is_empty());
    }

    #[test]
    fn series_aggregates_every_game() {
        let stats = play_engine_match_series(
            &service(),
            "easy",
            "random",
            MatchSeriesConfig {
                games: 3,
                base_seed: 777,
                per_game: MatchConfig {
                    max_plies: 16,
                    opening_min_plies: 0,
                    opening_max_plies: 2,
                    random_deal: true,
                },
                verbose: false,
            },
        )
        .expect("series should run");

        assert_eq!(stats.games, 3);
        assert_eq!(stats.outcomes.len(), 3);
        assert_eq!(stats.player1_wins + stats.player2_wins + stats.draws, 3);
        assert_eq!(stats.stone_wins + stats.stream_wins, stats.player1_wins + stats.player2_wins);
        assert!(stats.overall_avg_move_time_ms >= 0.0);
        assert!(stats.report().starts_with("games=3"));
    }

    #[test]
    fn unknown_algorithm_aborts_the_match() {
        let outcome = play_engine_match(&service(), "random", "nobody", 0, MatchConfig::default());
        assert!(matches!(outcome, Err(EngineError::UnknownAlgorithm(_))));
    }
}
