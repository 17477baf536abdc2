//! Random-playout sampling of root candidates.
//!
//! Candidates are simulated round-robin so each gets a comparable share of
//! the budget. The clock is checked before every simulation; a playout that
//! hits the move ceiling counts as a draw.

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::engines::time_management::SearchClock;
use crate::errors::EngineResult;
use crate::game_state::game_state::GameState;
use crate::game_state::onitama_types::{CandidateMove, Player};
use crate::move_generation::move_generator::MoveOracle;
use crate::search::telemetry::CandidateStat;

/// Rounds between progress callbacks.
pub const REPORT_EVERY_ROUNDS: u64 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayoutOutcome {
    Win,
    Loss,
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayoutTally {
    pub mv: CandidateMove,
    pub wins: u64,
    pub losses: u64,
    pub draws: u64,
}

impl PlayoutTally {
    pub fn new(mv: CandidateMove) -> Self {
        Self {
            mv,
            wins: 0,
            losses: 0,
            draws: 0,
        }
    }

    #[inline]
    pub fn simulations(&self) -> u64 {
        self.wins + self.losses + self.draws
    }

    /// Wins plus half the draws, over all simulations. Unsampled moves sit at
    /// an even 0.5.
    pub fn win_rate(&self) -> f64 {
        let n = self.simulations();
        if n == 0 {
            return 0.5;
        }
        (self.wins as f64 + 0.5 * self.draws as f64) / n as f64
    }

    fn record(&mut self, outcome: PlayoutOutcome) {
        match outcome {
            PlayoutOutcome::Win => self.wins += 1,
            PlayoutOutcome::Loss => self.losses += 1,
            PlayoutOutcome::Draw => self.draws += 1,
        }
    }

    pub fn as_stat(&self) -> CandidateStat {
        CandidateStat {
            mv: self.mv,
            simulations: self.simulations(),
            win_rate: self.win_rate(),
        }
    }
}

fn outcome_for(winner: Option<Player>, player: Player) -> PlayoutOutcome {
    match winner {
        Some(w) if w == player => PlayoutOutcome::Win,
        Some(_) => PlayoutOutcome::Loss,
        None => PlayoutOutcome::Draw,
    }
}

/// Play uniformly random moves from `game_state` until the game ends, a side
/// has no moves, or `move_limit` plies pass. Scored for `player`.
pub fn random_playout<R: Rng + ?Sized>(
    oracle: &dyn MoveOracle,
    game_state: &GameState,
    player: Player,
    move_limit: u32,
    rng: &mut R,
) -> EngineResult<PlayoutOutcome> {
    let mut state = game_state.clone();
    for _ in 0..move_limit {
        if oracle.is_terminal(&state) {
            return Ok(outcome_for(oracle.winner(&state), player));
        }
        let moves = oracle.legal_moves(&state, state.current_player);
        let Some(mv) = moves.choose(rng) else {
            return Ok(PlayoutOutcome::Draw);
        };
        state = oracle.apply_move(&state, mv)?;
    }
    if oracle.is_terminal(&state) {
        return Ok(outcome_for(oracle.winner(&state), player));
    }
    Ok(PlayoutOutcome::Draw)
}

/// Simulate `moves` round-robin until the clock expires. `on_round` receives
/// the running tallies every `REPORT_EVERY_ROUNDS` completed rounds.
#[allow(clippy::too_many_arguments)]
pub fn sample_candidates<R, F>(
    oracle: &dyn MoveOracle,
    game_state: &GameState,
    player: Player,
    moves: &[CandidateMove],
    move_limit: u32,
    clock: &SearchClock,
    rng: &mut R,
    mut on_round: F,
) -> EngineResult<Vec<PlayoutTally>>
where
    R: Rng + ?Sized,
    F: FnMut(&[PlayoutTally]),
{
    let mut children = Vec::with_capacity(moves.len());
    for mv in moves {
        children.push(oracle.apply_move(game_state, mv)?);
    }
    let mut tallies: Vec<PlayoutTally> = moves.iter().copied().map(PlayoutTally::new).collect();
    if tallies.is_empty() {
        return Ok(tallies);
    }

    let mut rounds = 0u64;
    'rounds: loop {
        for (tally, child) in tallies.iter_mut().zip(&children) {
            if clock.expired() {
                break 'rounds;
            }
            let outcome = random_playout(oracle, child, player, move_limit, rng)?;
            tally.record(outcome);
        }
        rounds += 1;
        if rounds % REPORT_EVERY_ROUNDS == 0 {
            on_round(&tallies);
        }
    }

    Ok(tallies)
}

/// Highest win rate among sampled tallies; ties keep the earlier entry.
pub fn best_tally(tallies: &[PlayoutTally]) -> Option<&PlayoutTally> {
    tallies
        .iter()
        .filter(|t| t.simulations() > 0)
        .fold(None, |best: Option<&PlayoutTally>, t| match best {
            Some(b) if b.win_rate() >= t.win_rate() => Some(b),
            _ => Some(t),
        })
}
