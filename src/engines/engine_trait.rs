//! Strategy abstraction shared by every search algorithm.
//!
//! Defines the per-call context (randomness and progress channel), the result
//! payload, and the trait the selector hands out, so strategies can be swapped
//! at runtime behind one interface.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::errors::EngineResult;
use crate::game_state::game_state::GameState;
use crate::game_state::onitama_types::{CandidateMove, Player};
use crate::search::telemetry::{ProgressChannel, ProgressUpdate, SearchPhase};

/// Why a move was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Captures the opposing master.
    MasterCapture,
    /// Walks one's own master onto the opposing temple arch.
    GoalArrival,
    /// Only one candidate survived filtering.
    OnlyMove,
    Search,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub best_move: CandidateMove,
    pub score: i32,
    pub depth: u8,
    /// Nodes visited plus simulations run.
    pub nodes: u64,
    pub elapsed_ms: u64,
    /// Sampling strategies report the chosen move's win rate.
    pub win_rate: Option<f64>,
    pub decision: Decision,
    pub algorithm: &'static str,
}

impl SearchResult {
    /// Snapshot of this result as a progress update.
    pub fn progress_update(&self, phase: SearchPhase) -> ProgressUpdate {
        let mut update = ProgressUpdate::new(self.algorithm);
        update.phase = Some(phase);
        update.best_move = Some(self.best_move);
        update.score = self.score;
        update.depth = self.depth;
        update.nodes = self.nodes;
        update.elapsed_ms = self.elapsed_ms;
        update
    }
}

/// Per-call scratch handed to `Strategy::find_best_move`.
pub struct SearchContext<'a> {
    pub rng: StdRng,
    progress: &'a ProgressChannel,
}

impl<'a> SearchContext<'a> {
    /// Reproducible context.
    pub fn seeded(seed: u64, progress: &'a ProgressChannel) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            progress,
        }
    }

    pub fn from_os_rng(progress: &'a ProgressChannel) -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            progress,
        }
    }

    /// The caller's channel. Outlives this borrow of the context, so it can
    /// be used while `rng` is borrowed mutably.
    #[inline]
    pub fn progress(&self) -> &'a ProgressChannel {
        self.progress
    }

    #[inline]
    pub fn emit(&self, update: ProgressUpdate) {
        self.progress.emit(update);
    }
}

pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Choose a move for `player`. Fails with `EngineError::NoLegalMoves` when
    /// the oracle offers nothing; otherwise always returns one of the oracle's
    /// moves within the strategy's time budget.
    fn find_best_move(
        &self,
        game_state: &GameState,
        player: Player,
        ctx: &mut SearchContext<'_>,
    ) -> EngineResult<SearchResult>;
}
