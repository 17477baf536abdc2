//! Pluggable position evaluation.
//!
//! Search stays independent of the heuristic by scoring leaves through
//! `BoardScorer`. `PositionEvaluator` is the configurable implementation driven
//! by a `TacticalConfig`; `normalize_for_display` is the presentation-only
//! rescaling and never feeds back into search.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::game_state::game_state::GameState;
use crate::game_state::onitama_rules::{home_row, TEMPLE_COLUMN};
use crate::game_state::onitama_types::Player;
use crate::move_generation::legal_move_checks::{board_winner, is_master_threatened};
use crate::move_generation::move_generator::MoveOracle;
use crate::search::tactical_config::{DisplayRange, TacticalConfig};

pub trait BoardScorer: Send + Sync {
    /// Signed utility of `game_state` for `perspective`.
    fn score(&self, game_state: &GameState, perspective: Player) -> i32;

    /// Magnitude at or beyond which a score denotes a decided game.
    fn win_score(&self) -> i32;
}

pub struct PositionEvaluator {
    oracle: Arc<dyn MoveOracle>,
    config: Arc<TacticalConfig>,
    jitter_salt: u64,
}

impl PositionEvaluator {
    pub fn new(oracle: Arc<dyn MoveOracle>, config: Arc<TacticalConfig>) -> Self {
        Self {
            oracle,
            config,
            jitter_salt: 0,
        }
    }

    /// Use a different jitter pattern. Scores stay a pure function of
    /// (position, salt), so every visit of a position agrees within one search.
    pub fn with_salt(mut self, salt: u64) -> Self {
        self.jitter_salt = salt;
        self
    }

    #[inline]
    pub fn config(&self) -> &TacticalConfig {
        &self.config
    }

    /// Decided-game score, or `None` while both masters are alive and off
    /// their goal squares.
    pub fn terminal_score(&self, game_state: &GameState, perspective: Player) -> Option<i32> {
        board_winner(game_state).map(|winner| {
            if winner == perspective {
                self.config.terminal.win_score
            } else {
                self.config.terminal.loss_score
            }
        })
    }

    /// Heuristic terms for one side, before jitter and clamping.
    pub fn side_terms(&self, game_state: &GameState, player: Player) -> i32 {
        let cfg = &self.config;
        let mut score = 0i32;

        for (sq, piece) in game_state.pieces_of(player) {
            let value = if piece.is_master() {
                cfg.material.master_value
            } else {
                cfg.material.student_value
            };
            score += value;

            if sq.is_center_block() {
                let weight = if piece.is_master() {
                    cfg.positional.center_control * cfg.positional.master_center_multiplier
                } else {
                    cfg.positional.center_control
                };
                score += weight;
            }
        }

        if let Some(master) = game_state.master_square(player) {
            let progress = i32::from(master.row.abs_diff(home_row(player)));
            score += progress * cfg.positional.master_progress;
            if master.col == TEMPLE_COLUMN {
                score += cfg.positional.center_column_bonus;
            }

            let guards = game_state
                .pieces_of(player)
                .filter(|(sq, p)| !p.is_master() && sq.chebyshev(master) == 1)
                .count() as i32;
            score += guards * cfg.safety.master_guard;

            if is_master_threatened(game_state, player) {
                score -= cfg.safety.unsafe_master_penalty;
            }
        }

        let moves = self.oracle.legal_moves(game_state, player);
        let captures = moves.iter().filter(|m| m.captures).count() as i32;
        score += captures * cfg.tactical.capture_opportunity;
        let mobility = (moves.len() as i32).saturating_mul(cfg.tactical.mobility_per_move);
        score += mobility.min(cfg.tactical.mobility_cap);

        score
    }

    /// Tie-breaking noise in `[-jitter, jitter]`, from Red's point of view.
    fn jitter_red(&self, game_state: &GameState) -> i32 {
        let spread = self.config.search.evaluation_jitter;
        if spread == 0 {
            return 0;
        }
        let mut hasher = DefaultHasher::new();
        self.jitter_salt.hash(&mut hasher);
        game_state.hash(&mut hasher);
        let width = (2 * spread + 1) as u64;
        (hasher.finish() % width) as i32 - spread
    }
}

impl BoardScorer for PositionEvaluator {
    fn score(&self, game_state: &GameState, perspective: Player) -> i32 {
        if let Some(decided) = self.terminal_score(game_state, perspective) {
            return decided;
        }

        let clamp = self.config.search.score_clamp;
        let red = self.side_terms(game_state, Player::Red) - self.side_terms(game_state, Player::Blue)
            + self.jitter_red(game_state);
        let red = red.clamp(-clamp, clamp);

        match perspective {
            Player::Red => red,
            Player::Blue => -red,
        }
    }

    fn win_score(&self) -> i32 {
        self.config.terminal.win_score
    }
}

/// Rescale a raw score into the configured display range. Scores beyond the
/// raw range saturate at the display bounds.
pub fn normalize_for_display(raw: i32, range: &DisplayRange) -> f64 {
    let lo = f64::from(range.raw_min);
    let hi = f64::from(range.raw_max);
    let clamped = f64::from(raw).clamp(lo, hi);
    let t = (clamped - lo) / (hi - lo);
    range.display_min + t * (range.display_max - range.display_min)
}
