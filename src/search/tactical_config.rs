//! Tunable evaluation and search parameters.
//!
//! Every group carries `#[serde(default)]`, so a preset document only needs
//! the fields it changes; everything else comes from the embedded defaults
//! below. `validate` is the single gate between parsed data and the engine.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::search::search_shared::SCORE_INFINITY;

/// Exclusive bound on terminal magnitudes. Proven results add up to
/// `u8::MAX` plies of depth and must still fit inside the search window.
pub const TERMINAL_SCORE_LIMIT: i32 = SCORE_INFINITY - 256;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalScores {
    pub win_score: i32,
    pub loss_score: i32,
    /// Score reported for an immediate master capture taken by a priority rule.
    pub master_capture_priority: i32,
    /// Score reported for an immediate temple-arch arrival.
    pub goal_arrival_priority: i32,
}

impl Default for TerminalScores {
    fn default() -> Self {
        Self {
            win_score: 10_000,
            loss_score: -10_000,
            master_capture_priority: 10_000,
            goal_arrival_priority: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialWeights {
    pub student_value: i32,
    pub master_value: i32,
}

impl Default for MaterialWeights {
    fn default() -> Self {
        Self {
            student_value: 100,
            master_value: 400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionalWeights {
    /// Per row of progress the master has made toward its goal.
    pub master_progress: i32,
    /// Master standing on the temple column.
    pub center_column_bonus: i32,
    /// Per piece on the inner 3x3 block.
    pub center_control: i32,
    /// Multiplier on `center_control` for the master.
    pub master_center_multiplier: i32,
}

impl Default for PositionalWeights {
    fn default() -> Self {
        Self {
            master_progress: 12,
            center_column_bonus: 8,
            center_control: 6,
            master_center_multiplier: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyWeights {
    /// Per friendly piece adjacent to one's own master.
    pub master_guard: i32,
    /// Penalty when the master can be captured next turn.
    pub unsafe_master_penalty: i32,
}

impl Default for SafetyWeights {
    fn default() -> Self {
        Self {
            master_guard: 10,
            unsafe_master_penalty: 250,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TacticalWeights {
    /// Per capture currently available.
    pub capture_opportunity: i32,
    pub mobility_per_move: i32,
    pub mobility_cap: i32,
}

impl Default for TacticalWeights {
    fn default() -> Self {
        Self {
            capture_opportunity: 15,
            mobility_per_move: 2,
            mobility_cap: 30,
        }
    }
}

/// Sampling weights for the weighted-random strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveWeights {
    pub base: f64,
    pub capture: f64,
    pub advance: f64,
    pub center: f64,
    pub master_move_penalty: f64,
}

impl Default for MoveWeights {
    fn default() -> Self {
        Self {
            base: 1.0,
            capture: 6.0,
            advance: 1.5,
            center: 1.25,
            master_move_penalty: 0.5,
        }
    }
}

/// Linear map from raw search scores to a presentation range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayRange {
    pub raw_min: i32,
    pub raw_max: i32,
    pub display_min: f64,
    pub display_max: f64,
}

impl Default for DisplayRange {
    fn default() -> Self {
        Self {
            raw_min: -2_000,
            raw_max: 2_000,
            display_min: -100.0,
            display_max: 100.0,
        }
    }
}

/// Blend of worst-case and average reply scores in shallow lookahead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpectimaxBlend {
    pub minimax_weight: f64,
    pub expectation_weight: f64,
}

impl Default for ExpectimaxBlend {
    fn default() -> Self {
        Self {
            minimax_weight: 0.7,
            expectation_weight: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub shallow_depth: u8,
    pub shallow_time_ms: u64,
    pub minimax_depth: u8,
    pub minimax_time_ms: u64,
    pub alpha_beta_max_depth: u8,
    pub alpha_beta_time_ms: u64,
    pub monte_carlo_time_ms: u64,
    /// Playout ceiling in plies; longer simulations count as draws.
    pub playout_move_limit: u32,
    pub hybrid_time_ms: u64,
    pub hybrid_max_depth: u8,
    /// Share of the hybrid budget spent in the alpha-beta phase.
    pub hybrid_alpha_beta_share: f64,
    /// Soft hybrid keeps candidates within this many points of the best.
    pub hybrid_score_threshold: i32,
    /// Half-width of the evaluation jitter.
    pub evaluation_jitter: i32,
    /// Non-terminal scores are clamped to `[-score_clamp, score_clamp]`.
    pub score_clamp: i32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            shallow_depth: 2,
            shallow_time_ms: 200,
            minimax_depth: 3,
            minimax_time_ms: 1_500,
            alpha_beta_max_depth: 8,
            alpha_beta_time_ms: 1_000,
            monte_carlo_time_ms: 1_000,
            playout_move_limit: 80,
            hybrid_time_ms: 1_500,
            hybrid_max_depth: 5,
            hybrid_alpha_beta_share: 0.5,
            hybrid_score_threshold: 60,
            evaluation_jitter: 3,
            score_clamp: 5_000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TacticalConfig {
    pub terminal: TerminalScores,
    pub material: MaterialWeights,
    pub positional: PositionalWeights,
    pub safety: SafetyWeights,
    pub tactical: TacticalWeights,
    pub move_weights: MoveWeights,
    pub display: DisplayRange,
    pub expectimax: ExpectimaxBlend,
    pub search: SearchParams,
}

impl TacticalConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: TacticalConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject internally inconsistent weights.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: String| Err(ConfigError::Validation(msg));

        if self.material.student_value <= 0 || self.material.master_value <= 0 {
            return fail(format!(
                "piece values must be positive (student {}, master {})",
                self.material.student_value, self.material.master_value
            ));
        }
        if self.terminal.win_score <= 0 || self.terminal.loss_score >= 0 {
            return fail(format!(
                "win score must be positive and loss score negative (win {}, loss {})",
                self.terminal.win_score, self.terminal.loss_score
            ));
        }
        if self.terminal.win_score >= TERMINAL_SCORE_LIMIT
            || self.terminal.loss_score <= -TERMINAL_SCORE_LIMIT
        {
            return fail(format!(
                "terminal scores must stay within ±{} (win {}, loss {})",
                TERMINAL_SCORE_LIMIT - 1,
                self.terminal.win_score,
                self.terminal.loss_score
            ));
        }
        if self.terminal.master_capture_priority < self.terminal.win_score
            || self.terminal.goal_arrival_priority < self.terminal.win_score
        {
            return fail("priority scores must be at least the win score".to_owned());
        }
        let blend = self.expectimax.minimax_weight + self.expectimax.expectation_weight;
        if self.expectimax.minimax_weight < 0.0
            || self.expectimax.expectation_weight < 0.0
            || (blend - 1.0).abs() > 1e-6
        {
            return fail(format!("expectimax blend must sum to 1, got {blend}"));
        }
        if self.display.raw_min >= self.display.raw_max
            || self.display.display_min >= self.display.display_max
        {
            return fail("display ranges must be non-empty".to_owned());
        }
        let search = &self.search;
        if search.evaluation_jitter < 0 || search.evaluation_jitter >= search.score_clamp {
            return fail(format!(
                "jitter {} must be in [0, score clamp {})",
                search.evaluation_jitter, search.score_clamp
            ));
        }
        let terminal_floor = self.terminal.win_score.min(-self.terminal.loss_score);
        if search.score_clamp >= terminal_floor {
            return fail(format!(
                "score clamp {} must stay below terminal magnitude {}",
                search.score_clamp, terminal_floor
            ));
        }
        if !(search.hybrid_alpha_beta_share > 0.0 && search.hybrid_alpha_beta_share < 1.0) {
            return fail(format!(
                "hybrid alpha-beta share must be in (0, 1), got {}",
                search.hybrid_alpha_beta_share
            ));
        }
        if search.hybrid_score_threshold < 0 {
            return fail("hybrid score threshold must be non-negative".to_owned());
        }
        if search.shallow_depth == 0
            || search.minimax_depth == 0
            || search.alpha_beta_max_depth == 0
            || search.hybrid_max_depth == 0
        {
            return fail("search depths must be at least 1".to_owned());
        }
        if search.shallow_time_ms == 0
            || search.minimax_time_ms == 0
            || search.alpha_beta_time_ms == 0
            || search.monte_carlo_time_ms == 0
            || search.hybrid_time_ms == 0
            || search.playout_move_limit == 0
        {
            return fail("time budgets and playout limit must be positive".to_owned());
        }
        let weights = &self.move_weights;
        if [
            weights.base,
            weights.capture,
            weights.advance,
            weights.center,
            weights.master_move_penalty,
        ]
        .iter()
        .any(|w| !(w.is_finite() && *w > 0.0))
        {
            return fail("move weights must be positive and finite".to_owned());
        }
        Ok(())
    }
}
