//! Alpha-beta filter followed by Monte Carlo refinement.
//!
//! The first share of the budget runs iterative deepening with exact root
//! scores. A proven result is returned at once; otherwise the surviving
//! candidates (within a threshold of the best, or tied for best in the hard
//! variant) are sampled with the rest of the budget.

use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use crate::engines::engine_monte_carlo::sampling_update;
use crate::engines::engine_trait::{Decision, SearchContext, SearchResult, Strategy};
use crate::engines::time_management::SearchClock;
use crate::errors::{EngineError, EngineResult};
use crate::game_state::game_state::GameState;
use crate::game_state::onitama_types::{CandidateMove, Player};
use crate::move_generation::move_generator::MoveOracle;
use crate::search::board_scoring::{BoardScorer, PositionEvaluator};
use crate::search::iterative_deepening::{iterative_deepening_search, SearchConfig};
use crate::search::monte_carlo::{best_tally, sample_candidates, PlayoutTally};
use crate::search::search_shared::{plan_root, RankedMove, RootPlan};
use crate::search::tactical_config::TacticalConfig;
use crate::search::telemetry::{ProgressUpdate, SearchPhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HybridVariant {
    /// Keep every candidate within `hybrid_score_threshold` of the best.
    Soft,
    /// Keep only candidates tied for the best score.
    Hard,
}

pub struct HybridStrategy {
    oracle: Arc<dyn MoveOracle>,
    config: Arc<TacticalConfig>,
    variant: HybridVariant,
    name: &'static str,
}

impl HybridStrategy {
    pub fn new(
        oracle: Arc<dyn MoveOracle>,
        config: Arc<TacticalConfig>,
        variant: HybridVariant,
        name: &'static str,
    ) -> Self {
        Self {
            oracle,
            config,
            variant,
            name,
        }
    }

    /// Candidates passed on to sampling, best alpha-beta score first.
    pub fn survivors(&self, ranked: &[RankedMove]) -> Vec<RankedMove> {
        let Some(best) = ranked.first() else {
            return Vec::new();
        };
        let floor = match self.variant {
            HybridVariant::Soft => best
                .score
                .saturating_sub(self.config.search.hybrid_score_threshold),
            HybridVariant::Hard => best.score,
        };
        ranked.iter().copied().filter(|r| r.score >= floor).collect()
    }
}

impl Strategy for HybridStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn find_best_move(
        &self,
        game_state: &GameState,
        player: Player,
        ctx: &mut SearchContext<'_>,
    ) -> EngineResult<SearchResult> {
        let params = &self.config.search;
        let clock = SearchClock::start_ms(params.hybrid_time_ms);
        let moves = match plan_root(
            &self.oracle,
            &self.config,
            game_state,
            player,
            self.name,
            true,
            &clock,
            ctx,
        )? {
            RootPlan::Decided(result) => return Ok(result),
            RootPlan::Search(moves) => moves,
        };

        let scorer = PositionEvaluator::new(Arc::clone(&self.oracle), Arc::clone(&self.config))
            .with_salt(ctx.rng.random());
        let progress = ctx.progress();

        let filter_clock = clock.split(params.hybrid_alpha_beta_share);
        let outcome = iterative_deepening_search(
            self.oracle.as_ref(),
            &scorer,
            game_state,
            &moves,
            SearchConfig {
                max_depth: params.hybrid_max_depth,
                exact_root_scores: true,
            },
            &filter_clock,
            |iteration| {
                if let Some(best) = iteration.best() {
                    let mut update = ProgressUpdate::new(self.name);
                    update.phase = Some(SearchPhase::AlphaBeta);
                    update.best_move = Some(best.mv);
                    update.score = best.score;
                    update.depth = iteration.reached_depth;
                    update.nodes = iteration.nodes;
                    update.elapsed_ms = clock.elapsed_ms();
                    progress.emit(update);
                }
            },
        )?;

        let best = outcome
            .best()
            .copied()
            .ok_or_else(|| EngineError::InvalidState("filter ranked no moves".to_owned()))?;
        let filtered = |mv: CandidateMove, score: i32, nodes: u64, win_rate: Option<f64>| {
            SearchResult {
                best_move: mv,
                score,
                depth: outcome.reached_depth,
                nodes,
                elapsed_ms: clock.elapsed_ms(),
                win_rate,
                decision: Decision::Search,
                algorithm: self.name,
            }
        };

        if outcome.decisive {
            debug!(
                "{} alpha-beta proved {} at depth {}",
                self.name,
                if best.score >= scorer.win_score() { "a win" } else { "a loss" },
                outcome.reached_depth
            );
            return Ok(filtered(best.mv, best.score, outcome.nodes, None));
        }

        let survivors = self.survivors(&outcome.ranked);
        if survivors.len() <= 1 {
            return Ok(filtered(best.mv, best.score, outcome.nodes, None));
        }
        debug!(
            "{} sampling {} of {} candidates after depth {}",
            self.name,
            survivors.len(),
            outcome.ranked.len(),
            outcome.reached_depth
        );

        let candidates: Vec<CandidateMove> = survivors.iter().map(|r| r.mv).collect();
        let clamp = params.score_clamp;
        let tallies = sample_candidates(
            self.oracle.as_ref(),
            game_state,
            player,
            &candidates,
            params.playout_move_limit,
            &clock,
            &mut ctx.rng,
            |tallies| progress.emit(sampling_update(self.name, tallies, clamp, &clock)),
        )?;
        ctx.emit(sampling_update(self.name, &tallies, clamp, &clock));

        let simulations: u64 = tallies.iter().map(PlayoutTally::simulations).sum();
        let nodes = outcome.nodes + simulations;
        let result = match best_tally(&tallies) {
            Some(tally) => {
                let score = survivors
                    .iter()
                    .find(|r| r.mv == tally.mv)
                    .map_or(best.score, |r| r.score);
                filtered(tally.mv, score, nodes, Some(tally.win_rate()))
            }
            None => filtered(best.mv, best.score, nodes, None),
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::onitama_types::{Piece, Square};
    use crate::move_generation::legal_move_generator::{generate_moves, StandardRules};
    use crate::search::telemetry::ProgressChannel;

    fn strategy(variant: HybridVariant, budget_ms: u64) -> HybridStrategy {
        let mut config = TacticalConfig::default();
        config.search.hybrid_time_ms = budget_ms;
        config.search.hybrid_max_depth = 3;
        HybridStrategy::new(Arc::new(StandardRules), Arc::new(config), variant, "hybrid")
    }

    fn ranked(scores: &[i32]) -> Vec<RankedMove> {
        let game = GameState::new_game();
        generate_moves(&game, Player::Red)
            .into_iter()
            .zip(scores)
            .map(|(mv, &score)| RankedMove { mv, score })
            .collect()
    }

    #[test]
    fn soft_keeps_the_threshold_band_and_hard_keeps_ties() {
        let ranked = ranked(&[120, 120, 90, 40]);
        let soft = strategy(HybridVariant::Soft, 100).survivors(&ranked);
        let hard = strategy(HybridVariant::Hard, 100).survivors(&ranked);
        // Default threshold is 60.
        assert_eq!(soft.len(), 3);
        assert_eq!(hard.len(), 2);
        assert!(hard.iter().all(|r| r.score == 120));
    }

    #[test]
    fn both_variants_return_a_legal_move() {
        let game = GameState::new_game();
        let legal = generate_moves(&game, Player::Red);
        let progress = ProgressChannel::default();
        for variant in [HybridVariant::Soft, HybridVariant::Hard] {
            let mut ctx = SearchContext::seeded(8, &progress);
            let result = strategy(variant, 200)
                .find_best_move(&game, Player::Red, &mut ctx)
                .expect("search succeeds");
            assert!(legal.contains(&result.best_move));
            assert!(result.depth >= 1);
        }
    }

    #[test]
    fn forced_win_skips_sampling() {
        let mut game = GameState::empty_with_card_names(
            ["Tiger", "Crab"],
            ["Ox", "Boar"],
            "Horse",
            Player::Red,
        )
        .expect("cards exist");
        game.place(Square::new(3, 2), Piece::master(Player::Red));
        game.place(Square::new(0, 4), Piece::master(Player::Blue));
        let progress = ProgressChannel::default();
        let mut ctx = SearchContext::seeded(0, &progress);
        let result = strategy(HybridVariant::Soft, 5_000)
            .find_best_move(&game, Player::Red, &mut ctx)
            .expect("search succeeds");
        assert!(result.score >= TacticalConfig::default().terminal.win_score);
        assert!(result.win_rate.is_none());
    }
}
