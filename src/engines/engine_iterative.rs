//! Iterative deepening alpha-beta strategy with a time budget.

use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use crate::engines::engine_trait::{Decision, SearchContext, SearchResult, Strategy};
use crate::engines::time_management::SearchClock;
use crate::errors::{EngineError, EngineResult};
use crate::game_state::game_state::GameState;
use crate::game_state::onitama_types::Player;
use crate::move_generation::move_generator::MoveOracle;
use crate::search::board_scoring::PositionEvaluator;
use crate::search::iterative_deepening::{iterative_deepening_search, SearchConfig};
use crate::search::search_shared::{plan_root, RootPlan};
use crate::search::tactical_config::TacticalConfig;
use crate::search::telemetry::{ProgressUpdate, SearchPhase};

/// Iterative-deepening alpha-beta under a wall-clock budget.
pub struct IterativeStrategy {
    oracle: Arc<dyn MoveOracle>,
    config: Arc<TacticalConfig>,
    name: &'static str,
}

impl IterativeStrategy {
    pub fn new(oracle: Arc<dyn MoveOracle>, config: Arc<TacticalConfig>, name: &'static str) -> Self {
        Self {
            oracle,
            config,
            name,
        }
    }
}

impl Strategy for IterativeStrategy {
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
        let clock = SearchClock::start_ms(params.alpha_beta_time_ms);
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
        let outcome = iterative_deepening_search(
            self.oracle.as_ref(),
            &scorer,
            game_state,
            &moves,
            SearchConfig {
                max_depth: params.alpha_beta_max_depth,
                exact_root_scores: false,
            },
            &clock,
            |iteration| {
                let Some(best) = iteration.best() else {
                    return;
                };
                debug!(
                    "{} depth {} best {:?} score {} nodes {}",
                    self.name, iteration.reached_depth, best.mv, best.score, iteration.nodes
                );
                let mut update = ProgressUpdate::new(self.name);
                update.phase = Some(SearchPhase::AlphaBeta);
                update.best_move = Some(best.mv);
                update.score = best.score;
                update.depth = iteration.reached_depth;
                update.nodes = iteration.nodes;
                update.elapsed_ms = clock.elapsed_ms();
                progress.emit(update);
            },
        )?;

        let best = outcome
            .best()
            .copied()
            .ok_or_else(|| EngineError::InvalidState("search ranked no moves".to_owned()))?;
        Ok(SearchResult {
            best_move: best.mv,
            score: best.score,
            depth: outcome.reached_depth,
            nodes: outcome.nodes,
            elapsed_ms: clock.elapsed_ms(),
            win_rate: None,
            decision: Decision::Search,
            algorithm: self.name,
        })
    }
}
