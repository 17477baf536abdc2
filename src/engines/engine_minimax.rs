//! Fixed-depth minimax strategy.
//!
//! Ranks every candidate statically first, then searches each to the
//! configured depth without pruning. Candidates the clock cuts off keep their
//! static rank, so a result is always available.

use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use crate::engines::engine_trait::{Decision, SearchContext, SearchResult, Strategy};
use crate::engines::time_management::SearchClock;
use crate::errors::EngineResult;
use crate::game_state::game_state::GameState;
use crate::game_state::onitama_types::Player;
use crate::move_generation::move_generator::MoveOracle;
use crate::search::board_scoring::PositionEvaluator;
use crate::search::minimax::minimax_root;
use crate::search::search_shared::{plan_root, static_ranking, RootPlan};
use crate::search::tactical_config::TacticalConfig;
use crate::search::telemetry::{ProgressUpdate, SearchPhase};

pub struct MinimaxStrategy {
    oracle: Arc<dyn MoveOracle>,
    config: Arc<TacticalConfig>,
    name: &'static str,
}

impl MinimaxStrategy {
    pub fn new(oracle: Arc<dyn MoveOracle>, config: Arc<TacticalConfig>, name: &'static str) -> Self {
        Self {
            oracle,
            config,
            name,
        }
    }
}

impl Strategy for MinimaxStrategy {
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
        let clock = SearchClock::start_ms(params.minimax_time_ms);
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
        let seed = static_ranking(self.oracle.as_ref(), &scorer, game_state, player, &moves)?;
        let root_order: Vec<_> = seed.iter().map(|r| r.mv).collect();

        let progress = ctx.progress();
        let outcome = minimax_root(
            self.oracle.as_ref(),
            &scorer,
            game_state,
            &root_order,
            params.minimax_depth,
            &clock,
            |best, nodes| {
                let mut update = ProgressUpdate::new(self.name);
                update.phase = Some(SearchPhase::Minimax);
                update.best_move = Some(best.mv);
                update.score = best.score;
                update.depth = params.minimax_depth;
                update.nodes = nodes;
                update.elapsed_ms = clock.elapsed_ms();
                progress.emit(update);
            },
        )?;

        // Root moves run in static order, so even a partial pass has
        // searched the static favourite.
        let (best, depth) = match outcome.ranked.first() {
            Some(best) => (*best, params.minimax_depth),
            None => (seed[0], 1),
        };
        if !outcome.completed {
            debug!(
                "{} stopped after {} of {} root moves",
                self.name,
                outcome.ranked.len(),
                root_order.len()
            );
        }

        let result = SearchResult {
            best_move: best.mv,
            score: best.score,
            depth,
            nodes: outcome.nodes + seed.len() as u64,
            elapsed_ms: clock.elapsed_ms(),
            win_rate: None,
            decision: Decision::Search,
            algorithm: self.name,
        };
        ctx.emit(result.progress_update(SearchPhase::Minimax));
        debug!(
            "{} chose {:?} score {} depth {} nodes {}",
            self.name, result.best_move, result.score, result.depth, result.nodes
        );
        Ok(result)
    }
}
