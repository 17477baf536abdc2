//! Pure Monte Carlo strategy: random playouts, best win rate wins.

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
use crate::search::monte_carlo::{best_tally, sample_candidates, PlayoutTally};
use crate::search::search_shared::{plan_root, static_ranking, RootPlan};
use crate::search::tactical_config::TacticalConfig;
use crate::search::telemetry::{ProgressUpdate, SearchPhase};

/// Map a win rate in `[0, 1]` onto `[-clamp, clamp]`.
pub fn win_rate_to_score(win_rate: f64, clamp: i32) -> i32 {
    ((win_rate - 0.5) * 2.0 * f64::from(clamp)).round() as i32
}

/// Progress update carrying per-candidate win rates.
pub(crate) fn sampling_update(
    algorithm: &'static str,
    tallies: &[PlayoutTally],
    clamp: i32,
    clock: &SearchClock,
) -> ProgressUpdate {
    let mut update = ProgressUpdate::new(algorithm);
    update.phase = Some(SearchPhase::MonteCarlo);
    update.candidates = tallies.iter().map(PlayoutTally::as_stat).collect();
    update.nodes = tallies.iter().map(PlayoutTally::simulations).sum();
    update.elapsed_ms = clock.elapsed_ms();
    if let Some(best) = best_tally(tallies) {
        update.best_move = Some(best.mv);
        update.score = win_rate_to_score(best.win_rate(), clamp);
    }
    update
}

pub struct MonteCarloStrategy {
    oracle: Arc<dyn MoveOracle>,
    config: Arc<TacticalConfig>,
    name: &'static str,
}

impl MonteCarloStrategy {
    pub fn new(oracle: Arc<dyn MoveOracle>, config: Arc<TacticalConfig>, name: &'static str) -> Self {
        Self {
            oracle,
            config,
            name,
        }
    }
}

impl Strategy for MonteCarloStrategy {
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
        let clock = SearchClock::start_ms(params.monte_carlo_time_ms);
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

        // Static ranking orders the round-robin and settles ties or an
        // unsampled field.
        let scorer = PositionEvaluator::new(Arc::clone(&self.oracle), Arc::clone(&self.config))
            .with_salt(ctx.rng.random());
        let ranked = static_ranking(self.oracle.as_ref(), &scorer, game_state, player, &moves)?;
        let ordered: Vec<_> = ranked.iter().map(|r| r.mv).collect();

        let progress = ctx.progress();
        let clamp = params.score_clamp;
        let tallies = sample_candidates(
            self.oracle.as_ref(),
            game_state,
            player,
            &ordered,
            params.playout_move_limit,
            &clock,
            &mut ctx.rng,
            |tallies| progress.emit(sampling_update(self.name, tallies, clamp, &clock)),
        )?;

        let simulations: u64 = tallies.iter().map(PlayoutTally::simulations).sum();
        let result = match best_tally(&tallies) {
            Some(best) => SearchResult {
                best_move: best.mv,
                score: win_rate_to_score(best.win_rate(), clamp),
                depth: 1,
                nodes: simulations,
                elapsed_ms: clock.elapsed_ms(),
                win_rate: Some(best.win_rate()),
                decision: Decision::Search,
                algorithm: self.name,
            },
            None => SearchResult {
                best_move: ranked[0].mv,
                score: ranked[0].score,
                depth: 1,
                nodes: ranked.len() as u64,
                elapsed_ms: clock.elapsed_ms(),
                win_rate: None,
                decision: Decision::Search,
                algorithm: self.name,
            },
        };

        ctx.emit(sampling_update(self.name, &tallies, clamp, &clock));
        debug!(
            "{} chose {:?} win rate {:?} over {} simulations",
            self.name, result.best_move, result.win_rate, simulations
        );
        Ok(result)
    }
}
