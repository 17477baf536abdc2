//! Public entrypoint: pick a move for a position with a named algorithm.

use std::sync::Arc;

use tracing::{debug, info};

use crate::engines::engine_factory::StrategyFactory;
use crate::engines::engine_trait::{SearchContext, SearchResult};
use crate::errors::EngineResult;
use crate::game_state::game_state::GameState;
use crate::game_state::onitama_types::Player;
use crate::move_generation::legal_move_generator::StandardRules;
use crate::move_generation::move_generator::MoveOracle;
use crate::search::config_loader::TacticalConfigLoader;
use crate::search::telemetry::ProgressChannel;

pub struct EngineService {
    factory: StrategyFactory,
}

impl EngineService {
    pub fn new(
        oracle: Arc<dyn MoveOracle>,
        loader: Arc<TacticalConfigLoader>,
        preset: impl Into<String>,
    ) -> Self {
        Self {
            factory: StrategyFactory::new(oracle, loader, preset),
        }
    }

    /// Base-game rules with presets read from `ONITAMA_CONFIG_DIR`.
    pub fn standard(preset: impl Into<String>) -> Self {
        Self::new(
            Arc::new(StandardRules),
            Arc::new(TacticalConfigLoader::from_env()),
            preset,
        )
    }

    #[inline]
    pub fn factory(&self) -> &StrategyFactory {
        &self.factory
    }

    #[inline]
    pub fn oracle(&self) -> &dyn MoveOracle {
        self.factory.oracle().as_ref()
    }

    pub fn choose_move(
        &self,
        game_state: &GameState,
        player: Player,
        algorithm: &str,
        progress: &ProgressChannel,
    ) -> EngineResult<SearchResult> {
        let mut ctx = SearchContext::from_os_rng(progress);
        self.run(game_state, player, algorithm, &mut ctx)
    }

    /// Same as `choose_move` with a reproducible random stream.
    pub fn choose_move_seeded(
        &self,
        game_state: &GameState,
        player: Player,
        algorithm: &str,
        progress: &ProgressChannel,
        seed: u64,
    ) -> EngineResult<SearchResult> {
        let mut ctx = SearchContext::seeded(seed, progress);
        self.run(game_state, player, algorithm, &mut ctx)
    }

    fn run(
        &self,
        game_state: &GameState,
        player: Player,
        algorithm: &str,
        ctx: &mut SearchContext<'_>,
    ) -> EngineResult<SearchResult> {
        let strategy = self.factory.get_strategy(algorithm)?;
        debug!(
            "{} searching for {} on preset '{}'",
            strategy.name(),
            player.name(),
            self.factory.preset()
        );
        let result = strategy.find_best_move(game_state, player, ctx)?;
        info!(
            "{} played {:?} via {:?}: score {} depth {} nodes {} in {} ms",
            result.algorithm,
            result.best_move,
            result.decision,
            result.score,
            result.depth,
            result.nodes,
            result.elapsed_ms
        );
        Ok(result)
    }
}
