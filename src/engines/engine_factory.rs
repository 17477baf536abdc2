//! Algorithm identifiers and the strategy registry.
//!
//! `StrategyFactory` builds each strategy on first request from the shared
//! oracle and the configured tuning preset, then hands out the cached
//! instance. Unknown identifiers fail instead of falling back.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::engines::engine_hybrid::{HybridStrategy, HybridVariant};
use crate::engines::engine_iterative::IterativeStrategy;
use crate::engines::engine_minimax::MinimaxStrategy;
use crate::engines::engine_monte_carlo::MonteCarloStrategy;
use crate::engines::engine_shallow::{ShallowMode, ShallowStrategy};
use crate::engines::engine_trait::Strategy;
use crate::errors::{EngineError, EngineResult};
use crate::move_generation::move_generator::MoveOracle;
use crate::search::config_loader::TacticalConfigLoader;
use crate::search::tactical_config::TacticalConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmId {
    Random,
    Easy,
    Minimax,
    AlphaBeta,
    MonteCarlo,
    Hybrid,
    HybridHard,
}

impl AlgorithmId {
    pub const ALL: [AlgorithmId; 7] = [
        AlgorithmId::Random,
        AlgorithmId::Easy,
        AlgorithmId::Minimax,
        AlgorithmId::AlphaBeta,
        AlgorithmId::MonteCarlo,
        AlgorithmId::Hybrid,
        AlgorithmId::HybridHard,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            AlgorithmId::Random => "random",
            AlgorithmId::Easy => "easy",
            AlgorithmId::Minimax => "minimax",
            AlgorithmId::AlphaBeta => "alphabeta",
            AlgorithmId::MonteCarlo => "montecarlo",
            AlgorithmId::Hybrid => "hybrid",
            AlgorithmId::HybridHard => "hybrid-hard",
        }
    }

    /// Difficulty levels 1 (weakest) to 7.
    pub fn from_skill_level(level: u8) -> EngineResult<Self> {
        match level {
            1..=7 => Ok(Self::ALL[usize::from(level - 1)]),
            _ => Err(EngineError::UnknownAlgorithm(format!("skill level {level}"))),
        }
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlgorithmId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = match s.trim().to_ascii_lowercase().as_str() {
            "random" => AlgorithmId::Random,
            "easy" => AlgorithmId::Easy,
            "minimax" | "medium" => AlgorithmId::Minimax,
            "alphabeta" | "alpha-beta" | "hard" => AlgorithmId::AlphaBeta,
            "montecarlo" | "monte-carlo" | "mcts" => AlgorithmId::MonteCarlo,
            "hybrid" => AlgorithmId::Hybrid,
            "hybrid-hard" | "hybridhard" => AlgorithmId::HybridHard,
            _ => return Err(EngineError::UnknownAlgorithm(s.to_owned())),
        };
        Ok(id)
    }
}

/// Construct a fresh strategy for `id`.
pub fn build_strategy(
    id: AlgorithmId,
    oracle: Arc<dyn MoveOracle>,
    config: Arc<TacticalConfig>,
) -> Arc<dyn Strategy> {
    let name = id.as_str();
    match id {
        AlgorithmId::Random => Arc::new(ShallowStrategy::new(
            oracle,
            config,
            ShallowMode::WeightedRandom,
            name,
        )),
        AlgorithmId::Easy => Arc::new(ShallowStrategy::new(
            oracle,
            config,
            ShallowMode::Lookahead,
            name,
        )),
        AlgorithmId::Minimax => Arc::new(MinimaxStrategy::new(oracle, config, name)),
        AlgorithmId::AlphaBeta => Arc::new(IterativeStrategy::new(oracle, config, name)),
        AlgorithmId::MonteCarlo => Arc::new(MonteCarloStrategy::new(oracle, config, name)),
        AlgorithmId::Hybrid => Arc::new(HybridStrategy::new(
            oracle,
            config,
            HybridVariant::Soft,
            name,
        )),
        AlgorithmId::HybridHard => Arc::new(HybridStrategy::new(
            oracle,
            config,
            HybridVariant::Hard,
            name,
        )),
    }
}

pub struct StrategyFactory {
    oracle: Arc<dyn MoveOracle>,
    loader: Arc<TacticalConfigLoader>,
    preset: String,
    cache: Mutex<HashMap<AlgorithmId, Arc<dyn Strategy>>>,
}

impl StrategyFactory {
    pub fn new(
        oracle: Arc<dyn MoveOracle>,
        loader: Arc<TacticalConfigLoader>,
        preset: impl Into<String>,
    ) -> Self {
        Self {
            oracle,
            loader,
            preset: preset.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    #[inline]
    pub fn preset(&self) -> &str {
        &self.preset
    }

    #[inline]
    pub fn oracle(&self) -> &Arc<dyn MoveOracle> {
        &self.oracle
    }

    /// Cached strategy for a textual identifier.
    pub fn get_strategy(&self, algorithm: &str) -> EngineResult<Arc<dyn Strategy>> {
        let id = algorithm.parse::<AlgorithmId>()?;
        Ok(self.get(id))
    }

    /// Cached strategy for `id`, building it on first use.
    pub fn get(&self, id: AlgorithmId) -> Arc<dyn Strategy> {
        let mut cache = match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let strategy = cache.entry(id).or_insert_with(|| {
            debug!("Building '{}' strategy with preset '{}'", id, self.preset);
            let config = self.loader.load(&self.preset);
            build_strategy(id, Arc::clone(&self.oracle), config)
        });
        Arc::clone(strategy)
    }

    pub fn cached_count(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }
}
