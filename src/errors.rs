//! Error types for the rules layer, strategies, and config loading.

use crate::game_state::onitama_types::Player;

pub type EngineResult<T> = Result<T, EngineError>;

/// Failures surfaced by the rules layer, the strategies, and the selector.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The side to search has nothing to play.
    #[error("no legal moves available for {}", .player.name())]
    NoLegalMoves { player: Player },

    #[error("unknown algorithm identifier: {0}")]
    UnknownAlgorithm(String),

    #[error("invalid move: {0}")]
    InvalidMove(String),

    #[error("invalid game state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failures while fetching, parsing, or validating a tuning preset.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config source failed for preset {name}: {message}")]
    Source { name: String, message: String },

    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("config validation failed: {0}")]
    Validation(String),
}
