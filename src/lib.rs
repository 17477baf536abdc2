//! Crate root module declarations for the Onitama engine project.
//!
//! This file exposes all top-level subsystems (game state, move generation,
//! search, engines, and utility helpers) so binaries, tests, and external
//! tooling can import stable module paths.

pub mod errors;

pub mod game_state {
    pub mod game_state;
    pub mod move_cards;
    pub mod onitama_rules;
    pub mod onitama_types;
}

pub mod move_generation {
    pub mod legal_move_apply;
    pub mod legal_move_checks;
    pub mod legal_move_generator;
    pub mod move_generator;
    pub mod perft;
}

pub mod search {
    pub mod board_scoring;
    pub mod config_loader;
    pub mod iterative_deepening;
    pub mod minimax;
    pub mod monte_carlo;
    pub mod search_shared;
    pub mod tactical_config;
    pub mod telemetry;
}

pub mod engines {
    pub mod engine_factory;
    pub mod engine_hybrid;
    pub mod engine_iterative;
    pub mod engine_minimax;
    pub mod engine_monte_carlo;
    pub mod engine_service;
    pub mod engine_shallow;
    pub mod engine_trait;
    pub mod time_management;
}

pub mod utils {
    pub mod engine_match_harness;
    pub mod move_notation;
    pub mod render_game_state;
}
