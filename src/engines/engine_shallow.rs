//! Low-strength strategies for the easiest difficulty levels.
//!
//! `WeightedRandom` samples a move with capture-heavy weights. `Lookahead`
//! scores each move by its replies, blending the worst reply with the mean
//! reply so it plays plausibly rather than perfectly.

use std::sync::Arc;

use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::debug;

use crate::engines::engine_trait::{Decision, SearchContext, SearchResult, Strategy};
use crate::engines::time_management::SearchClock;
use crate::errors::EngineResult;
use crate::game_state::game_state::GameState;
use crate::game_state::onitama_rules::home_row;
use crate::game_state::onitama_types::{CandidateMove, Player};
use crate::move_generation::legal_move_checks::is_master_threatened;
use crate::move_generation::move_generator::MoveOracle;
use crate::search::board_scoring::{BoardScorer, PositionEvaluator};
use crate::search::search_shared::{plan_root, RootPlan};
use crate::search::tactical_config::TacticalConfig;
use crate::search::telemetry::SearchPhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShallowMode {
    WeightedRandom,
    Lookahead,
}

pub struct ShallowStrategy {
    oracle: Arc<dyn MoveOracle>,
    config: Arc<TacticalConfig>,
    mode: ShallowMode,
    name: &'static str,
}

impl ShallowStrategy {
    pub fn new(
        oracle: Arc<dyn MoveOracle>,
        config: Arc<TacticalConfig>,
        mode: ShallowMode,
        name: &'static str,
    ) -> Self {
        Self {
            oracle,
            config,
            mode,
            name,
        }
    }

    /// Sampling weight of one move; always positive.
    fn move_weight(&self, game_state: &GameState, player: Player, mv: &CandidateMove) -> f64 {
        let w = &self.config.move_weights;
        let mut weight = w.base;
        if mv.captures {
            weight *= w.capture;
        }
        // Forward means away from one's own home row.
        let home = home_row(player);
        if mv.to.row.abs_diff(home) > mv.from.row.abs_diff(home) {
            weight *= w.advance;
        }
        if mv.to.center_distance() < mv.from.center_distance() {
            weight *= w.center;
        }
        let moves_master = game_state.piece_at(mv.from).is_some_and(|p| p.is_master());
        if moves_master && !is_master_threatened(game_state, player) {
            weight *= w.master_move_penalty;
        }
        weight
    }

    fn pick_weighted<R: Rng + ?Sized>(
        &self,
        game_state: &GameState,
        player: Player,
        moves: &[CandidateMove],
        rng: &mut R,
    ) -> Option<CandidateMove> {
        moves
            .choose_weighted(rng, |mv| self.move_weight(game_state, player, mv))
            .ok()
            .copied()
            .or_else(|| moves.choose(rng).copied())
    }

    /// Blended reply score of `mv` for `player`, or its static score when
    /// searching one ply or when the opponent has no reply.
    fn lookahead_score(
        &self,
        scorer: &PositionEvaluator,
        game_state: &GameState,
        player: Player,
        mv: &CandidateMove,
        nodes: &mut u64,
    ) -> EngineResult<i32> {
        let child = self.oracle.apply_move(game_state, mv)?;
        *nodes += 1;
        let static_score = scorer.score(&child, player);
        if self.config.search.shallow_depth < 2 || self.oracle.is_terminal(&child) {
            return Ok(static_score);
        }

        let replies = self.oracle.legal_moves(&child, player.opponent());
        if replies.is_empty() {
            return Ok(static_score);
        }
        let mut worst = i32::MAX;
        let mut total = 0i64;
        for reply in &replies {
            let grandchild = self.oracle.apply_move(&child, reply)?;
            *nodes += 1;
            let s = scorer.score(&grandchild, player);
            worst = worst.min(s);
            total += i64::from(s);
        }
        let mean = total as f64 / replies.len() as f64;
        let blend = &self.config.expectimax;
        let blended = blend.minimax_weight * f64::from(worst) + blend.expectation_weight * mean;
        Ok(blended.round() as i32)
    }
}

impl Strategy for ShallowStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn find_best_move(
        &self,
        game_state: &GameState,
        player: Player,
        ctx: &mut SearchContext<'_>,
    ) -> EngineResult<SearchResult> {
        let clock = SearchClock::start_ms(self.config.search.shallow_time_ms);
        let honor_threats = self.mode == ShallowMode::Lookahead;
        let moves = match plan_root(
            &self.oracle,
            &self.config,
            game_state,
            player,
            self.name,
            honor_threats,
            &clock,
            ctx,
        )? {
            RootPlan::Decided(result) => return Ok(result),
            RootPlan::Search(moves) => moves,
        };

        let scorer = PositionEvaluator::new(Arc::clone(&self.oracle), Arc::clone(&self.config))
            .with_salt(ctx.rng.random());
        let mut nodes = 0u64;

        let (best_move, score, depth) = match self.mode {
            ShallowMode::WeightedRandom => {
                let picked = self
                    .pick_weighted(game_state, player, &moves, &mut ctx.rng)
                    .unwrap_or(moves[0]);
                let child = self.oracle.apply_move(game_state, &picked)?;
                nodes += 1;
                (picked, scorer.score(&child, player), 1)
            }
            ShallowMode::Lookahead => {
                let mut best_score = i32::MIN;
                let mut tied: Vec<CandidateMove> = Vec::new();
                for mv in &moves {
                    if !tied.is_empty() && clock.expired() {
                        break;
                    }
                    let s = self.lookahead_score(&scorer, game_state, player, mv, &mut nodes)?;
                    if s > best_score {
                        best_score = s;
                        tied.clear();
                        tied.push(*mv);
                    } else if s == best_score {
                        tied.push(*mv);
                    }
                }
                let picked = tied.choose(&mut ctx.rng).copied().unwrap_or(moves[0]);
                (picked, best_score, self.config.search.shallow_depth.min(2))
            }
        };

        let result = SearchResult {
            best_move,
            score,
            depth,
            nodes,
            elapsed_ms: clock.elapsed_ms(),
            win_rate: None,
            decision: Decision::Search,
            algorithm: self.name,
        };

        ctx.emit(result.progress_update(SearchPhase::Shallow));

        debug!(
            "{} picked {:?} score {} after {} nodes",
            self.name, result.best_move, result.score, result.nodes
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EngineError;
    use crate::game_state::onitama_types::{Piece, Square};
    use crate::move_generation::legal_move_generator::{generate_moves, StandardRules};
    use crate::move_generation::move_generator::NullMoveOracle;
    use crate::search::telemetry::ProgressChannel;

    fn strategy(mode: ShallowMode) -> ShallowStrategy {
        ShallowStrategy::new(
            Arc::new(StandardRules),
            Arc::new(TacticalConfig::default()),
            mode,
            "test-shallow",
        )
    }

    #[test]
    fn both_modes_return_a_legal_move() {
        let game = GameState::new_game();
        let legal = generate_moves(&game, Player::Red);
        let progress = ProgressChannel::default();
        for mode in [ShallowMode::WeightedRandom, ShallowMode::Lookahead] {
            for seed in 0..8 {
                let mut ctx = SearchContext::seeded(seed, &progress);
                let result = strategy(mode)
                    .find_best_move(&game, Player::Red, &mut ctx)
                    .expect("search succeeds");
                assert!(legal.contains(&result.best_move));
            }
        }
    }

    #[test]
    fn weighted_random_still_takes_the_master() {
        let mut game = GameState::empty_with_card_names(
            ["Tiger", "Crab"],
            ["Ox", "Boar"],
            "Horse",
            Player::Red,
        )
        .expect("cards exist");
        game.place(Square::new(4, 2), Piece::master(Player::Red));
        game.place(Square::new(4, 4), Piece::student(Player::Red));
        game.place(Square::new(2, 4), Piece::master(Player::Blue));
        let progress = ProgressChannel::default();
        let mut ctx = SearchContext::seeded(1, &progress);
        let result = strategy(ShallowMode::WeightedRandom)
            .find_best_move(&game, Player::Red, &mut ctx)
            .expect("search succeeds");
        assert_eq!(result.decision, Decision::MasterCapture);
        assert_eq!(result.best_move.to, Square::new(2, 4));
    }

    #[test]
    fn lookahead_avoids_hanging_its_master() {
        // Stepping forward with Crab puts the master beside Blue's student,
        // which Blue's Boar can then take.
        let mut game = GameState::empty_with_card_names(
            ["Crab", "Horse"],
            ["Ox", "Boar"],
            "Tiger",
            Player::Red,
        )
        .expect("cards exist");
        game.place(Square::new(4, 2), Piece::master(Player::Red));
        game.place(Square::new(3, 3), Piece::student(Player::Blue));
        game.place(Square::new(0, 0), Piece::master(Player::Blue));
        let progress = ProgressChannel::default();
        let mut ctx = SearchContext::seeded(3, &progress);
        let result = strategy(ShallowMode::Lookahead)
            .find_best_move(&game, Player::Red, &mut ctx)
            .expect("search succeeds");
        assert_ne!(result.best_move.to, Square::new(3, 2));
    }

    #[test]
    fn no_moves_is_an_error() {
        let strategy = ShallowStrategy::new(
            Arc::new(NullMoveOracle),
            Arc::new(TacticalConfig::default()),
            ShallowMode::Lookahead,
            "test-shallow",
        );
        let progress = ProgressChannel::default();
        let mut ctx = SearchContext::seeded(0, &progress);
        let err = strategy
            .find_best_move(&GameState::new_game(), Player::Red, &mut ctx)
            .unwrap_err();
        assert!(matches!(err, EngineError::NoLegalMoves { .. }));
    }
}
