//! Fixed-depth minimax without pruning.
//!
//! Written in negamax form: every node maximizes for its side to move and
//! child values are negated on the way up. Slow, but a full-width reference
//! the pruned search must agree with.

use crate::engines::time_management::SearchClock;
use crate::errors::EngineResult;
use crate::game_state::game_state::GameState;
use crate::game_state::onitama_types::CandidateMove;
use crate::move_generation::move_generator::MoveOracle;
use crate::search::board_scoring::BoardScorer;
use crate::search::search_shared::{
    leaf_value, RankedMove, CLOCK_CHECK_INTERVAL, DRAW_SCORE, SCORE_INFINITY,
};

/// Value of `game_state` for its side to move, searched `depth` plies.
/// `Ok(None)` when the clock ran out mid-search.
pub fn minimax<S: BoardScorer + ?Sized>(
    oracle: &dyn MoveOracle,
    scorer: &S,
    game_state: &GameState,
    depth: u8,
    nodes: &mut u64,
    clock: &SearchClock,
) -> EngineResult<Option<i32>> {
    *nodes += 1;
    if *nodes % CLOCK_CHECK_INTERVAL == 0 && clock.expired() {
        return Ok(None);
    }
    if let Some(value) = leaf_value(oracle, scorer, game_state, depth) {
        return Ok(Some(value));
    }

    let moves = oracle.legal_moves(game_state, game_state.current_player);
    if moves.is_empty() {
        return Ok(Some(DRAW_SCORE));
    }

    let mut best = -SCORE_INFINITY;
    for mv in &moves {
        let child = oracle.apply_move(game_state, mv)?;
        let Some(value) = minimax(oracle, scorer, &child, depth - 1, nodes, clock)? else {
            return Ok(None);
        };
        best = best.max(-value);
    }
    Ok(Some(best))
}

#[derive(Debug, Clone, Default)]
pub struct MinimaxOutcome {
    /// Fully searched root moves, best first.
    pub ranked: Vec<RankedMove>,
    /// Every root move finished before the deadline.
    pub completed: bool,
    pub nodes: u64,
}

/// Search each root move to `depth` plies in turn. Root moves not reached
/// before the deadline are left out of the ranking. `on_improve` fires when a
/// new best root move is found.
pub fn minimax_root<S, F>(
    oracle: &dyn MoveOracle,
    scorer: &S,
    game_state: &GameState,
    moves: &[CandidateMove],
    depth: u8,
    clock: &SearchClock,
    mut on_improve: F,
) -> EngineResult<MinimaxOutcome>
where
    S: BoardScorer + ?Sized,
    F: FnMut(&RankedMove, u64),
{
    let mut outcome = MinimaxOutcome {
        completed: true,
        ..MinimaxOutcome::default()
    };
    let mut best = -SCORE_INFINITY;

    for mv in moves {
        if clock.expired() {
            outcome.completed = false;
            break;
        }
        let child = oracle.apply_move(game_state, mv)?;
        let searched = minimax(
            oracle,
            scorer,
            &child,
            depth.saturating_sub(1),
            &mut outcome.nodes,
            clock,
        )?;
        let Some(value) = searched else {
            outcome.completed = false;
            break;
        };

        let ranked = RankedMove {
            mv: *mv,
            score: -value,
        };
        if ranked.score > best {
            best = ranked.score;
            on_improve(&ranked, outcome.nodes);
        }
        outcome.ranked.push(ranked);
    }

    outcome.ranked.sort_by(|a, b| b.score.cmp(&a.score));
    Ok(outcome)
}
