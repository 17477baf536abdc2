//! Iterative deepening search with negamax alpha-beta pruning.
//!
//! Each iteration searches every root move one ply deeper than the last and
//! replaces the ranking only when it completes, so an expired clock always
//! leaves the deepest finished ranking behind. Depth 1 ignores the clock:
//! every candidate gets at least a static score.

use crate::engines::time_management::SearchClock;
use crate::errors::EngineResult;
use crate::game_state::game_state::GameState;
use crate::game_state::onitama_types::CandidateMove;
use crate::move_generation::move_generator::MoveOracle;
use crate::search::board_scoring::BoardScorer;
use crate::search::search_shared::{
    is_decisive, leaf_value, order_moves, RankedMove, CLOCK_CHECK_INTERVAL, DRAW_SCORE,
    SCORE_INFINITY,
};

#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    pub max_depth: u8,
    /// Search every root move with a full window. Slower, but every ranked
    /// score is exact rather than an upper bound for non-best moves.
    pub exact_root_scores: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            exact_root_scores: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeepeningOutcome {
    /// Root moves from the deepest completed iteration, best first.
    pub ranked: Vec<RankedMove>,
    pub reached_depth: u8,
    pub nodes: u64,
    /// The best score proves a win or a loss; deeper search cannot change it.
    pub decisive: bool,
}

impl DeepeningOutcome {
    #[inline]
    pub fn best(&self) -> Option<&RankedMove> {
        self.ranked.first()
    }
}

pub fn iterative_deepening_search<S, F>(
    oracle: &dyn MoveOracle,
    scorer: &S,
    game_state: &GameState,
    moves: &[CandidateMove],
    config: SearchConfig,
    clock: &SearchClock,
    mut on_iteration: F,
) -> EngineResult<DeepeningOutcome>
where
    S: BoardScorer + ?Sized,
    F: FnMut(&DeepeningOutcome),
{
    let mut ordered = moves.to_vec();
    order_moves(game_state, &mut ordered);
    let mut children = Vec::with_capacity(ordered.len());
    for mv in ordered {
        children.push((mv, oracle.apply_move(game_state, &mv)?));
    }

    let mut outcome = DeepeningOutcome::default();
    for depth in 1..=config.max_depth.max(1) {
        let enforce_deadline = depth > 1;
        if enforce_deadline && clock.expired() {
            break;
        }

        let Some(ranked) = search_root(
            oracle,
            scorer,
            &children,
            depth,
            config.exact_root_scores,
            enforce_deadline,
            &mut outcome.nodes,
            clock,
        )?
        else {
            break;
        };

        // Next iteration tries the previous best first.
        children.sort_by_key(|(mv, _)| ranked.iter().position(|r| r.mv == *mv));
        outcome.ranked = ranked;
        outcome.reached_depth = depth;
        outcome.decisive = outcome
            .best()
            .is_some_and(|best| is_decisive(best.score, scorer.win_score()));
        on_iteration(&outcome);

        if outcome.decisive {
            break;
        }
    }

    Ok(outcome)
}

#[allow(clippy::too_many_arguments)]
fn search_root<S: BoardScorer + ?Sized>(
    oracle: &dyn MoveOracle,
    scorer: &S,
    children: &[(CandidateMove, GameState)],
    depth: u8,
    exact: bool,
    enforce_deadline: bool,
    nodes: &mut u64,
    clock: &SearchClock,
) -> EngineResult<Option<Vec<RankedMove>>> {
    let mut alpha = -SCORE_INFINITY;
    let mut ranked = Vec::with_capacity(children.len());

    for (mv, child) in children {
        if enforce_deadline && clock.expired() {
            return Ok(None);
        }
        let lower = if exact { -SCORE_INFINITY } else { alpha };
        let Some(value) = alpha_beta(
            oracle,
            scorer,
            child,
            depth - 1,
            -SCORE_INFINITY,
            -lower,
            nodes,
            clock,
        )?
        else {
            return Ok(None);
        };

        let score = -value;
        alpha = alpha.max(score);
        ranked.push(RankedMove { mv: *mv, score });
    }

    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    Ok(Some(ranked))
}

/// Fail-soft alpha-beta value of `game_state` for its side to move.
/// `Ok(None)` when the clock ran out mid-search.
#[allow(clippy::too_many_arguments)]
pub fn alpha_beta<S: BoardScorer + ?Sized>(
    oracle: &dyn MoveOracle,
    scorer: &S,
    game_state: &GameState,
    depth: u8,
    mut alpha: i32,
    beta: i32,
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

    let mut moves = oracle.legal_moves(game_state, game_state.current_player);
    if moves.is_empty() {
        return Ok(Some(DRAW_SCORE));
    }
    order_moves(game_state, &mut moves);

    let mut best = -SCORE_INFINITY;
    for mv in &moves {
        let child = oracle.apply_move(game_state, mv)?;
        let Some(value) = alpha_beta(
            oracle,
            scorer,
            &child,
            depth - 1,
            -beta,
            -alpha,
            nodes,
            clock,
        )?
        else {
            return Ok(None);
        };

        let score = -value;
        if score > best {
            best = score;
        }
        if best > alpha {
            alpha = best;
        }
        if alpha >= beta {
            break;
        }
    }
    Ok(Some(best))
}
