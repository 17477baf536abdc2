//! Building blocks shared by every search strategy.
//!
//! - Priority rules that settle a move before any search runs.
//! - Root move ordering.
//! - Negamax leaf values, where decided games score at or beyond the win
//!   score and quicker wins score higher.

use std::sync::Arc;

use tracing::debug;

use crate::engines::engine_trait::{Decision, SearchContext, SearchResult};
use crate::engines::time_management::SearchClock;
use crate::errors::{EngineError, EngineResult};
use crate::game_state::game_state::GameState;
use crate::game_state::onitama_types::{CandidateMove, Player};
use crate::move_generation::legal_move_checks::{
    is_goal_arrival, is_master_capture, is_winning_move, master_attackers,
};
use crate::move_generation::move_generator::MoveOracle;
use crate::search::board_scoring::{BoardScorer, PositionEvaluator};
use crate::search::tactical_config::TacticalConfig;
use crate::search::telemetry::SearchPhase;

/// Window bound that no reachable score meets.
pub const SCORE_INFINITY: i32 = i32::MAX / 2;

/// Value of a non-terminal position whose side to move has no moves.
pub const DRAW_SCORE: i32 = 0;

/// Nodes between deadline checks inside recursive searches.
pub const CLOCK_CHECK_INTERVAL: u64 = 512;

/// A root move with its score from the searching player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedMove {
    pub mv: CandidateMove,
    pub score: i32,
}

/// Outcome of the priority rules for one root position.
#[derive(Debug, Clone, PartialEq)]
pub enum PriorityDecision {
    /// Play this move without searching.
    Immediate {
        mv: CandidateMove,
        decision: Decision,
    },
    /// The master is attacked; only these moves address the threat.
    Restricted(Vec<CandidateMove>),
    Open(Vec<CandidateMove>),
}

/// The oracle's moves for `player`, or `NoLegalMoves` when there are none.
pub fn legal_moves_for(
    oracle: &dyn MoveOracle,
    game_state: &GameState,
    player: Player,
) -> EngineResult<Vec<CandidateMove>> {
    let moves = oracle.legal_moves(game_state, player);
    if moves.is_empty() {
        return Err(EngineError::NoLegalMoves { player });
    }
    Ok(moves)
}

/// Master captures win outright and come first, then temple-arch arrivals.
/// With `honor_threats`, a threatened master restricts the candidates to
/// master moves and captures of an attacker, when any exist.
pub fn apply_priority_rules(
    game_state: &GameState,
    player: Player,
    moves: Vec<CandidateMove>,
    honor_threats: bool,
) -> PriorityDecision {
    if let Some(mv) = moves.iter().find(|m| is_master_capture(game_state, m)) {
        return PriorityDecision::Immediate {
            mv: *mv,
            decision: Decision::MasterCapture,
        };
    }
    if let Some(mv) = moves.iter().find(|m| is_goal_arrival(game_state, m)) {
        return PriorityDecision::Immediate {
            mv: *mv,
            decision: Decision::GoalArrival,
        };
    }
    if !honor_threats {
        return PriorityDecision::Open(moves);
    }

    let attackers = master_attackers(game_state, player);
    if attackers.is_empty() {
        return PriorityDecision::Open(moves);
    }
    let master = game_state.master_square(player);
    let answers: Vec<CandidateMove> = moves
        .iter()
        .copied()
        .filter(|m| Some(m.from) == master || attackers.contains(&m.to))
        .collect();
    if answers.is_empty() {
        PriorityDecision::Open(moves)
    } else {
        debug!(
            "{} master threatened by {} piece(s), {} answering move(s)",
            player.name(),
            attackers.len(),
            answers.len()
        );
        PriorityDecision::Restricted(answers)
    }
}

/// Candidates left for a strategy after the priority rules ran.
pub enum RootPlan {
    Decided(SearchResult),
    Search(Vec<CandidateMove>),
}

/// Fetch moves, run the priority rules, and wrap an immediate decision as a
/// finished result. Shared entry point of every strategy. `player` must be
/// the side to move: the shared card is oriented for it.
#[allow(clippy::too_many_arguments)]
pub fn plan_root(
    oracle: &Arc<dyn MoveOracle>,
    config: &Arc<TacticalConfig>,
    game_state: &GameState,
    player: Player,
    algorithm: &'static str,
    honor_threats: bool,
    clock: &SearchClock,
    ctx: &SearchContext<'_>,
) -> EngineResult<RootPlan> {
    if player != game_state.current_player {
        return Err(EngineError::InvalidState(format!(
            "{} asked to move but {} is to play",
            player.name(),
            game_state.current_player.name()
        )));
    }
    let moves = legal_moves_for(oracle.as_ref(), game_state, player)?;
    let moves = match apply_priority_rules(game_state, player, moves, honor_threats) {
        PriorityDecision::Immediate { mv, decision } => {
            let score = match decision {
                Decision::MasterCapture => config.terminal.master_capture_priority,
                _ => config.terminal.goal_arrival_priority,
            };
            let result = SearchResult {
                best_move: mv,
                score,
                depth: 1,
                nodes: 1,
                elapsed_ms: clock.elapsed_ms(),
                win_rate: None,
                decision,
                algorithm,
            };
            ctx.emit(result.progress_update(SearchPhase::Priority));
            return Ok(RootPlan::Decided(result));
        }
        PriorityDecision::Restricted(moves) | PriorityDecision::Open(moves) => moves,
    };

    if let [only] = moves.as_slice() {
        // Forced, but still report what the move leads to.
        let scorer = PositionEvaluator::new(Arc::clone(oracle), Arc::clone(config));
        let child = oracle.apply_move(game_state, only)?;
        let score = leaf_value(oracle.as_ref(), &scorer, &child, 0).map_or(DRAW_SCORE, |v| -v);
        return Ok(RootPlan::Decided(SearchResult {
            best_move: *only,
            score,
            depth: 0,
            nodes: 1,
            elapsed_ms: clock.elapsed_ms(),
            win_rate: None,
            decision: Decision::OnlyMove,
            algorithm,
        }));
    }
    Ok(RootPlan::Search(moves))
}

/// Winning moves, then captures, then moves landing nearer the centre.
/// Stable, so oracle order breaks remaining ties.
pub fn order_moves(game_state: &GameState, moves: &mut [CandidateMove]) {
    moves.sort_by_key(|mv| {
        (
            u8::from(!is_winning_move(game_state, mv)),
            u8::from(!mv.captures),
            mv.to.center_distance(),
        )
    });
}

/// Negamax value of `game_state` for its side to move when it is a leaf:
/// decided games score `win + depth` (so faster wins rank higher), and
/// depth-zero nodes take the heuristic score. `None` means expand the node.
pub fn leaf_value<S: BoardScorer + ?Sized>(
    oracle: &dyn MoveOracle,
    scorer: &S,
    game_state: &GameState,
    depth: u8,
) -> Option<i32> {
    let side = game_state.current_player;
    if oracle.is_terminal(game_state) {
        let win = scorer.win_score() + i32::from(depth);
        return Some(match oracle.winner(game_state) {
            Some(w) if w == side => win,
            Some(_) => -win,
            None => DRAW_SCORE,
        });
    }
    if depth == 0 {
        return Some(scorer.score(game_state, side));
    }
    None
}

/// Static one-ply ranking of `moves` for `player`, best first.
pub fn static_ranking<S: BoardScorer + ?Sized>(
    oracle: &dyn MoveOracle,
    scorer: &S,
    game_state: &GameState,
    player: Player,
    moves: &[CandidateMove],
) -> EngineResult<Vec<RankedMove>> {
    let mut ranked = Vec::with_capacity(moves.len());
    for mv in moves {
        let child = oracle.apply_move(game_state, mv)?;
        let score = match leaf_value(oracle, scorer, &child, 0) {
            Some(v) if child.current_player == player => v,
            Some(v) => -v,
            None => DRAW_SCORE,
        };
        ranked.push(RankedMove { mv: *mv, score });
    }
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    Ok(ranked)
}

#[inline]
pub fn is_decisive(score: i32, win_score: i32) -> bool {
    score.abs() >= win_score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::onitama_types::{Affiliation, Piece, PieceRole, Square};
    use crate::move_generation::legal_move_generator::{generate_moves, StandardRules};
    use crate::move_generation::move_generator::NullMoveOracle;
    use crate::search::telemetry::ProgressChannel;
    use std::time::Duration;

    fn bare(to_move: Player) -> GameState {
        GameState::empty_with_card_names(["Tiger", "Crab"], ["Ox", "Boar"], "Horse", to_move)
            .expect("cards exist")
    }

    #[test]
    fn empty_oracle_reports_no_legal_moves() {
        let game = GameState::new_game();
        let err = legal_moves_for(&NullMoveOracle, &game, Player::Red).unwrap_err();
        assert!(matches!(err, EngineError::NoLegalMoves { player: Player::Red }));
    }

    fn plan(game: &GameState, player: Player) -> EngineResult<RootPlan> {
        let oracle: Arc<dyn MoveOracle> = Arc::new(StandardRules);
        let config = Arc::new(TacticalConfig::default());
        let progress = ProgressChannel::default();
        let ctx = SearchContext::seeded(0, &progress);
        let clock = SearchClock::start(Duration::from_secs(5));
        plan_root(&oracle, &config, game, player, "test", true, &clock, &ctx)
    }

    #[test]
    fn planning_for_the_side_not_to_move_is_rejected() {
        let game = GameState::new_game();
        assert!(matches!(
            plan(&game, Player::Blue),
            Err(EngineError::InvalidState(_))
        ));
        assert!(matches!(plan(&game, Player::Red), Ok(RootPlan::Search(_))));
    }

    #[test]
    fn only_move_reports_its_static_score() {
        let mut game = GameState::empty_with_card_names(
            ["Tiger", "Boar"],
            ["Ox", "Horse"],
            "Crab",
            Player::Red,
        )
        .expect("cards exist");
        // Tiger's back step is blocked and Boar can only step right.
        game.place(Square::new(0, 0), Piece::master(Player::Red));
        game.place(
            Square::new(1, 0),
            Piece {
                affiliation: Affiliation::Neutral,
                role: PieceRole::Student,
            },
        );
        game.place(Square::new(4, 4), Piece::master(Player::Blue));
        game.place(Square::new(4, 3), Piece::student(Player::Blue));
        assert_eq!(generate_moves(&game, Player::Red).len(), 1);

        let Ok(RootPlan::Decided(result)) = plan(&game, Player::Red) else {
            panic!("a single legal move is decided without search");
        };
        assert_eq!(result.decision, Decision::OnlyMove);
        assert_eq!(result.best_move.to, Square::new(0, 1));
        assert_eq!(result.nodes, 1);

        let eval =
            PositionEvaluator::new(Arc::new(StandardRules), Arc::new(TacticalConfig::default()));
        let child = StandardRules
            .apply_move(&game, &result.best_move)
            .expect("move applies");
        assert_eq!(result.score, eval.score(&child, Player::Red));
        // Blue keeps an extra student, so the forced move is not neutral.
        assert!(result.score < 0);
    }

    #[test]
    fn master_capture_beats_goal_arrival() {
        let mut game = bare(Player::Red);
        // Tiger jumps two rows: the Red master at (2,2) can reach the arch at
        // (0,2) and the student at (3,0) can take Blue's master at (1,0).
        game.place(Square::new(2, 2), Piece::master(Player::Red));
        game.place(Square::new(3, 0), Piece::student(Player::Red));
        game.place(Square::new(1, 0), Piece::master(Player::Blue));
        let moves = generate_moves(&game, Player::Red);
        assert!(moves.iter().any(|m| is_goal_arrival(&game, m)));
        assert!(moves.iter().any(|m| is_master_capture(&game, m)));

        match apply_priority_rules(&game, Player::Red, moves, true) {
            PriorityDecision::Immediate { mv, decision } => {
                assert_eq!(decision, Decision::MasterCapture);
                assert_eq!(mv.to, Square::new(1, 0));
            }
            other => panic!("expected immediate capture, got {other:?}"),
        }
    }

    #[test]
    fn goal_arrival_is_taken_when_no_capture_exists() {
        let mut game = bare(Player::Red);
        game.place(Square::new(2, 2), Piece::master(Player::Red));
        game.place(Square::new(1, 4), Piece::master(Player::Blue));
        let moves = generate_moves(&game, Player::Red);
        match apply_priority_rules(&game, Player::Red, moves, false) {
            PriorityDecision::Immediate { mv, decision } => {
                assert_eq!(decision, Decision::GoalArrival);
                assert_eq!(mv.to, Square::new(0, 2));
            }
            other => panic!("expected goal arrival, got {other:?}"),
        }
    }

    #[test]
    fn threatened_master_restricts_candidates() {
        let mut game = bare(Player::Red);
        game.place(Square::new(4, 2), Piece::master(Player::Red));
        game.place(Square::new(4, 0), Piece::student(Player::Red));
        game.place(Square::new(0, 0), Piece::master(Player::Blue));
        // Blue's rotated Ox/Boar step one row toward Red onto the master.
        game.place(Square::new(3, 2), Piece::student(Player::Blue));
        let moves = generate_moves(&game, Player::Red);
        let attackers = master_attackers(&game, Player::Red);
        assert_eq!(attackers, vec![Square::new(3, 2)]);

        match apply_priority_rules(&game, Player::Red, moves.clone(), true) {
            PriorityDecision::Restricted(answers) => {
                assert!(!answers.is_empty());
                assert!(answers.len() < moves.len());
                assert!(answers
                    .iter()
                    .all(|m| m.from == Square::new(4, 2) || m.to == Square::new(3, 2)));
            }
            other => panic!("expected restriction, got {other:?}"),
        }
        assert!(matches!(
            apply_priority_rules(&game, Player::Red, moves, false),
            PriorityDecision::Open(_)
        ));
    }

    #[test]
    fn ordering_puts_captures_first() {
        let mut game = bare(Player::Red);
        game.place(Square::new(4, 2), Piece::master(Player::Red));
        game.place(Square::new(3, 0), Piece::student(Player::Red));
        game.place(Square::new(0, 4), Piece::master(Player::Blue));
        game.place(Square::new(2, 0), Piece::student(Player::Blue));
        let mut moves = generate_moves(&game, Player::Red);
        order_moves(&game, &mut moves);
        assert!(moves[0].captures);
        let first_quiet = moves.iter().position(|m| !m.captures).expect("quiet moves");
        assert!(moves[first_quiet..].iter().all(|m| !m.captures));
    }

    #[test]
    fn leaf_value_prefers_quicker_wins() {
        let scorer = crate::search::board_scoring::PositionEvaluator::new(
            std::sync::Arc::new(StandardRules),
            std::sync::Arc::new(TacticalConfig::default()),
        );
        let mut game = bare(Player::Blue);
        game.place(Square::new(4, 2), Piece::master(Player::Red));
        // Blue to move with no master: Red has won.
        let shallow = leaf_value(&StandardRules, &scorer, &game, 1).expect("terminal");
        let deep = leaf_value(&StandardRules, &scorer, &game, 3).expect("terminal");
        assert!(shallow <= -scorer.win_score());
        assert!(deep < shallow);
        assert!(leaf_value(&StandardRules, &scorer, &GameState::new_game(), 2).is_none());
    }
}
