//! Main negamax search: plain alpha-beta or PVS, selected by
//! `Config::strategy`, with transposition-table probing/storing and
//! optional extensions/reductions.
//!
//! Cancellation mirrors the source's `TerminatedSearch` idiom but
//! without background threads: `SearchResult<T> = Result<T, Aborted>`
//! is propagated with `?` through every recursive frame, and the
//! caller (the iterative-deepening loop) is the only place that
//! catches it.

use crate::basetypes::{Depth, Value, VALUE_MATERIAL_END};
use crate::context::{SearchContext, SearchResult};
use crate::engine::Strategy;
use crate::eval;
use crate::movegen;
use crate::moves::Move;
use crate::ordering;
use crate::position::Position;
use crate::quiescence::quiescence;
use crate::tt::Bound;

const NULL_MOVE_MIN_DEPTH: Depth = 3;
const NULL_MOVE_REDUCTION: Depth = 2;
const LMR_MIN_DEPTH: Depth = 3;
const LMR_MOVE_THRESHOLD: usize = 3;

/// `search(pos, depth, alpha, beta, pv_node) -> score`, from the
/// perspective of the side to move (negamax framing: a child's score
/// is negated before being compared against the parent's window).
pub fn search(
    pos: &Position,
    depth: Depth,
    mut alpha: Value,
    beta: Value,
    pv_node: bool,
    ply: usize,
    pv_move: Option<Move>,
    ctx: &mut SearchContext,
) -> SearchResult<Value> {
    ctx.check_abort()?;
    ctx.nodes += 1;

    let original_alpha = alpha;
    let hash = pos.hash();

    let mut hash_move = None;
    if let Some(probe) = ctx.tt.probe(hash) {
        ctx.tt_hits += 1;
        hash_move = probe.best_move;
        if probe.depth >= depth {
            match probe.bound {
                Bound::Exact => return Ok(probe.score),
                Bound::Lower if probe.score >= beta => return Ok(probe.score),
                Bound::Upper if probe.score <= alpha => return Ok(probe.score),
                _ => {}
            }
        }
    } else {
        ctx.tt_misses += 1;
    }

    if let Some(winner) = pos.winner() {
        let score = if winner == pos.side_to_move() {
            VALUE_MATERIAL_END + depth.max(0) as Value
        } else {
            -(VALUE_MATERIAL_END + depth.max(0) as Value)
        };
        return Ok(score);
    }

    if depth <= 0 {
        return leaf_score(pos, alpha, beta, ctx);
    }

    if let Some(score) = try_null_move(pos, depth, beta, pv_node, ply, ctx)? {
        return Ok(score);
    }

    let mut moves = movegen::generate(pos);
    if moves.is_empty() {
        return Ok(-(VALUE_MATERIAL_END + depth as Value));
    }

    ordering::order(
        &mut moves,
        pos,
        ply,
        hash_move,
        pv_move,
        &ctx.killers,
        &ctx.history,
    );

    let use_pvs = matches!(ctx.config.strategy, Strategy::Pvs | Strategy::PvsQuiescence);
    let mut best_score = Value::MIN + 1;
    let mut best_move = None;
    let mut move_index = 0;

    while let Some(mv) = moves.take_best() {
        if ply == 0 {
            ctx.poll_root()?;
        }
        let is_quiet = !movegen::is_capture(pos, mv);
        let mut child = *pos;
        child.apply_move(mv);

        let lmr_enabled = ctx.config.late_move_reductions;
        let score = if move_index == 0 {
            -search(&child, depth - 1, -beta, -alpha, pv_node, ply + 1, None, ctx)?
        } else if use_pvs {
            let reduced_depth = reduction(depth, move_index, is_quiet, pv_node, lmr_enabled);
            let mut s = -search(&child, depth - 1 - reduced_depth, -alpha - 1, -alpha, false, ply + 1, None, ctx)?;
            if s > alpha && (reduced_depth > 0 || s < beta) {
                s = -search(&child, depth - 1, -beta, -alpha, pv_node, ply + 1, None, ctx)?;
            }
            s
        } else {
            let reduced_depth = reduction(depth, move_index, is_quiet, pv_node, lmr_enabled);
            let mut s = -search(&child, depth - 1 - reduced_depth, -beta, -alpha, false, ply + 1, None, ctx)?;
            if reduced_depth > 0 && s > alpha {
                s = -search(&child, depth - 1, -beta, -alpha, false, ply + 1, None, ctx)?;
            }
            s
        };

        move_index += 1;

        if score > best_score {
            best_score = score;
            best_move = Some(mv);
        }
        if score > alpha {
            alpha = score;
        }
        if alpha >= beta {
            ctx.record_cutoff(mv, ply, depth, is_quiet);
            break;
        }
    }

    let bound = if best_score <= original_alpha {
        Bound::Upper
    } else if best_score >= beta {
        Bound::Lower
    } else {
        Bound::Exact
    };
    ctx.tt.store(hash, best_score, depth, bound, best_move);
    Ok(best_score)
}

fn leaf_score(pos: &Position, alpha: Value, beta: Value, ctx: &mut SearchContext) -> SearchResult<Value> {
    let use_quiescence = matches!(
        ctx.config.strategy,
        Strategy::AlphaBetaQuiescence | Strategy::PvsQuiescence
    );
    if use_quiescence {
        quiescence(pos, alpha, beta, 0, ctx)
    } else {
        Ok(eval::evaluate_relative(pos, 0))
    }
}

fn try_null_move(
    pos: &Position,
    depth: Depth,
    beta: Value,
    pv_node: bool,
    ply: usize,
    ctx: &mut SearchContext,
) -> SearchResult<Option<Value>> {
    if !ctx.config.null_move_pruning || pv_node || depth < NULL_MOVE_MIN_DEPTH {
        return Ok(None);
    }
    let side = pos.side_to_move();
    if pos.towers(side) == 0 {
        // No material to spare: avoid null-move zugzwang blindness.
        return Ok(None);
    }
    if movegen::guard_is_attacked(pos, side) {
        return Ok(None);
    }
    let child = pos.null_move();
    let score = -search(
        &child,
        depth - 1 - NULL_MOVE_REDUCTION,
        -beta,
        -beta + 1,
        false,
        ply + 1,
        None,
        ctx,
    )?;
    if score >= beta {
        Ok(Some(beta))
    } else {
        Ok(None)
    }
}

fn reduction(depth: Depth, move_index: usize, is_quiet: bool, pv_node: bool, enabled: bool) -> Depth {
    if !enabled || pv_node || !is_quiet || depth < LMR_MIN_DEPTH || move_index < LMR_MOVE_THRESHOLD {
        return 0;
    }
    1
}

/// Naive full-width minimax, used only by equivalence tests against
/// `search` on small sample positions.
#[cfg(test)]
pub fn naive_minimax(pos: &Position, depth: Depth) -> Value {
    if let Some(winner) = pos.winner() {
        return if winner == pos.side_to_move() {
            VALUE_MATERIAL_END + depth.max(0) as Value
        } else {
            -(VALUE_MATERIAL_END + depth.max(0) as Value)
        };
    }
    if depth <= 0 {
        return eval::evaluate_relative(pos, 0);
    }
    let mut moves = movegen::generate(pos);
    if moves.is_empty() {
        return -(VALUE_MATERIAL_END + depth as Value);
    }
    let mut best = Value::MIN + 1;
    while let Some(mv) = moves.take_best() {
        let mut child = *pos;
        child.apply_move(mv);
        let score = -naive_minimax(&child, depth - 1);
        if score > best {
            best = score;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SearchContext;
    use crate::engine::Config;
    use crate::fen::from_fen;
    use crate::tt::TranspositionTable;
    use std::time::{Duration, Instant};

    fn run(pos: &Position, depth: Depth, config: &Config) -> Value {
        let mut tt = TranspositionTable::new(1024);
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut ctx = SearchContext::new(&mut tt, config, deadline);
        search(pos, depth, Value::MIN + 1, Value::MAX - 1, true, 0, None, &mut ctx).unwrap()
    }

    #[test]
    fn terminal_position_needs_no_recursion() {
        let pos = from_fen("3RG3/7/7/7/7/7/7 r").unwrap();
        let config = Config {
            strategy: Strategy::AlphaBeta,
            ..Config::default()
        };
        assert!(run(&pos, 4, &config) >= 10_000);
    }

    #[test]
    fn forced_capture_is_found_by_alpha_beta() {
        let pos = from_fen("7/3BG3/7/3r23/3RG3/7/7 r").unwrap();
        let config = Config {
            strategy: Strategy::AlphaBeta,
            null_move_pruning: false,
            ..Config::default()
        };
        assert!(run(&pos, 2, &config) >= 10_000);
    }

    #[test]
    fn alpha_beta_matches_naive_minimax_on_small_depth() {
        let pos = from_fen("7/7/7/3r13/3RG3/7/3BG3 r").unwrap();
        let config = Config {
            strategy: Strategy::AlphaBeta,
            null_move_pruning: false,
            late_move_reductions: false,
            ..Config::default()
        };
        for depth in 1..=3 {
            assert_eq!(run(&pos, depth, &config), naive_minimax(&pos, depth));
        }
    }

    #[test]
    fn pvs_matches_alpha_beta_on_small_depth() {
        let pos = from_fen("7/7/7/3r13/3RG3/7/3BG3 r").unwrap();
        let ab_config = Config {
            strategy: Strategy::AlphaBeta,
            null_move_pruning: false,
            late_move_reductions: false,
            ..Config::default()
        };
        let pvs_config = Config {
            strategy: Strategy::Pvs,
            null_move_pruning: false,
            late_move_reductions: false,
            ..Config::default()
        };
        for depth in 1..=3 {
            assert_eq!(run(&pos, depth, &ab_config), run(&pos, depth, &pvs_config));
        }
    }

    #[test]
    fn clearing_tt_does_not_change_fixed_depth_score() {
        let pos = Position::initial();
        let config = Config::default();
        let mut tt = TranspositionTable::new(1 << 12);
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut ctx = SearchContext::new(&mut tt, &config, deadline);
        let first = search(&pos, 3, Value::MIN + 1, Value::MAX - 1, true, 0, None, &mut ctx).unwrap();
        ctx.tt.clear();
        let second = search(&pos, 3, Value::MIN + 1, Value::MAX - 1, true, 0, None, &mut ctx).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn warm_transposition_table_strictly_reduces_node_count() {
        let pos = Position::initial();
        let config = Config {
            strategy: Strategy::AlphaBeta,
            null_move_pruning: false,
            late_move_reductions: false,
            aspiration_windows: false,
            ..Config::default()
        };
        let deadline = Instant::now() + Duration::from_secs(10);

        let mut cold_tt = TranspositionTable::new(1 << 16);
        let mut cold_ctx = SearchContext::new(&mut cold_tt, &config, deadline);
        search(&pos, 4, Value::MIN + 1, Value::MAX - 1, true, 0, None, &mut cold_ctx).unwrap();
        let cold_nodes = cold_ctx.nodes;

        let mut warm_tt = TranspositionTable::new(1 << 16);
        let mut warm_ctx = SearchContext::new(&mut warm_tt, &config, deadline);
        for depth in 1..=3 {
            search(&pos, depth, Value::MIN + 1, Value::MAX - 1, true, 0, None, &mut warm_ctx).unwrap();
        }
        warm_ctx.nodes = 0;
        search(&pos, 4, Value::MIN + 1, Value::MAX - 1, true, 0, None, &mut warm_ctx).unwrap();
        let warm_nodes = warm_ctx.nodes;

        assert!(warm_nodes < cold_nodes);
    }
}
