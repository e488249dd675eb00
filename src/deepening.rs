//! Iterative deepening and the time manager.
//!
//! The root loop searches depth 1, 2, 3… until the budget is judged
//! insufficient for another depth, a true mate is found, or the
//! configured `max_depth` is reached. The deadline-polling
//! cancellation in `context::SearchContext` makes this cooperative:
//! a depth that starts is always allowed to either finish or unwind
//! cleanly, never to corrupt the last completed depth's result.

use std::time::{Duration, Instant};

use crate::basetypes::{Depth, Value, VALUE_MATERIAL_END};
use crate::context::SearchContext;
use crate::movegen;
use crate::moves::Move;
use crate::position::Position;
use crate::search::search;

const ASPIRATION_INITIAL_DELTA: Value = 25;
const ASPIRATION_MAX_DELTA: Value = 4_000;
const BUDGET_FRACTION: f64 = 0.85;
const MIN_MATE_DEPTH: Depth = 2;

pub struct DeepeningOutcome {
    pub best_move: Move,
    pub score: Value,
    pub depth_reached: Depth,
}

/// Runs iterative deepening up to `max_depth`, stopping once the
/// deadline is judged unreachable for another iteration. Always
/// returns a legal move when at least one move was generated for
/// `pos`; panics only if the position has no legal moves at all
/// (the façade is responsible for handling `NoLegalMoves` before
/// calling this).
pub fn iterative_deepen(
    pos: &Position,
    max_depth: Depth,
    start: Instant,
    budget: Duration,
    ctx: &mut SearchContext,
) -> DeepeningOutcome {
    let fallback = movegen::generate(pos)
        .first()
        .expect("iterative_deepen requires at least one legal move");

    let deadline = start + budget;
    ctx.set_deadline(deadline);
    ctx.tt.new_search();

    let mut best_move = fallback;
    let mut best_score = 0;
    let mut depth_reached: Depth = 0;
    let mut last_elapsed = Duration::from_millis(0);

    for depth in 1..=max_depth {
        let depth_start = Instant::now();
        if depth > 1 && !budget_allows_next_depth(depth, last_elapsed, depth_start, deadline) {
            break;
        }

        let result = search_at_depth(pos, depth, best_score, ctx);
        let Ok(score) = result else {
            break;
        };

        if let Some(mv) = ctx.tt.probe(pos.hash()).and_then(|p| p.best_move) {
            best_move = mv;
        }
        best_score = score;
        depth_reached = depth;
        last_elapsed = depth_start.elapsed();

        if score.abs() >= VALUE_MATERIAL_END && depth >= MIN_MATE_DEPTH {
            break;
        }
    }

    DeepeningOutcome {
        best_move,
        score: best_score,
        depth_reached,
    }
}

fn search_at_depth(
    pos: &Position,
    depth: Depth,
    prev_score: Value,
    ctx: &mut SearchContext,
) -> Result<Value, crate::context::Aborted> {
    if !ctx.config.aspiration_windows || depth <= 1 {
        return search(pos, depth, Value::MIN + 1, Value::MAX - 1, true, 0, None, ctx);
    }

    let mut delta = ASPIRATION_INITIAL_DELTA;
    loop {
        let alpha = prev_score.saturating_sub(delta);
        let beta = prev_score.saturating_add(delta);
        let score = search(pos, depth, alpha, beta, true, 0, None, ctx)?;
        if score <= alpha || score >= beta {
            if delta >= ASPIRATION_MAX_DELTA {
                return search(pos, depth, Value::MIN + 1, Value::MAX - 1, true, 0, None, ctx);
            }
            delta *= 4;
            continue;
        }
        return Ok(score);
    }
}

fn budget_allows_next_depth(depth: Depth, last_elapsed: Duration, now: Instant, deadline: Instant) -> bool {
    if now >= deadline {
        return false;
    }
    let remaining = deadline.saturating_duration_since(now);
    let growth_factor: u32 = if depth <= 4 {
        2
    } else if depth <= 8 {
        3
    } else {
        4
    };
    let estimated_next = last_elapsed.checked_mul(growth_factor).unwrap_or(Duration::MAX);
    let usable = remaining.mul_f64(BUDGET_FRACTION);
    estimated_next <= usable
}
