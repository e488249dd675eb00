//! Quiescence search: extends past the nominal horizon through
//! tactical moves only, so the evaluator is never trusted in a
//! position where an immediate capture would swing the score.

use crate::basetypes::{Depth, Value, MAX_HEIGHT, VALUE_MATERIAL_END};
use crate::context::{SearchContext, SearchResult};
use crate::eval;
use crate::movegen;
use crate::moves::Move;
use crate::position::{Occupant, Position};
use crate::tt::Bound;

/// Material value of the largest possible single tower capture, used
/// for delta pruning. A guard capture is effectively unbounded (it ends
/// the game), so it is never pruned by delta alone — see `biggest_gain`.
const MAX_TOWER_VALUE: Value = MAX_HEIGHT as Value * 100;
const DELTA_MARGIN: Value = 50;

pub fn quiescence(
    pos: &Position,
    mut alpha: Value,
    beta: Value,
    qdepth: Depth,
    ctx: &mut SearchContext,
) -> SearchResult<Value> {
    ctx.check_abort()?;
    ctx.q_nodes += 1;

    if pos.is_terminal() {
        return Ok(eval::evaluate_relative(pos, 0));
    }

    // Reuses the main table with a negative depth marker: quiescence
    // entries (depth < 0) and main-search entries (depth >= 1) never
    // satisfy each other's `probe.depth >= requested` check. `remaining`
    // mirrors the main search's "plies left" convention so that same
    // comparison stays meaningful here.
    let hash = pos.hash();
    let remaining = ctx.config.quiescence_max_depth as Depth - qdepth;
    let depth_marker = -(remaining + 1);
    let original_alpha = alpha;

    if let Some(probe) = ctx.tt.probe(hash) {
        ctx.tt_hits += 1;
        if probe.depth < 0 && probe.depth >= depth_marker {
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

    let stand_pat = eval::evaluate_relative(pos, 0);
    if stand_pat >= beta {
        ctx.tt.store(hash, stand_pat, depth_marker, Bound::Lower, None);
        return Ok(stand_pat);
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }

    if qdepth >= ctx.config.quiescence_max_depth as Depth {
        return Ok(stand_pat);
    }

    let gain = biggest_gain(pos);
    if stand_pat + gain + DELTA_MARGIN < alpha {
        return Ok(stand_pat);
    }

    let mut moves = movegen::generate_tactical(pos);
    let mut best = stand_pat;
    while let Some(mv) = moves.take_best() {
        if is_losing_exchange(pos, mv) {
            continue;
        }
        let mut child = *pos;
        child.apply_move(mv);
        let score = -quiescence(&child, -beta, -alpha, qdepth + 1, ctx)?;
        if score > best {
            best = score;
        }
        if score > alpha {
            alpha = score;
        }
        if alpha >= beta {
            break;
        }
    }

    let bound = if best <= original_alpha {
        Bound::Upper
    } else if best >= beta {
        Bound::Lower
    } else {
        Bound::Exact
    };
    ctx.tt.store(hash, best, depth_marker, bound, None);
    Ok(best)
}

/// The largest possible single-move material swing from this position.
/// A guard capture is in scope whenever the opponent's guard is still
/// on the board, so the bound is terminal-magnitude in that case, not
/// the largest tower value.
fn biggest_gain(pos: &Position) -> Value {
    if pos.guards(pos.side_to_move().opponent()) != 0 {
        return VALUE_MATERIAL_END;
    }
    MAX_TOWER_VALUE
}

/// A coarse static-exchange filter: a capture is clearly losing if the
/// destination holds a smaller victim than the moving stack and the
/// destination is itself defended by a cheaper enemy tower.
fn is_losing_exchange(pos: &Position, mv: Move) -> bool {
    let side = pos.side_to_move();
    let opponent = side.opponent();
    let victim_value = match pos.occupant_at(mv.to()) {
        Occupant::Guard(_) => return false,
        Occupant::Tower(_, height) => height as Value * 100,
        Occupant::Empty => return false,
    };
    let attacker_value = pos.height_at(side, mv.from()) as Value * 100;
    if attacker_value <= victim_value {
        return false;
    }
    defended_by_cheaper_tower(pos, opponent, mv.to(), attacker_value)
}

fn defended_by_cheaper_tower(pos: &Position, defender: crate::basetypes::Side, square: crate::basetypes::Square, attacker_value: Value) -> bool {
    for from in crate::bitboard::squares_of(pos.towers(defender)) {
        let height = pos.height_at(defender, from);
        if (height as Value) * 100 >= attacker_value {
            continue;
        }
        if can_reach(pos, defender, from, square) {
            return true;
        }
    }
    false
}

fn can_reach(pos: &Position, side: crate::basetypes::Side, from: crate::basetypes::Square, target: crate::basetypes::Square) -> bool {
    use crate::basetypes::{file_of, on_board, rank_of, square_of, DIRECTIONS};
    let height = pos.height_at(side, from);
    let (rank, file) = (rank_of(from) as i32, file_of(from) as i32);
    for (dr, df) in DIRECTIONS {
        for amount in 1..=height {
            let (nr, nf) = (rank + dr * amount as i32, file + df * amount as i32);
            if !on_board(nr, nf) {
                break;
            }
            let to = square_of(nr as u8, nf as u8);
            if to == target {
                return true;
            }
            if !matches!(pos.occupant_at(to), Occupant::Empty) {
                break;
            }
        }
    }
    false
}
