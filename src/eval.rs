//! Static evaluation, from red's perspective: positive favours red.

use crate::basetypes::{distance, file_of, rank_of, Depth, Side, Value, BOARD_SIZE,
    VALUE_MATERIAL_END, VALUE_MATE_NET};
use crate::bitboard;
use crate::movegen;
use crate::position::Position;

const MATERIAL_WEIGHT: Value = 100;
const ADVANCEMENT_WEIGHT: Value = 6;
const ADVANCEMENT_ENDGAME_WEIGHT: Value = 14;
const ENDGAME_TOWER_THRESHOLD: u32 = 6;
const CENTRE_FILE: u8 = 3;
const CENTRE_RANKS: [u8; 3] = [2, 3, 4];
const CENTRE_TOWER_BONUS: Value = 8;
const CENTRE_GUARD_BONUS: Value = 25;
const MOBILITY_WEIGHT: Value = 3;
const STRANDED_TALL_TOWER_PENALTY: Value = 15;
const THREAT_BONUS: Value = 18;
const GUARD_IN_DANGER_PENALTY: Value = 120;

/// Evaluates `pos` from red's perspective. `depth` is the number of
/// plies remaining in the search (used to prefer shorter mates).
pub fn evaluate(pos: &Position, depth: Depth) -> Value {
    if let Some(winner) = pos.winner() {
        let magnitude = VALUE_MATERIAL_END + depth as Value;
        return if matches!(winner, Side::Red) { magnitude } else { -magnitude };
    }

    if movegen::guard_in_mate_net(pos, Side::Red) {
        return -(VALUE_MATE_NET + depth as Value);
    }
    if movegen::guard_in_mate_net(pos, Side::Blue) {
        return VALUE_MATE_NET + depth as Value;
    }

    let mut score = 0;
    score += material(pos, Side::Red) - material(pos, Side::Blue);
    score += advancement(pos, Side::Red) - advancement(pos, Side::Blue);
    score += central_control(pos, Side::Red) - central_control(pos, Side::Blue);
    score += mobility(pos, Side::Red) - mobility(pos, Side::Blue);
    score += threat_potential(pos, Side::Red) - threat_potential(pos, Side::Blue);
    score += guard_safety(pos, Side::Red) - guard_safety(pos, Side::Blue);
    score
}

/// `evaluate`, flipped to the side to move's perspective. Every caller
/// that treats the result as a negamax leaf value (about to be negated
/// up through a chain of `-search(...)` calls) must use this, not
/// `evaluate` directly.
pub fn evaluate_relative(pos: &Position, depth: Depth) -> Value {
    let raw = evaluate(pos, depth);
    if pos.side_to_move() == Side::Red {
        raw
    } else {
        -raw
    }
}

fn material(pos: &Position, side: Side) -> Value {
    let mut total = 0;
    for sq in bitboard::squares_of(pos.towers(side)) {
        total += pos.height_at(side, sq) as Value * MATERIAL_WEIGHT;
    }
    total
}

fn advancement(pos: &Position, side: Side) -> Value {
    let Some(sq) = pos.guard_square(side) else {
        return 0;
    };
    let target_rank = side.target_rank() as i32;
    let rank_gap = (target_rank - rank_of(sq) as i32).unsigned_abs() as Value;
    let file_gap = (CENTRE_FILE as i32 - file_of(sq) as i32).unsigned_abs() as Value;
    let weight = if pos.total_towers() <= ENDGAME_TOWER_THRESHOLD {
        ADVANCEMENT_ENDGAME_WEIGHT
    } else {
        ADVANCEMENT_WEIGHT
    };
    let max_gap = (BOARD_SIZE as Value - 1) * 2;
    (max_gap - rank_gap * 2 - file_gap) * weight
}

fn central_control(pos: &Position, side: Side) -> Value {
    let mut score = 0;
    for sq in bitboard::squares_of(pos.towers(side)) {
        if CENTRE_RANKS.contains(&rank_of(sq)) && file_of(sq) == CENTRE_FILE {
            score += CENTRE_TOWER_BONUS * pos.height_at(side, sq) as Value;
        }
    }
    if let Some(sq) = pos.guard_square(side) {
        if CENTRE_RANKS.contains(&rank_of(sq)) && file_of(sq) == CENTRE_FILE {
            score += CENTRE_GUARD_BONUS;
        }
    }
    score
}

fn mobility(pos: &Position, side: Side) -> Value {
    let mut score = 0;
    for sq in bitboard::squares_of(pos.towers(side)) {
        let height = pos.height_at(side, sq) as i32;
        let (rank, file) = (rank_of(sq) as i32, file_of(sq) as i32);
        let mut reachable = 0;
        for (dr, df) in crate::basetypes::DIRECTIONS {
            for amount in 1..=height {
                let (nr, nf) = (rank + dr * amount, file + df * amount);
                if !crate::basetypes::on_board(nr, nf) {
                    break;
                }
                let to = crate::basetypes::square_of(nr as u8, nf as u8);
                if matches!(pos.occupant_at(to), crate::position::Occupant::Empty) {
                    reachable += 1;
                } else {
                    break;
                }
            }
        }
        score += reachable * MOBILITY_WEIGHT;
        if height >= 4 && reachable == 0 {
            score -= STRANDED_TALL_TOWER_PENALTY;
        }
    }
    score
}

fn threat_potential(pos: &Position, side: Side) -> Value {
    let Some(enemy_guard) = pos.guard_square(side.opponent()) else {
        return 0;
    };
    let mut score = 0;
    for sq in bitboard::squares_of(pos.towers(side)) {
        let height = pos.height_at(side, sq);
        if height as u8 >= distance(sq, enemy_guard) {
            score += THREAT_BONUS;
        }
    }
    score
}

fn guard_safety(pos: &Position, side: Side) -> Value {
    if movegen::guard_is_attacked(pos, side) {
        -GUARD_IN_DANGER_PENALTY
    } else {
        0
    }
}
