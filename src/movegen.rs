//! Pseudo-legal move generation.
//!
//! The generator is a pure function of the position: it does not
//! reorder, score, or filter moves by their consequences (an exposed
//! guard move is legal here; move ordering, not generation, penalises
//! it). There is no check concept, so nothing resembling legality
//! pruning against self-check exists.

use crate::basetypes::{distance, on_board, rank_of, file_of, square_of, Side, Square, DIRECTIONS};
use crate::moves::{Move, MoveList};
use crate::position::{Occupant, Position};

/// All pseudo-legal moves for the side to move.
pub fn generate(pos: &Position) -> MoveList {
    let mut moves = MoveList::new();
    generate_into(pos, &mut moves);
    moves
}

fn generate_into(pos: &Position, moves: &mut MoveList) {
    let side = pos.side_to_move();
    generate_guard_moves(pos, side, moves);
    generate_tower_moves(pos, side, moves);
}

fn generate_guard_moves(pos: &Position, side: Side, moves: &mut MoveList) {
    let Some(from) = pos.guard_square(side) else {
        return;
    };
    let (rank, file) = (rank_of(from) as i32, file_of(from) as i32);
    for (dr, df) in DIRECTIONS {
        let (nr, nf) = (rank + dr, file + df);
        if !on_board(nr, nf) {
            continue;
        }
        let to = square_of(nr as u8, nf as u8);
        match pos.occupant_at(to) {
            Occupant::Empty => moves.push(Move::new(from, to, 1)),
            Occupant::Guard(other) if other != side => moves.push(Move::new(from, to, 1)),
            _ => {}
        }
    }
}

fn generate_tower_moves(pos: &Position, side: Side, moves: &mut MoveList) {
    let opponent = side.opponent();
    for from in crate::bitboard::squares_of(pos.towers(side)) {
        let height = pos.height_at(side, from);
        let (rank, file) = (rank_of(from) as i32, file_of(from) as i32);
        for (dr, df) in DIRECTIONS {
            for amount in 1..=height {
                let (nr, nf) = (rank + dr * amount as i32, file + df * amount as i32);
                if !on_board(nr, nf) {
                    break;
                }
                let to = square_of(nr as u8, nf as u8);
                match pos.occupant_at(to) {
                    Occupant::Empty => {
                        moves.push(Move::new(from, to, amount));
                        continue;
                    }
                    Occupant::Guard(g) if g == opponent => {
                        moves.push(Move::new(from, to, amount));
                    }
                    Occupant::Guard(_) => {}
                    Occupant::Tower(owner, h) if owner == side => {
                        if h + amount <= 7 {
                            moves.push(Move::new(from, to, amount));
                        }
                    }
                    Occupant::Tower(_, victim_height) => {
                        if amount >= victim_height {
                            moves.push(Move::new(from, to, amount));
                        }
                    }
                }
                // Any occupied square, reachable or not, blocks travel past it.
                break;
            }
        }
    }
}

/// True if `mv` captures a guard or a tower.
pub fn is_capture(pos: &Position, mv: Move) -> bool {
    !matches!(pos.occupant_at(mv.to()), Occupant::Empty)
}

/// True if `side`'s guard is capturable by the opponent on their next
/// move from `pos` (a stand-alone position, side to move irrelevant to
/// the check — this evaluates raw reachability).
pub fn guard_is_attacked(pos: &Position, side: Side) -> bool {
    let Some(guard_sq) = pos.guard_square(side) else {
        return false;
    };
    let opponent = side.opponent();

    let (gr, gf) = (rank_of(guard_sq) as i32, file_of(guard_sq) as i32);
    if let Some(enemy_guard) = pos.guard_square(opponent) {
        let (er, ef) = (rank_of(enemy_guard) as i32, file_of(enemy_guard) as i32);
        if (gr - er).abs() + (gf - ef).abs() == 1 {
            return true;
        }
    }

    for from in crate::bitboard::squares_of(pos.towers(opponent)) {
        let height = pos.height_at(opponent, from);
        let (rank, file) = (rank_of(from) as i32, file_of(from) as i32);
        for (dr, df) in DIRECTIONS {
            for amount in 1..=height {
                let (nr, nf) = (rank + dr * amount as i32, file + df * amount as i32);
                if !on_board(nr, nf) {
                    break;
                }
                let to = square_of(nr as u8, nf as u8);
                if to == guard_sq {
                    return true;
                }
                if !matches!(pos.occupant_at(to), Occupant::Empty) {
                    break;
                }
            }
        }
    }
    false
}

/// True if `side`'s guard has no move this turn that escapes capture —
/// a "mate net".
pub fn guard_in_mate_net(pos: &Position, side: Side) -> bool {
    if !guard_is_attacked(pos, side) {
        return false;
    }
    let Some(from) = pos.guard_square(side) else {
        return true;
    };
    let (rank, file) = (rank_of(from) as i32, file_of(from) as i32);
    for (dr, df) in DIRECTIONS {
        let (nr, nf) = (rank + dr, file + df);
        if !on_board(nr, nf) {
            continue;
        }
        let to = square_of(nr as u8, nf as u8);
        let lands_on_enemy_guard = matches!(pos.occupant_at(to), Occupant::Guard(g) if g == side.opponent());
        let is_clear = matches!(pos.occupant_at(to), Occupant::Empty) || lands_on_enemy_guard;
        if !is_clear {
            continue;
        }
        let mut after = *pos;
        after.apply_move(Move::new(from, to, 1));
        if lands_on_enemy_guard || !guard_is_attacked(&after, side) {
            return false;
        }
    }
    true
}

/// Moves worth searching in quiescence: captures, a guard reaching its
/// target, guard escapes when the guard is currently attacked, and
/// tower moves that newly threaten the enemy guard (post-move distance
/// to the enemy guard is within the moved stack's height).
pub fn generate_tactical(pos: &Position) -> MoveList {
    let side = pos.side_to_move();
    let mut all = generate(pos);
    let guard_in_danger = guard_is_attacked(pos, side);
    let mut tactical = MoveList::new();
    while let Some(mv) = all.take_best() {
        if is_tactical(pos, side, mv, guard_in_danger) {
            tactical.push(mv);
        }
    }
    tactical
}

fn is_tactical(pos: &Position, side: Side, mv: Move, guard_in_danger: bool) -> bool {
    if is_capture(pos, mv) {
        return true;
    }
    let is_guard_move = pos.guard_square(side) == Some(mv.from());
    if is_guard_move {
        if rank_of(mv.to()) == side.target_rank() {
            return true;
        }
        if guard_in_danger {
            return true;
        }
        return false;
    }
    if let Some(enemy_guard) = pos.guard_square(side.opponent()) {
        if distance(mv.to(), enemy_guard) <= mv.amount() {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::from_fen;

    #[test]
    fn initial_position_has_moves_for_every_own_piece() {
        let pos = Position::initial();
        let moves = generate(&pos);
        assert!(!moves.is_empty());
        for mv in moves.iter() {
            assert!(
                crate::bitboard::is_set(pos.own(Side::Red), mv.from())
            );
        }
    }

    #[test]
    fn guard_cannot_step_onto_any_tower() {
        let mut pos = Position::empty();
        pos.set_guard(Side::Red, square_of(3, 3));
        pos.set_guard(Side::Blue, square_of(6, 6));
        pos.set_tower(Side::Red, square_of(3, 4), 1);
        pos.set_tower(Side::Blue, square_of(3, 2), 1);
        pos.recompute_hash();
        let moves = generate(&pos);
        for mv in moves.iter() {
            assert_ne!(mv.to(), square_of(3, 4));
            assert_ne!(mv.to(), square_of(3, 2));
        }
    }

    #[test]
    fn tower_cannot_jump_over_blocker() {
        let mut pos = Position::empty();
        pos.set_guard(Side::Red, square_of(0, 0));
        pos.set_guard(Side::Blue, square_of(6, 6));
        pos.set_tower(Side::Red, square_of(3, 0), 5);
        pos.set_tower(Side::Red, square_of(3, 2), 1);
        pos.recompute_hash();
        let moves = generate(&pos);
        for mv in moves.iter() {
            if mv.from() == square_of(3, 0) && file_of(mv.to()) == file_of(square_of(3, 0)) {
                continue;
            }
            if mv.from() == square_of(3, 0) {
                assert!(file_of(mv.to()) <= 2);
            }
        }
    }

    #[test]
    fn forced_capture_move_is_generated() {
        let pos = from_fen("7/3BG3/7/3r23/3RG3/7/7 r").unwrap();
        let moves = generate(&pos);
        let capture = Move::new(square_of(3, 3), square_of(5, 3), 2);
        assert!(moves.contains(capture));
    }

    #[test]
    fn edge_wrap_is_rejected() {
        let mut pos = Position::empty();
        pos.set_guard(Side::Red, square_of(0, 0));
        pos.set_guard(Side::Blue, square_of(6, 6));
        pos.set_tower(Side::Red, square_of(3, 6), 6);
        pos.recompute_hash();
        let moves = generate(&pos);
        for mv in moves.iter() {
            if mv.from() == square_of(3, 6) {
                assert_eq!(rank_of(mv.to()), rank_of(mv.from()));
            }
        }
    }
}
