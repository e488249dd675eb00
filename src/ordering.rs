//! Move ordering: ranks a `MoveList` so that moves likely to cause an
//! alpha-beta cutoff are tried first.

use crate::basetypes::{distance, file_of, rank_of, Side};
use crate::movegen;
use crate::moves::{Move, MoveList};
use crate::position::{Occupant, Position};

pub const MAX_PLY: usize = 128;

const SCORE_HASH_MOVE: i32 = 1_000_000;
const SCORE_GUARD_CAPTURE: i32 = 900_000;
const SCORE_TOWER_CAPTURE_BASE: i32 = 800_000;
const SCORE_PV_MOVE: i32 = 700_000;
const SCORE_KILLER_1: i32 = 600_000;
const SCORE_KILLER_2: i32 = 590_000;
const SCORE_EXPOSED_GUARD_PENALTY: i32 = -950_000;

/// Two killer-move slots per ply, most-recent first.
#[derive(Clone)]
pub struct KillerTable {
    slots: Vec<[Option<Move>; 2]>,
}

impl KillerTable {
    pub fn new() -> KillerTable {
        KillerTable {
            slots: vec![[None, None]; MAX_PLY],
        }
    }

    pub fn record(&mut self, ply: usize, mv: Move) {
        if ply >= self.slots.len() {
            return;
        }
        let slot = &mut self.slots[ply];
        if slot[0] == Some(mv) {
            return;
        }
        slot[1] = slot[0];
        slot[0] = Some(mv);
    }

    pub fn get(&self, ply: usize) -> [Option<Move>; 2] {
        self.slots.get(ply).copied().unwrap_or([None, None])
    }

    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = [None, None];
        }
    }
}

/// `history[from][to]`, accumulated on quiet-move cutoffs, decayed
/// periodically so stale bonuses do not dominate forever.
#[derive(Clone)]
pub struct HistoryTable {
    scores: Vec<Vec<i32>>,
}

impl HistoryTable {
    pub fn new() -> HistoryTable {
        HistoryTable {
            scores: vec![vec![0; 49]; 49],
        }
    }

    pub fn record(&mut self, mv: Move, depth: i8) {
        let bonus = (depth as i32) * (depth as i32);
        let cell = &mut self.scores[mv.from() as usize][mv.to() as usize];
        *cell = (*cell + bonus).min(SCORE_TOWER_CAPTURE_BASE - 1);
    }

    pub fn decay(&mut self) {
        for row in self.scores.iter_mut() {
            for cell in row.iter_mut() {
                *cell /= 2;
            }
        }
    }

    pub fn get(&self, mv: Move) -> i32 {
        self.scores[mv.from() as usize][mv.to() as usize]
    }

    pub fn clear(&mut self) {
        for row in self.scores.iter_mut() {
            row.fill(0);
        }
    }
}

/// Assigns ordering scores to every move in `moves`. Extraction via
/// `MoveList::take_best` then yields moves in priority order without
/// a separate sort pass.
pub fn order(
    moves: &mut MoveList,
    pos: &Position,
    ply: usize,
    hash_move: Option<Move>,
    pv_move: Option<Move>,
    killers: &KillerTable,
    history: &HistoryTable,
) {
    let side = pos.side_to_move();
    let killer_slots = killers.get(ply);
    moves.assign_scores(|mv| {
        if Some(mv) == hash_move {
            return SCORE_HASH_MOVE;
        }
        if let Some(score) = capture_score(pos, mv) {
            return score;
        }
        if Some(mv) == pv_move {
            return SCORE_PV_MOVE;
        }
        if killer_slots[0] == Some(mv) {
            return SCORE_KILLER_1;
        }
        if killer_slots[1] == Some(mv) {
            return SCORE_KILLER_2;
        }
        let mut score = history.get(mv) + positional_bonus(pos, mv) + mv.amount() as i32;
        if is_exposed_guard_move(pos, side, mv) {
            score += SCORE_EXPOSED_GUARD_PENALTY;
        }
        score
    });
}

fn capture_score(pos: &Position, mv: Move) -> Option<i32> {
    match pos.occupant_at(mv.to()) {
        Occupant::Guard(_) => Some(SCORE_GUARD_CAPTURE),
        Occupant::Tower(_, victim_height) => {
            // MVV-LVA: rank by victim height, break ties in favour of
            // a smaller attacking stack (a cheaper piece to risk).
            let attacker_height = attacker_height(pos, mv);
            Some(SCORE_TOWER_CAPTURE_BASE + victim_height as i32 * 10 - attacker_height as i32)
        }
        Occupant::Empty => None,
    }
}

fn attacker_height(pos: &Position, mv: Move) -> u8 {
    let side = pos.side_to_move();
    pos.height_at(side, mv.from())
}

fn positional_bonus(pos: &Position, mv: Move) -> i32 {
    let mut bonus = 0;
    if [2u8, 3, 4].contains(&rank_of(mv.to())) && file_of(mv.to()) == 3 {
        bonus += 10;
    }
    let side = pos.side_to_move();
    if pos.guard_square(side) == Some(mv.from()) {
        let target = side.target_rank() as i32;
        let before = (target - rank_of(mv.from()) as i32).unsigned_abs() as i32;
        let after = (target - rank_of(mv.to()) as i32).unsigned_abs() as i32;
        bonus += (before - after) * 5;
    }
    bonus
}

fn is_exposed_guard_move(pos: &Position, side: Side, mv: Move) -> bool {
    if pos.guard_square(side) != Some(mv.from()) {
        return false;
    }
    let is_capture = matches!(pos.occupant_at(mv.to()), Occupant::Guard(_));
    if is_capture {
        return false;
    }
    let mut after = *pos;
    after.apply_move(mv);
    movegen::guard_is_attacked(&after, side) && distance(mv.from(), mv.to()) > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basetypes::square_of;
    use crate::fen::from_fen;

    #[test]
    fn hash_move_sorts_first() {
        let pos = Position::initial();
        let mut moves = movegen::generate(&pos);
        let any = moves.iter().nth(3).unwrap();
        order(
            &mut moves,
            &pos,
            0,
            Some(any),
            None,
            &KillerTable::new(),
            &HistoryTable::new(),
        );
        assert_eq!(moves.take_best(), Some(any));
    }

    #[test]
    fn guard_capture_outranks_tower_capture() {
        let pos = from_fen("7/3BG3/7/3r23/3RG3/7/7 r").unwrap();
        let mut moves = movegen::generate(&pos);
        order(&mut moves, &pos, 0, None, None, &KillerTable::new(), &HistoryTable::new());
        let best = moves.take_best().unwrap();
        assert_eq!(best.to(), square_of(5, 3));
    }

    #[test]
    fn killer_table_shifts_slots() {
        let mut table = KillerTable::new();
        let a = Move::new(0, 1, 1);
        let b = Move::new(0, 2, 1);
        table.record(4, a);
        table.record(4, b);
        assert_eq!(table.get(4), [Some(b), Some(a)]);
    }
}
