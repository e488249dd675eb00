//! Fixed-capacity transposition table.
//!
//! One slot per hash bucket. Replacement is depth-preferred: a new
//! entry only overwrites an occupied slot when
//! `new.depth >= old.depth - 2`. Each slot stores the full 64-bit
//! hash so an index collision (bucket collision, not key collision)
//! is detected on probe rather than silently returning a foreign
//! position's result.

use crate::basetypes::{Depth, Value};
use crate::moves::Move;

pub const DEFAULT_TT_CAPACITY: usize = 1 << 22;
pub const MIN_TT_CAPACITY: usize = 1024;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Copy, Clone, Debug)]
struct Slot {
    hash: u64,
    score: Value,
    depth: Depth,
    bound: Bound,
    best_move: Option<Move>,
    age: u32,
}

#[derive(Copy, Clone, Debug)]
pub struct Probe {
    pub score: Value,
    pub depth: Depth,
    pub bound: Bound,
    pub best_move: Option<Move>,
}

pub struct TranspositionTable {
    slots: Vec<Option<Slot>>,
    mask: u64,
    age: u32,
}

impl TranspositionTable {
    pub fn new(capacity: usize) -> TranspositionTable {
        let capacity = capacity.max(MIN_TT_CAPACITY).next_power_of_two();
        log::debug!("allocating transposition table with {} slots", capacity);
        TranspositionTable {
            slots: vec![None; capacity],
            mask: (capacity - 1) as u64,
            age: 0,
        }
    }

    #[inline(always)]
    fn index(&self, hash: u64) -> usize {
        (hash & self.mask) as usize
    }

    pub fn probe(&self, hash: u64) -> Option<Probe> {
        let slot = self.slots[self.index(hash)].as_ref()?;
        if slot.hash != hash {
            return None;
        }
        Some(Probe {
            score: slot.score,
            depth: slot.depth,
            bound: slot.bound,
            best_move: slot.best_move,
        })
    }

    pub fn store(&mut self, hash: u64, score: Value, depth: Depth, bound: Bound, best_move: Option<Move>) {
        let index = self.index(hash);
        let age = self.age;
        let replace = match &self.slots[index] {
            None => true,
            Some(existing) => depth >= existing.depth - 2,
        };
        if !replace {
            return;
        }
        self.slots[index] = Some(Slot {
            hash,
            score,
            depth,
            bound,
            best_move,
            age,
        });
    }

    /// Advances the age counter. Called once per top-level `best_move`.
    pub fn new_search(&mut self) {
        self.age = self.age.wrapping_add(1);
    }

    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.age = 0;
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_and_probe_roundtrip() {
        let mut tt = TranspositionTable::new(MIN_TT_CAPACITY);
        assert!(tt.probe(42).is_none());
        tt.store(42, 100, 5, Bound::Exact, None);
        let probe = tt.probe(42).unwrap();
        assert_eq!(probe.score, 100);
        assert_eq!(probe.depth, 5);
        assert_eq!(probe.bound, Bound::Exact);
    }

    #[test]
    fn index_collision_is_detected_via_full_hash() {
        let mut tt = TranspositionTable::new(MIN_TT_CAPACITY);
        let capacity = tt.len() as u64;
        tt.store(5, 10, 3, Bound::Exact, None);
        // Same bucket, different full hash.
        assert!(tt.probe(5 + capacity).is_none());
    }

    #[test]
    fn depth_preferred_replacement_keeps_deep_entries() {
        let mut tt = TranspositionTable::new(MIN_TT_CAPACITY);
        tt.store(7, 1, 10, Bound::Exact, None);
        tt.store(7, 2, 3, Bound::Exact, None); // much shallower, rejected
        assert_eq!(tt.probe(7).unwrap().depth, 10);
        tt.store(7, 3, 9, Bound::Exact, None); // within depth-2, accepted
        assert_eq!(tt.probe(7).unwrap().depth, 9);
    }

    #[test]
    fn clear_empties_every_slot() {
        let mut tt = TranspositionTable::new(MIN_TT_CAPACITY);
        tt.store(1, 0, 0, Bound::Exact, None);
        tt.clear();
        assert!(tt.probe(1).is_none());
        assert_eq!(tt.occupied_count(), 0);
    }
}
