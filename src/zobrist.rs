//! The fixed Zobrist key table used to hash positions.
//!
//! The table is generated once, lazily, from a constant seed. It is
//! never read from OS entropy and never regenerated, so a hash
//! computed in one process is reproducible in any other.

use lazy_static::lazy_static;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::basetypes::{Height, Side, MAX_HEIGHT, NUM_SQUARES};

const ZOBRIST_SEED: u64 = 0x6761_7264_5f74_6f77;

pub struct ZobristKeys {
    /// `tower[side][square][height - 1]`
    tower: Vec<Vec<[u64; MAX_HEIGHT as usize]>>,
    /// `guard[side][square]`
    guard: Vec<Vec<u64>>,
    side_to_move: u64,
}

impl ZobristKeys {
    fn generate() -> ZobristKeys {
        let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);
        let mut tower = Vec::with_capacity(2);
        let mut guard = Vec::with_capacity(2);
        for _ in 0..2 {
            let mut tower_side = Vec::with_capacity(NUM_SQUARES as usize);
            let mut guard_side = Vec::with_capacity(NUM_SQUARES as usize);
            for _ in 0..NUM_SQUARES {
                let mut heights = [0u64; MAX_HEIGHT as usize];
                for h in heights.iter_mut() {
                    *h = rng.next_u64();
                }
                tower_side.push(heights);
                guard_side.push(rng.next_u64());
            }
            tower.push(tower_side);
            guard.push(guard_side);
        }
        ZobristKeys {
            tower,
            guard,
            side_to_move: rng.next_u64(),
        }
    }

    #[inline(always)]
    pub fn tower_key(&self, side: Side, square: u8, height: Height) -> u64 {
        debug_assert!((1..=MAX_HEIGHT).contains(&height));
        self.tower[side.index()][square as usize][(height - 1) as usize]
    }

    #[inline(always)]
    pub fn guard_key(&self, side: Side, square: u8) -> u64 {
        self.guard[side.index()][square as usize]
    }

    #[inline(always)]
    pub fn side_to_move_key(&self) -> u64 {
        self.side_to_move
    }
}

lazy_static! {
    pub static ref ZOBRIST: ZobristKeys = ZobristKeys::generate();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_deterministic_across_instances() {
        let a = ZobristKeys::generate();
        let b = ZobristKeys::generate();
        assert_eq!(a.tower_key(Side::Red, 5, 3), b.tower_key(Side::Red, 5, 3));
        assert_eq!(a.guard_key(Side::Blue, 40), b.guard_key(Side::Blue, 40));
        assert_eq!(a.side_to_move_key(), b.side_to_move_key());
    }

    #[test]
    fn distinct_slots_are_almost_certainly_distinct() {
        let keys = &*ZOBRIST;
        assert_ne!(
            keys.tower_key(Side::Red, 0, 1),
            keys.tower_key(Side::Blue, 0, 1)
        );
        assert_ne!(
            keys.tower_key(Side::Red, 0, 1),
            keys.tower_key(Side::Red, 0, 2)
        );
        assert_ne!(keys.guard_key(Side::Red, 0), keys.guard_key(Side::Red, 1));
    }
}
