//! `Position`: the complete, Zobrist-hashed game state.

use crate::basetypes::{Height, Side, Square, BOARD_MASK, MAX_HEIGHT, NUM_SQUARES};
use crate::bitboard::{self, Bitboard};
use crate::moves::Move;
use crate::zobrist::ZOBRIST;

/// What occupies a square, if anything.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Occupant {
    Empty,
    Guard(Side),
    Tower(Side, Height),
}

/// A complete game state: both guards, both sides' tower stacks, the
/// side to move, and a running Zobrist hash.
///
/// Copied by plain value copy (`Position` is `Copy`); there is no
/// make/unmake pair, only copy-then-`apply_move`, per design.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Position {
    guards: [Bitboard; 2],
    towers: [Bitboard; 2],
    heights: [[Height; NUM_SQUARES as usize]; 2],
    red_to_move: bool,
    hash: u64,
}

impl Position {
    /// An empty board, side to move red. Not a legal game state on
    /// its own; callers build positions via `from_fen` or by placing
    /// pieces with `set_guard`/`set_tower` and finishing with
    /// `recompute_hash`.
    pub fn empty() -> Position {
        Position {
            guards: [0, 0],
            towers: [0, 0],
            heights: [[0; NUM_SQUARES as usize]; 2],
            red_to_move: true,
            hash: ZOBRIST.side_to_move_key(),
        }
    }

    /// The canonical starting layout: each side's guard on the centre
    /// of its back rank, flanked by towers of height 1, with a second
    /// rank of single towers in front.
    pub fn initial() -> Position {
        let mut pos = Position::empty();
        for file in 0..7u8 {
            if file != 3 {
                        pos.set_tower(Side::Red, crate::basetypes::square_of(0, file), 1);
                pos.set_tower(Side::Blue, crate::basetypes::square_of(6, file), 1);
            }
        }
        pos.set_guard(Side::Red, crate::basetypes::square_of(0, 3));
        pos.set_guard(Side::Blue, crate::basetypes::square_of(6, 3));
        pos.set_tower(Side::Red, crate::basetypes::square_of(1, 2), 1);
        pos.set_tower(Side::Red, crate::basetypes::square_of(1, 4), 1);
        pos.set_tower(Side::Blue, crate::basetypes::square_of(5, 2), 1);
        pos.set_tower(Side::Blue, crate::basetypes::square_of(5, 4), 1);
        pos.red_to_move = true;
        pos.recompute_hash();
        pos
    }

    pub fn side_to_move(&self) -> Side {
        if self.red_to_move {
            Side::Red
        } else {
            Side::Blue
        }
    }

    pub fn set_side_to_move(&mut self, side: Side) {
        self.red_to_move = matches!(side, Side::Red);
    }

    #[inline(always)]
    pub fn guards(&self, side: Side) -> Bitboard {
        self.guards[side.index()]
    }

    #[inline(always)]
    pub fn towers(&self, side: Side) -> Bitboard {
        self.towers[side.index()]
    }

    #[inline(always)]
    pub fn height_at(&self, side: Side, square: Square) -> Height {
        self.heights[side.index()][square as usize]
    }

    #[inline(always)]
    pub fn occupied(&self) -> Bitboard {
        self.guards[0] | self.guards[1] | self.towers[0] | self.towers[1]
    }

    #[inline(always)]
    pub fn own(&self, side: Side) -> Bitboard {
        self.guards[side.index()] | self.towers[side.index()]
    }

    pub fn guard_square(&self, side: Side) -> Option<Square> {
        let bb = self.guards[side.index()];
        if bb == 0 {
            None
        } else {
            Some(bb.trailing_zeros() as Square)
        }
    }

    pub fn occupant_at(&self, square: Square) -> Occupant {
        for side in [Side::Red, Side::Blue] {
            if bitboard::is_set(self.guards[side.index()], square) {
                return Occupant::Guard(side);
            }
            if bitboard::is_set(self.towers[side.index()], square) {
                return Occupant::Tower(side, self.heights[side.index()][square as usize]);
            }
        }
        Occupant::Empty
    }

    #[inline(always)]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Recomputes `hash` from scratch. Used by `from_fen`, by board
    /// setup helpers, and by tests checking incremental updates
    /// against a from-scratch fold.
    pub fn recompute_hash(&mut self) {
        let mut h = 0u64;
        for side in [Side::Red, Side::Blue] {
            if let Some(sq) = self.guard_square(side) {
                h ^= ZOBRIST.guard_key(side, sq);
            }
            for sq in bitboard::squares_of(self.towers[side.index()]) {
                let height = self.heights[side.index()][sq as usize];
                h ^= ZOBRIST.tower_key(side, sq, height);
            }
        }
        if self.red_to_move {
            h ^= ZOBRIST.side_to_move_key();
        }
        self.hash = h;
    }

    /// A copy with side-to-move flipped and no piece moved, used only
    /// by null-move pruning.
    pub fn null_move(&self) -> Position {
        let mut copy = *self;
        copy.red_to_move = !copy.red_to_move;
        copy.hash ^= ZOBRIST.side_to_move_key();
        copy
    }

    /// Terminal test: either guard missing, or a guard stands on the
    /// opposing target square.
    pub fn is_terminal(&self) -> bool {
        self.winner().is_some()
    }

    /// The side that has already won, if the position is terminal.
    pub fn winner(&self) -> Option<Side> {
        for side in [Side::Red, Side::Blue] {
            let opponent = side.opponent();
            if self.guard_square(opponent).is_none() {
                return Some(side);
            }
            if let Some(sq) = self.guard_square(side) {
                if crate::basetypes::rank_of(sq) == side.target_rank() {
                    return Some(side);
                }
            }
        }
        None
    }

    pub fn total_towers(&self) -> u32 {
        bitboard::popcount(self.towers[0]) + bitboard::popcount(self.towers[1])
    }

    // --- setup helpers, used by FEN parsing and `initial` ---

    pub fn set_guard(&mut self, side: Side, square: Square) {
        bitboard::set(&mut self.guards[side.index()], square);
    }

    pub fn set_tower(&mut self, side: Side, square: Square, height: Height) {
        debug_assert!((1..=MAX_HEIGHT).contains(&height));
        bitboard::set(&mut self.towers[side.index()], square);
        self.heights[side.index()][square as usize] = height;
    }

    /// Mutates `self` by applying a pseudo-legal move.
    ///
    /// Precondition: `mv` was produced by, or validated against, the
    /// move generator for `self`. Violating this is a programmer
    /// error (`debug_assert!` panics in debug builds; release builds
    /// may corrupt `self` but never read out of bounds, since every
    /// index is a `Square` already proven `< 49`).
    pub fn apply_move(&mut self, mv: Move) {
        let side = self.side_to_move();
        let opponent = side.opponent();
        let from = mv.from();
        let to = mv.to();
        let amount = mv.amount();

        debug_assert!(from != to);
        debug_assert!(bitboard::bit(from) & BOARD_MASK != 0);

        if bitboard::is_set(self.guards[side.index()], from) {
            debug_assert_eq!(amount, 1);
            self.move_guard(side, opponent, from, to);
        } else {
            debug_assert!(bitboard::is_set(self.towers[side.index()], from));
            self.move_tower(side, opponent, from, to, amount);
        }

        self.red_to_move = !self.red_to_move;
        self.hash ^= ZOBRIST.side_to_move_key();
    }

    fn move_guard(&mut self, side: Side, opponent: Side, from: Square, to: Square) {
        let guards = &mut self.guards[side.index()];
        bitboard::clear(guards, from);
        bitboard::set(guards, to);
        self.hash ^= ZOBRIST.guard_key(side, from) ^ ZOBRIST.guard_key(side, to);

        if bitboard::is_set(self.guards[opponent.index()], to) {
            bitboard::clear(&mut self.guards[opponent.index()], to);
            self.hash ^= ZOBRIST.guard_key(opponent, to);
        }
    }

    fn move_tower(&mut self, side: Side, opponent: Side, from: Square, to: Square, amount: u8) {
        let from_height = self.heights[side.index()][from as usize];
        debug_assert!(amount <= from_height);

        self.hash ^= ZOBRIST.tower_key(side, from, from_height);
        let remaining = from_height - amount;
        if remaining == 0 {
            bitboard::clear(&mut self.towers[side.index()], from);
            self.heights[side.index()][from as usize] = 0;
        } else {
            self.heights[side.index()][from as usize] = remaining;
            self.hash ^= ZOBRIST.tower_key(side, from, remaining);
        }

        if bitboard::is_set(self.guards[opponent.index()], to) {
            bitboard::clear(&mut self.guards[opponent.index()], to);
            self.hash ^= ZOBRIST.guard_key(opponent, to);
        } else if bitboard::is_set(self.towers[opponent.index()], to) {
            let victim_height = self.heights[opponent.index()][to as usize];
            debug_assert!(amount >= victim_height);
            bitboard::clear(&mut self.towers[opponent.index()], to);
            self.hash ^= ZOBRIST.tower_key(opponent, to, victim_height);
            self.heights[opponent.index()][to as usize] = 0;
        }

        let dest_height = if bitboard::is_set(self.towers[side.index()], to) {
            self.heights[side.index()][to as usize]
        } else {
            0
        };
        if dest_height > 0 {
            self.hash ^= ZOBRIST.tower_key(side, to, dest_height);
        }
        let new_height = dest_height + amount;
        debug_assert!(new_height <= MAX_HEIGHT);
        bitboard::set(&mut self.towers[side.index()], to);
        self.heights[side.index()][to as usize] = new_height;
        self.hash ^= ZOBRIST.tower_key(side, to, new_height);
    }
}
