//! Search core for a 7x7 two-player abstract board game: each side
//! controls one guard and a set of height-stacked towers. A side wins
//! by capturing the enemy guard or marching its own guard onto the
//! target square on the opposite back rank.
//!
//! This crate is the engine only — bitboards, move generation, static
//! evaluation, transposition table, move ordering, alpha-beta/PVS
//! search with quiescence, and iterative deepening with a time
//! manager, behind the [`Engine`] façade. A tournament client, board
//! viewer, CLI launcher and opening book are all expected to be built
//! on top of this crate, not inside it.

pub mod basetypes;
pub mod bitboard;
mod context;
pub mod deepening;
pub mod engine;
pub mod error;
pub mod eval;
pub mod fen;
pub mod movegen;
pub mod moves;
pub mod ordering;
pub mod position;
pub mod quiescence;
pub mod search;
pub mod tt;
mod zobrist;

pub use engine::{Config, Engine, Statistics, Strategy};
pub use error::EngineError;
pub use fen::{from_fen, to_fen};
pub use moves::{Move, MoveList};
pub use position::Position;

#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::basetypes::{Side, Value};
    use crate::search::naive_minimax;
    use proptest::prelude::*;
    use proptest::strategy::Strategy as _;
    use std::time::{Duration, Instant};

    fn arbitrary_position() -> impl proptest::strategy::Strategy<Value = Position> {
        let squares = 0u8..49u8;
        (
            prop::collection::vec(squares.clone(), 0..6),
            prop::collection::vec(1u8..=7, 0..6),
            prop::collection::vec(squares.clone(), 0..6),
            prop::collection::vec(1u8..=7, 0..6),
            any::<bool>(),
        )
            .prop_map(|(red_sq, red_h, blue_sq, blue_h, red_to_move)| {
                let mut pos = Position::empty();
                let mut used = std::collections::HashSet::new();
                used.insert(3u8);
                let red_guard = 3u8;
                let blue_guard = 45u8;
                used.insert(red_guard);
                used.insert(blue_guard);
                pos.set_guard(Side::Red, red_guard);
                pos.set_guard(Side::Blue, blue_guard);
                for (sq, h) in red_sq.into_iter().zip(red_h.into_iter()) {
                    if used.insert(sq) {
                        pos.set_tower(Side::Red, sq, h);
                    }
                }
                for (sq, h) in blue_sq.into_iter().zip(blue_h.into_iter()) {
                    if used.insert(sq) {
                        pos.set_tower(Side::Blue, sq, h);
                    }
                }
                pos.set_side_to_move(if red_to_move { Side::Red } else { Side::Blue });
                pos.recompute_hash();
                pos
            })
    }

    proptest! {
        #[test]
        fn fen_round_trip(pos in arbitrary_position()) {
            let text = fen::to_fen(&pos);
            let parsed = fen::from_fen(&text).unwrap();
            prop_assert_eq!(fen::to_fen(&parsed), text);
        }

        #[test]
        fn hash_matches_from_scratch_recomputation(pos in arbitrary_position()) {
            let mut recomputed = pos;
            recomputed.recompute_hash();
            prop_assert_eq!(recomputed.hash(), pos.hash());
        }

        #[test]
        fn generated_moves_apply_without_panicking(pos in arbitrary_position()) {
            if pos.is_terminal() {
                return Ok(());
            }
            let moves = movegen::generate(&pos);
            for mv in moves.iter() {
                let mut copy = pos;
                copy.apply_move(mv);
            }
        }

        #[test]
        fn applying_a_move_always_changes_the_position(pos in arbitrary_position()) {
            if pos.is_terminal() {
                return Ok(());
            }
            let moves = movegen::generate(&pos);
            for mv in moves.iter() {
                let mut copy = pos;
                copy.apply_move(mv);
                prop_assert_ne!(copy, pos);
            }
        }
    }

    #[test]
    fn alpha_beta_matches_naive_minimax_on_sampled_positions() {
        use crate::context::SearchContext;
        use crate::engine::{Config, Strategy};
        use crate::tt::TranspositionTable;

        let positions = [
            fen::from_fen("7/7/7/3r13/3RG3/7/3BG3 r").unwrap(),
            fen::from_fen("7/3BG3/7/3r23/3RG3/7/7 r").unwrap(),
            fen::from_fen("3r13/7/7/3RG3/7/7/3BG3 b").unwrap(),
        ];
        let config = Config {
            strategy: Strategy::AlphaBeta,
            null_move_pruning: false,
            late_move_reductions: false,
            aspiration_windows: false,
            ..Config::default()
        };
        for pos in positions {
            for depth in 1..=4 {
                let mut tt = TranspositionTable::new(1 << 12);
                let deadline = Instant::now() + Duration::from_secs(10);
                let mut ctx = SearchContext::new(&mut tt, &config, deadline);
                let searched = search::search(
                    &pos,
                    depth,
                    Value::MIN + 1,
                    Value::MAX - 1,
                    true,
                    0,
                    None,
                    &mut ctx,
                )
                .unwrap();
                assert_eq!(searched, naive_minimax(&pos, depth));
            }
        }
    }
}
