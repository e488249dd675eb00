//! The public façade: `Engine`, its `Config`, and `Statistics`.
//!
//! This is the crate's only public entry point into search. It owns
//! the transposition table and the ordering tables across iterative
//! deepening calls (and, if the caller does not clear them, across
//! separate `best_move` calls too — see `Config` for retention
//! policy), exactly the state the source scattered across static
//! globals (§9 of the design notes this crate was built against).

use std::time::{Duration, Instant};

use crate::basetypes::Depth;
use crate::context::SearchContext;
use crate::deepening::iterative_deepen;
use crate::moves::{Move, MoveList};
use crate::movegen;
use crate::position::Position;
use crate::tt::{TranspositionTable, DEFAULT_TT_CAPACITY};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    AlphaBeta,
    AlphaBetaQuiescence,
    Pvs,
    PvsQuiescence,
}

impl Default for Strategy {
    fn default() -> Strategy {
        Strategy::PvsQuiescence
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub strategy: Strategy,
    pub tt_capacity: usize,
    pub max_depth: u16,
    pub aspiration_windows: bool,
    pub null_move_pruning: bool,
    pub late_move_reductions: bool,
    pub quiescence_max_depth: u16,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            strategy: Strategy::default(),
            tt_capacity: DEFAULT_TT_CAPACITY,
            max_depth: 99,
            aspiration_windows: true,
            null_move_pruning: true,
            late_move_reductions: true,
            quiescence_max_depth: 8,
        }
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct Statistics {
    pub nodes: u64,
    pub q_nodes: u64,
    pub tt_hits: u64,
    pub tt_misses: u64,
    pub depth_reached: u16,
    pub elapsed_ms: u64,
    pub best_move: Option<Move>,
}

pub struct Engine {
    config: Config,
    tt: TranspositionTable,
    statistics: Statistics,
}

impl Engine {
    pub fn new(config: Config) -> Engine {
        let tt_capacity = config.tt_capacity.max(crate::tt::MIN_TT_CAPACITY);
        Engine {
            config,
            tt: TranspositionTable::new(tt_capacity),
            statistics: Statistics::default(),
        }
    }

    /// The tournament entry point: searches within `time_ms` and
    /// returns a legal move. Never panics for a non-terminal position
    /// with at least one legal move, even for `time_ms == 0`.
    pub fn best_move(&mut self, pos: &Position, time_ms: u64) -> Move {
        self.search_for(pos, self.config.max_depth as Depth, Duration::from_millis(time_ms))
    }

    /// Debug/test entry point: searches to a fixed depth, bounded by
    /// `time_ms` as a safety net.
    pub fn best_move_with_depth(&mut self, pos: &Position, depth: u16, time_ms: u64) -> Move {
        self.search_for(pos, depth as Depth, Duration::from_millis(time_ms))
    }

    fn search_for(&mut self, pos: &Position, max_depth: Depth, budget: Duration) -> Move {
        let legal = movegen::generate(pos);
        if legal.is_empty() {
            // NoLegalMoves: never fabricate a move the generator did
            // not produce. `Move::pass` is a documented sentinel
            // (`from == to`), distinguishable from any real move.
            let anchor = pos.guard_square(pos.side_to_move()).unwrap_or(0);
            return Move::pass(anchor);
        }

        let start = Instant::now();
        let mut ctx = SearchContext::new(&mut self.tt, &self.config, start + budget);
        let outcome = iterative_deepen(pos, max_depth, start, budget, &mut ctx);

        self.statistics = Statistics {
            nodes: ctx.nodes,
            q_nodes: ctx.q_nodes,
            tt_hits: ctx.tt_hits,
            tt_misses: ctx.tt_misses,
            depth_reached: outcome.depth_reached.max(0) as u16,
            elapsed_ms: start.elapsed().as_millis() as u64,
            best_move: Some(outcome.best_move),
        };
        outcome.best_move
    }

    pub fn clear_tables(&mut self) {
        self.tt.clear();
    }

    pub fn statistics(&self) -> Statistics {
        self.statistics
    }

    pub fn legal_moves(&self, pos: &Position) -> MoveList {
        movegen::generate(pos)
    }
}
