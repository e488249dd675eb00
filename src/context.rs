//! Shared mutable state threaded through one `best_move` call:
//! the transposition table, ordering tables, counters, and the
//! deadline used for cooperative cancellation.
//!
//! This is the re-architected replacement for the source's family of
//! process-wide static tables: one `SearchContext` is built fresh (or
//! reused, if the caller opts in) per top-level call and passed by
//! mutable reference into every recursive frame.

use std::time::Instant;

use crate::basetypes::NodeCount;
use crate::engine::Config;
use crate::moves::Move;
use crate::ordering::{HistoryTable, KillerTable};
use crate::tt::TranspositionTable;

/// A cooperative cancellation signal. No frame may write the
/// transposition table with a score derived from a subtree that
/// returned this.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Aborted;

pub type SearchResult<T> = Result<T, Aborted>;

pub struct SearchContext<'a> {
    pub tt: &'a mut TranspositionTable,
    pub killers: KillerTable,
    pub history: HistoryTable,
    pub config: &'a Config,
    pub nodes: NodeCount,
    pub q_nodes: NodeCount,
    pub tt_hits: NodeCount,
    pub tt_misses: NodeCount,
    deadline: Instant,
    root_move_counter: u32,
}

/// How often (in root moves tried) the deadline is polled, beyond the
/// unconditional checks at every `search`/`quiescence` entry.
const ROOT_POLL_INTERVAL: u32 = 5;

impl<'a> SearchContext<'a> {
    pub fn new(tt: &'a mut TranspositionTable, config: &'a Config, deadline: Instant) -> SearchContext<'a> {
        SearchContext {
            tt,
            killers: KillerTable::new(),
            history: HistoryTable::new(),
            config,
            nodes: 0,
            q_nodes: 0,
            tt_hits: 0,
            tt_misses: 0,
            deadline,
            root_move_counter: 0,
        }
    }

    pub fn set_deadline(&mut self, deadline: Instant) {
        self.deadline = deadline;
    }

    /// Cheap abort check, called at the entry of `search` and
    /// `quiescence`.
    #[inline(always)]
    pub fn check_abort(&self) -> SearchResult<()> {
        if Instant::now() >= self.deadline {
            Err(Aborted)
        } else {
            Ok(())
        }
    }

    /// Polled every `ROOT_POLL_INTERVAL`-th root move, in addition to
    /// the unconditional per-node check.
    pub fn poll_root(&mut self) -> SearchResult<()> {
        self.root_move_counter += 1;
        if self.root_move_counter % ROOT_POLL_INTERVAL == 0 {
            self.check_abort()
        } else {
            Ok(())
        }
    }

    pub fn record_cutoff(&mut self, mv: Move, ply: usize, depth: i8, is_quiet: bool) {
        if is_quiet {
            self.killers.record(ply, mv);
            self.history.record(mv, depth);
        }
    }
}
