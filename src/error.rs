//! The crate's error taxonomy.
//!
//! `IllegalMoveApplied`, `Timeout` and `Aborted` from the design are
//! deliberately not variants here: the first is a programmer error
//! (it panics via `debug_assert!` in `Position::apply_move` instead of
//! being returned), and the latter two are internal cancellation
//! signals that never cross the `Engine` façade (see `context::Aborted`).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid FEN string: {0}")]
    InvalidFen(String),

    #[error("illegal move string: {0}")]
    IllegalMoveString(String),
}
