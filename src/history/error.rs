use thiserror::Error;

use crate::config::{INPUT_BUFSIZE, MAX_BLOCKS, MAX_ENTRY_BLOCKS};

pub type Result<T> = std::result::Result<T, HistoryError>;

/// Failures reported by the history store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// Not enough free blocks; absorbed by eviction inside `save`.
    #[error("history arena has {free} free blocks, {requested} needed")]
    InsufficientSpace { requested: usize, free: usize },

    #[error("cannot allocate {0} blocks, an entry holds 1 to {max}", max = MAX_ENTRY_BLOCKS)]
    InvalidBlockCount(usize),

    #[error("line of {0} characters exceeds the {limit} character limit", limit = INPUT_BUFSIZE)]
    LineTooLong(usize),

    #[error("history index {index} out of range, expected 1..={max}")]
    IndexOutOfRange { index: usize, max: usize },

    #[error("history is empty")]
    EmptyList,

    #[error("block {0} is outside the arena (0..{blocks})", blocks = MAX_BLOCKS)]
    OutOfRange(usize),

    #[error("block {0} is already free")]
    DoubleFree(usize),
}
