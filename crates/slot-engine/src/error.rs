//! Error types for slot-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    /// A slot index, block index or slot count falls outside the day.
    #[error("Range out of bounds: {0}")]
    RangeBounds(String),

    #[error("Invalid range order: start block {start} is after end block {end}")]
    RangeOrder { start: i64, end: i64 },

    /// A month could not be assembled from the supplied days.
    #[error("Invalid month: {0}")]
    Construction(String),

    #[error("Invalid time of day: {0}")]
    InvalidTime(String),
}

pub type Result<T> = std::result::Result<T, SlotError>;
