//! Search criteria for month availability queries.

use chrono::{Duration, Weekday};

use crate::error::Result;
use crate::timeblock::{create_range_from_times, BlockRange};

/// A time-of-day window plus the weekdays it must be free on.
///
/// An empty weekday list means "any day". Weekdays keep the order they were
/// given in, which is also the order matching days are reported within a
/// week; a repeated weekday is dropped after its first occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    range: BlockRange,
    weekdays: Vec<Weekday>,
}

impl SearchCriteria {
    pub fn new(range: BlockRange, weekdays: impl IntoIterator<Item = Weekday>) -> Self {
        let mut unique = Vec::new();
        for weekday in weekdays {
            if !unique.contains(&weekday) {
                unique.push(weekday);
            }
        }
        Self {
            range,
            weekdays: unique,
        }
    }

    /// Criteria for the half-open window `start..end`, see
    /// [`create_range_from_times`] for how the window maps to blocks.
    pub fn from_times(
        start: Duration,
        end: Duration,
        weekdays: impl IntoIterator<Item = Weekday>,
    ) -> Result<Self> {
        Ok(Self::new(create_range_from_times(start, end)?, weekdays))
    }

    pub fn range(&self) -> &BlockRange {
        &self.range
    }

    pub fn weekdays(&self) -> &[Weekday] {
        &self.weekdays
    }

    pub fn start_block(&self) -> usize {
        self.range.start_block()
    }

    pub fn block_count(&self) -> usize {
        self.range.block_count()
    }
}
