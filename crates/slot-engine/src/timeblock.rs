//! Conversion between time of day and quarter-hour block indices.
//!
//! A time of day is a [`Duration`] past midnight rather than a
//! [`NaiveTime`], because the end of the last block (24:00, the start of the
//! next date) must stay representable.
//!
//! Block ranges are inclusive on both ends, while their times are half-open:
//! blocks 36..=39 cover 09:00 up to (not including) 10:00.

use chrono::{Duration, NaiveTime, Timelike};

use crate::error::{Result, SlotError};

/// Length of one block in minutes.
pub const BLOCK_MINUTES: i64 = 15;

/// Number of blocks in a day.
pub const BLOCKS_PER_DAY: usize = 96;

const BLOCK_SECONDS: i64 = BLOCK_MINUTES * 60;
const LAST_BLOCK: i64 = BLOCKS_PER_DAY as i64 - 1;

/// An inclusive run of blocks together with its half-open time span.
///
/// Only constructible through [`create_range_from_blocks`] or
/// [`create_range_from_times`], so the blocks are always within `0..=95` and
/// ordered, and the times always agree with the blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockRange {
    start_block: usize,
    end_block: usize,
    start_time: Duration,
    end_time: Duration,
}

impl BlockRange {
    pub fn start_block(&self) -> usize {
        self.start_block
    }

    /// Last block of the range (inclusive).
    pub fn end_block(&self) -> usize {
        self.end_block
    }

    pub fn start_time(&self) -> Duration {
        self.start_time
    }

    /// End of the range (exclusive). Equals 24:00 when the range ends with block 95.
    pub fn end_time(&self) -> Duration {
        self.end_time
    }

    /// Number of blocks covered; never zero.
    pub fn block_count(&self) -> usize {
        self.end_block - self.start_block + 1
    }

    pub fn contains_block(&self, block: usize) -> bool {
        (self.start_block..=self.end_block).contains(&block)
    }
}

/// Block index containing `time`.
///
/// Times that are not on a 15-minute boundary are floored to the block they
/// fall in; the sub-block remainder is lost.
pub fn time_to_block_index(time: Duration) -> i64 {
    time.num_seconds().div_euclid(BLOCK_SECONDS)
}

/// Start time of block `block`. Block 96 yields 24:00.
pub fn block_index_to_time(block: i64) -> Duration {
    Duration::minutes(block * BLOCK_MINUTES)
}

/// Build a range covering blocks `start_block..=end_block`.
///
/// # Errors
/// Returns `SlotError::RangeBounds` if either block is outside `0..=95`.
/// Returns `SlotError::RangeOrder` if `start_block > end_block`.
pub fn create_range_from_blocks(start_block: i64, end_block: i64) -> Result<BlockRange> {
    for (which, block) in [("start", start_block), ("end", end_block)] {
        if !(0..=LAST_BLOCK).contains(&block) {
            return Err(SlotError::RangeBounds(format!(
                "{which} block {block} is outside 0..={LAST_BLOCK}"
            )));
        }
    }
    if start_block > end_block {
        return Err(SlotError::RangeOrder {
            start: start_block,
            end: end_block,
        });
    }

    Ok(BlockRange {
        start_block: start_block as usize,
        end_block: end_block as usize,
        start_time: block_index_to_time(start_block),
        end_time: block_index_to_time(end_block + 1),
    })
}

/// Build the block range covering the half-open span `start_time..end_time`.
///
/// An `end_time` on a block boundary belongs to the next block and is
/// excluded; an `end_time` inside a block sweeps that block in. This makes the
/// function the inverse of [`create_range_from_blocks`] for aligned times.
///
/// The returned range carries the block-aligned times, so 09:10..10:05 comes
/// back as 09:00..10:15.
///
/// # Errors
/// Same as [`create_range_from_blocks`] for the derived blocks; an empty span
/// (`start_time == end_time` on a boundary) is a `SlotError::RangeOrder`.
pub fn create_range_from_times(start_time: Duration, end_time: Duration) -> Result<BlockRange> {
    let start_block = time_to_block_index(start_time);
    let end_block = if is_block_aligned(end_time) {
        time_to_block_index(end_time) - 1
    } else {
        time_to_block_index(end_time)
    };
    create_range_from_blocks(start_block, end_block)
}

/// Whether `time` falls exactly on a 15-minute boundary.
pub fn is_block_aligned(time: Duration) -> bool {
    let whole_seconds = time.num_seconds();
    time == Duration::seconds(whole_seconds) && whole_seconds % BLOCK_SECONDS == 0
}

/// Offset of a wall-clock time from midnight.
pub fn time_of_day(time: NaiveTime) -> Duration {
    Duration::seconds(i64::from(time.num_seconds_from_midnight()))
        + Duration::nanoseconds(i64::from(time.nanosecond()))
}

/// Parse `HH:MM` or `HH:MM:SS` into a time of day. `24:00` is accepted as the
/// end of the day.
///
/// # Errors
/// Returns `SlotError::InvalidTime` for anything else.
pub fn parse_time_of_day(text: &str) -> Result<Duration> {
    let text = text.trim();
    if text == "24:00" || text == "24:00:00" {
        return Ok(Duration::hours(24));
    }
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .map(time_of_day)
        .map_err(|e| SlotError::InvalidTime(format!("'{}': {}", text, e)))
}

/// Render a time of day as `HH:MM`, with seconds only when present.
pub fn format_time_of_day(time: Duration) -> String {
    let total = time.num_seconds();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if seconds == 0 {
        format!("{:02}:{:02}", hours, minutes)
    } else {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Serde adapter storing a time of day as an `"HH:MM"` string.
pub mod hhmm {
    use chrono::Duration;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_time_of_day(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_time_of_day(&text).map_err(de::Error::custom)
    }
}
