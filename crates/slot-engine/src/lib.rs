//! # slot-engine
//!
//! Quarter-hour availability for scheduling a single resource.
//!
//! A [`Day`] packs its 96 fifteen-minute slots and a small metadata region into
//! two 64-bit words, so reserving, releasing and checking a time range is a
//! handful of mask operations. A [`Month`] holds every day of one calendar
//! month and searches it for days (or whole weeks, when several weekdays are
//! required together) where a time window is free.
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::{Duration, Weekday};
//! use slot_engine::{Month, SearchCriteria};
//!
//! let mut month = Month::new(2025, 8).unwrap();
//! let criteria =
//!     SearchCriteria::from_times(Duration::hours(9), Duration::hours(11), [Weekday::Tue]).unwrap();
//!
//! assert_eq!(month.search(&criteria).len(), 4);
//!
//! month.day_mut(5).unwrap().reserve_block(criteria.range());
//! assert_eq!(month.search(&criteria).len(), 3);
//! ```
//!
//! ## Modules
//!
//! - [`timeblock`]: time of day to block index conversion, [`BlockRange`]
//! - [`day`]: the bit-packed day record
//! - [`month`]: a calendar month of days and the availability search
//! - [`criteria`]: the search criteria value object
//! - [`query`]: date-range queries spanning several months
//! - [`record`]: storage and wire representation of a day
//! - [`config`]: schedule scope configuration and change detection
//! - [`error`]: error types

pub mod config;
pub mod criteria;
pub mod day;
pub mod error;
pub mod month;
pub mod query;
pub mod record;
pub mod timeblock;

pub use config::{configuration_diff, ConfigDiff, ScheduleConfig};
pub use criteria::SearchCriteria;
pub use day::{Day, MetadataFlag, SlotBits, SLOTS_PER_DAY};
pub use error::SlotError;
pub use month::{days_in_month, Month};
pub use query::AvailabilityQuery;
pub use record::DayRecord;
pub use timeblock::{
    block_index_to_time, create_range_from_blocks, create_range_from_times, time_to_block_index,
    BlockRange,
};
