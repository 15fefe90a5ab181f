//! Schedule scope configuration and change detection.
//!
//! A [`ScheduleConfig`] says which month of which resource is being viewed
//! and which window is being searched for. When it changes, the caller asks
//! [`configuration_diff`] whether the loaded days are still the right ones
//! or only the search has to be re-run. Reloading itself is left to the caller.

use chrono::{Duration, Weekday};
use serde::{Deserialize, Serialize};

use crate::criteria::SearchCriteria;
use crate::error::Result;
use crate::month::Month;
use crate::timeblock::hhmm;

fn start_of_day() -> Duration {
    Duration::zero()
}

fn end_of_day() -> Duration {
    Duration::hours(24)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleConfig {
    pub year: i32,
    pub month: u32,
    /// Opaque identifier of the scheduled resource, if any.
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(with = "hhmm", default = "start_of_day")]
    pub time_window_start: Duration,
    #[serde(with = "hhmm", default = "end_of_day")]
    pub time_window_end: Duration,
    #[serde(default)]
    pub required_weekdays: Vec<Weekday>,
}

impl ScheduleConfig {
    /// Whole-day window, no weekday constraint.
    pub fn new(year: i32, month: u32) -> Self {
        Self {
            year,
            month,
            resource: None,
            time_window_start: start_of_day(),
            time_window_end: end_of_day(),
            required_weekdays: Vec::new(),
        }
    }

    pub fn criteria(&self) -> Result<SearchCriteria> {
        SearchCriteria::from_times(
            self.time_window_start,
            self.time_window_end,
            self.required_weekdays.iter().copied(),
        )
    }

    /// A month of free days for the configured (year, month).
    pub fn empty_month(&self) -> Result<Month> {
        Month::new(self.year, self.month)
    }
}

/// What a configuration change invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDiff {
    /// The loaded days belong to a different month or resource.
    pub affects_scope: bool,
    /// Only the search window or weekdays changed.
    pub affects_criteria: bool,
}

pub fn configuration_diff(old: &ScheduleConfig, new: &ScheduleConfig) -> ConfigDiff {
    ConfigDiff {
        affects_scope: (old.year, old.month, &old.resource) != (new.year, new.month, &new.resource),
        affects_criteria: (old.time_window_start, old.time_window_end, &old.required_weekdays)
            != (new.time_window_start, new.time_window_end, &new.required_weekdays),
    }
}
