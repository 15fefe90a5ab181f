//! Date-range availability queries spanning one or more months.
//!
//! [`Month::search`] works on a single calendar month. An
//! [`AvailabilityQuery`] names an arbitrary date range; it is answered by
//! searching every covered month the caller has loaded and keeping the days
//! inside the range.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::criteria::SearchCriteria;
use crate::day::Day;
use crate::error::Result;
use crate::month::Month;
use crate::timeblock::hhmm;

/// An availability request as received from a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub date_range_start: NaiveDate,
    /// Inclusive.
    pub date_range_end: NaiveDate,
    #[serde(default)]
    pub required_weekdays: Vec<Weekday>,
    #[serde(with = "hhmm")]
    pub time_window_start: Duration,
    #[serde(with = "hhmm")]
    pub time_window_end: Duration,
}

impl AvailabilityQuery {
    pub fn criteria(&self) -> Result<SearchCriteria> {
        SearchCriteria::from_times(
            self.time_window_start,
            self.time_window_end,
            self.required_weekdays.iter().copied(),
        )
    }

    /// Every (year, month) the date range touches, in calendar order.
    /// Empty when the range is inverted.
    pub fn months(&self) -> Vec<(i32, u32)> {
        let mut covered = Vec::new();
        if self.date_range_start > self.date_range_end {
            return covered;
        }
        let last = (self.date_range_end.year(), self.date_range_end.month());
        let (mut year, mut month) = (self.date_range_start.year(), self.date_range_start.month());
        while (year, month) <= last {
            covered.push((year, month));
            if month == 12 {
                year += 1;
                month = 1;
            } else {
                month += 1;
            }
        }
        covered
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.date_range_start <= date && date <= self.date_range_end
    }

    /// Search each covered month found in `months` and keep days in range.
    ///
    /// Months are visited in calendar order regardless of their order in
    /// `months`. A covered month missing from `months` contributes nothing.
    /// Weeks are evaluated per month before the range filter is applied, so a
    /// multi-weekday week cut by the range may contribute only some of its days.
    ///
    /// # Errors
    /// Returns the time window's validation error, see [`SearchCriteria::from_times`].
    pub fn run<'a>(&self, months: &'a [Month]) -> Result<Vec<&'a Day>> {
        let criteria = self.criteria()?;
        let mut found = Vec::new();
        for (year, month) in self.months() {
            let Some(loaded) = months
                .iter()
                .find(|m| m.year() == year && m.month() == month)
            else {
                debug!(year, month, "month not loaded, skipping");
                continue;
            };
            found.extend(
                loaded
                    .search(&criteria)
                    .into_iter()
                    .filter(|day| self.contains(day.date())),
            );
        }
        Ok(found)
    }
}
