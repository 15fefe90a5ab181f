//! A calendar month of days and the availability search over it.
//!
//! Search picks one of three strategies from the number of required weekdays:
//!
//! - none: every day of the month whose window is free
//! - one: the same, restricted to that weekday
//! - several: whole Sunday-to-Saturday weeks in which every required weekday
//!   is free; a week whose required weekday falls in another month never
//!   qualifies

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::debug;

use crate::criteria::SearchCriteria;
use crate::day::Day;
use crate::error::{Result, SlotError};
use crate::timeblock::BlockRange;

/// Number of days in `month` of `year`, or `None` if `month` is not 1..=12.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(dates_of_month(first).count() as u32)
}

/// Dates from `first` to the end of its month. Never steps past the month, so
/// chrono's last representable month needs no date after it.
fn dates_of_month(first: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let month = first.month();
    first.iter_days().take_while(move |date| date.month() == month)
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        SlotError::Construction(format!("{}-{:02} is not a calendar month", year, month))
    })
}

/// Every day of one (year, month), in calendar order.
///
/// `days()[d]` is always calendar day `d + 1`; there are no gaps and no
/// duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Month {
    year: i32,
    month: u32,
    days: Vec<Day>,
}

impl Month {
    /// A month whose days are all free.
    ///
    /// # Errors
    /// Returns `SlotError::Construction` if `month` is not 1..=12 or the year
    /// is outside chrono's date range.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        let days = dates_of_month(first_of_month(year, month)?)
            .map(Day::new)
            .collect();
        Ok(Self { year, month, days })
    }

    /// Assemble a month from stored days.
    ///
    /// The days may arrive in any order and need not cover the whole month;
    /// dates with no stored day are filled in as free days.
    ///
    /// # Errors
    /// Returns `SlotError::Construction` if `days` is empty, mixes dates from
    /// more than one (year, month), or holds the same date twice.
    pub fn from_days(days: Vec<Day>) -> Result<Self> {
        let Some(first_given) = days.first() else {
            return Err(SlotError::Construction(
                "cannot assemble a month from an empty list of days".to_string(),
            ));
        };
        let (year, month) = (first_given.date().year(), first_given.date().month());
        let first = first_of_month(year, month)?;

        let mut slots: Vec<Option<Day>> = vec![None; dates_of_month(first).count()];
        for day in days {
            let date = day.date();
            if (date.year(), date.month()) != (year, month) {
                return Err(SlotError::Construction(format!(
                    "{} does not belong to {}-{:02}",
                    date, year, month
                )));
            }
            let slot = &mut slots[date.day0() as usize];
            if slot.is_some() {
                return Err(SlotError::Construction(format!("{} appears more than once", date)));
            }
            *slot = Some(day);
        }

        let days = slots
            .into_iter()
            .zip(dates_of_month(first))
            .map(|(day, date)| day.unwrap_or_else(|| Day::new(date)))
            .collect();
        Ok(Self { year, month, days })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_date(&self) -> NaiveDate {
        self.days[0].date()
    }

    pub fn last_date(&self) -> NaiveDate {
        self.days[self.days.len() - 1].date()
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn into_days(self) -> Vec<Day> {
        self.days
    }

    /// The day for `day_of_month` (1-based).
    pub fn day(&self, day_of_month: u32) -> Option<&Day> {
        let index = day_of_month.checked_sub(1)? as usize;
        self.days.get(index)
    }

    pub fn day_mut(&mut self, day_of_month: u32) -> Option<&mut Day> {
        let index = day_of_month.checked_sub(1)? as usize;
        self.days.get_mut(index)
    }

    /// The day for `date`, or `None` if `date` is outside this month.
    pub fn day_on(&self, date: NaiveDate) -> Option<&Day> {
        if (date.year(), date.month()) != (self.year, self.month) {
            return None;
        }
        self.days.get(date.day0() as usize)
    }

    /// Days on which the criteria's time window is free.
    ///
    /// Results are in calendar order. With two or more weekdays, days are
    /// grouped by week and, within a week, follow the order of
    /// [`SearchCriteria::weekdays`].
    pub fn search(&self, criteria: &SearchCriteria) -> Vec<&Day> {
        let range = criteria.range();
        let found = match criteria.weekdays() {
            [] => self.scan(range, |_| true),
            [weekday] => self.scan(range, |day| day.weekday() == *weekday),
            weekdays => self.search_weeks(range, weekdays),
        };
        debug!(
            year = self.year,
            month = self.month,
            weekdays = criteria.weekdays().len(),
            start_block = range.start_block(),
            blocks = range.block_count(),
            matches = found.len(),
            "month search"
        );
        found
    }

    fn scan<'a>(&'a self, range: &BlockRange, keep: impl Fn(&Day) -> bool) -> Vec<&'a Day> {
        self.days
            .iter()
            .filter(|day| keep(*day) && day.is_block_available(range))
            .collect()
    }

    /// Weeks are day offsets from the first of the month, never dates, so a
    /// week reaching past chrono's date range needs no date arithmetic.
    fn search_weeks(&self, range: &BlockRange, weekdays: &[Weekday]) -> Vec<&Day> {
        let lead = i64::from(self.first_date().weekday().num_days_from_sunday());
        let len = self.days.len() as i64;

        let mut found = Vec::new();
        let mut week_start = -lead;
        while week_start < len {
            if let Some(week) = self.qualifying_week(week_start, range, weekdays) {
                found.extend(week);
            }
            week_start += 7;
        }
        found
    }

    /// The required weekdays of the week whose Sunday is `week_start` days
    /// after the first of the month (negative for a week that began in the
    /// previous month), or `None` as soon as one of them is outside the month
    /// or not free.
    fn qualifying_week(
        &self,
        week_start: i64,
        range: &BlockRange,
        weekdays: &[Weekday],
    ) -> Option<Vec<&Day>> {
        weekdays
            .iter()
            .map(|weekday| {
                let offset = week_start + i64::from(weekday.num_days_from_sunday());
                let day = usize::try_from(offset).ok().and_then(|i| self.days.get(i))?;
                day.is_block_available(range).then_some(day)
            })
            .collect()
    }

    /// Reserve `range` on every day matching `weekdays` (every day when empty).
    ///
    /// Each day is attempted independently. Returns `false` if any day could
    /// not be reserved; days reserved before or after it stay reserved.
    pub fn reserve_schedule(&mut self, range: &BlockRange, weekdays: &[Weekday]) -> bool {
        let mut all_reserved = true;
        for day in self.scheduled_days(weekdays) {
            if !day.reserve_block(range) {
                debug!(
                    date = %day.date(),
                    start_block = range.start_block(),
                    "slot range already taken"
                );
                all_reserved = false;
            }
        }
        all_reserved
    }

    /// Release `range` on every day matching `weekdays` (every day when empty).
    pub fn free_schedule(&mut self, range: &BlockRange, weekdays: &[Weekday]) {
        for day in self.scheduled_days(weekdays) {
            day.free_block(range);
        }
    }

    fn scheduled_days<'a>(
        &'a mut self,
        weekdays: &'a [Weekday],
    ) -> impl Iterator<Item = &'a mut Day> {
        self.days
            .iter_mut()
            .filter(move |day| weekdays.is_empty() || weekdays.contains(&day.weekday()))
    }
}
