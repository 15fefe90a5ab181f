//! Tests for month construction and availability search.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use slot_engine::criteria::SearchCriteria;
use slot_engine::day::Day;
use slot_engine::error::SlotError;
use slot_engine::month::{days_in_month, Month};
use slot_engine::timeblock::create_range_from_times;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn hm(hours: i64, minutes: i64) -> Duration {
    Duration::hours(hours) + Duration::minutes(minutes)
}

fn criteria(start: Duration, end: Duration, weekdays: &[Weekday]) -> SearchCriteria {
    SearchCriteria::from_times(start, end, weekdays.iter().copied()).unwrap()
}

fn day_numbers(days: &[&Day]) -> Vec<u32> {
    days.iter().map(|d| d.date().day()).collect()
}

// ── Construction ────────────────────────────────────────────────────────────

#[test]
fn days_in_month_handles_leap_years() {
    assert_eq!(days_in_month(2024, 2), Some(29));
    assert_eq!(days_in_month(2025, 2), Some(28));
    assert_eq!(days_in_month(2025, 4), Some(30));
    assert_eq!(days_in_month(2025, 12), Some(31));
    assert_eq!(days_in_month(2025, 13), None);
    assert_eq!(days_in_month(2025, 0), None);
}

#[test]
fn new_month_is_ordered_and_free() {
    let month = Month::new(2025, 8).unwrap();
    assert_eq!(month.days().len(), 31);
    assert_eq!(month.first_date(), date(2025, 8, 1));
    assert_eq!(month.last_date(), date(2025, 8, 31));
    for (index, day) in month.days().iter().enumerate() {
        assert_eq!(day.date().day0() as usize, index);
        assert!(day.is_free());
    }
}

#[test]
fn invalid_month_number_is_rejected() {
    assert!(matches!(Month::new(2025, 13), Err(SlotError::Construction(_))));
}

#[test]
fn day_lookup_is_one_based() {
    let month = Month::new(2025, 8).unwrap();
    assert_eq!(month.day(1).unwrap().date(), date(2025, 8, 1));
    assert_eq!(month.day(31).unwrap().date(), date(2025, 8, 31));
    assert!(month.day(0).is_none());
    assert!(month.day(32).is_none());
    assert!(month.day_on(date(2025, 9, 1)).is_none());
    assert_eq!(month.day_on(date(2025, 8, 9)).unwrap().date(), date(2025, 8, 9));
}

#[test]
fn from_days_rejects_empty_list() {
    let err = Month::from_days(Vec::new()).unwrap_err();
    assert!(matches!(err, SlotError::Construction(_)));
}

#[test]
fn from_days_rejects_mixed_months() {
    let days = vec![Day::new(date(2025, 8, 31)), Day::new(date(2025, 9, 1))];
    let err = Month::from_days(days).unwrap_err();
    assert!(matches!(err, SlotError::Construction(_)));
}

#[test]
fn from_days_rejects_same_month_of_another_year() {
    let days = vec![Day::new(date(2025, 8, 1)), Day::new(date(2024, 8, 2))];
    assert!(Month::from_days(days).is_err());
}

#[test]
fn from_days_rejects_duplicate_dates() {
    let days = vec![Day::new(date(2025, 8, 3)), Day::new(date(2025, 8, 3))];
    let err = Month::from_days(days).unwrap_err();
    assert!(matches!(err, SlotError::Construction(_)));
}

#[test]
fn from_days_orders_and_fills_a_partial_list() {
    let mut busy = Day::new(date(2025, 8, 15));
    busy.reserve_range(40, 4).unwrap();
    let days = vec![busy.clone(), Day::new(date(2025, 8, 2))];

    let month = Month::from_days(days).unwrap();
    assert_eq!((month.year(), month.month()), (2025, 8));
    assert_eq!(month.days().len(), 31);
    assert_eq!(month.day(15), Some(&busy));
    assert!(month.days().iter().filter(|d| d.date().day() != 15).all(Day::is_free));
    assert!(month
        .days()
        .windows(2)
        .all(|pair| pair[0].date() < pair[1].date()));
}

// ── Search: no weekday constraint ───────────────────────────────────────────

#[test]
fn unconstrained_search_returns_every_free_day() {
    let mut month = Month::new(2025, 8).unwrap();
    let window = criteria(hm(10, 0), hm(11, 0), &[]);
    assert_eq!(month.search(&window).len(), 31);

    month.day_mut(15).unwrap().reserve_block(window.range());

    let found = month.search(&window);
    assert_eq!(found.len(), 30);
    assert!(!day_numbers(&found).contains(&15));
}

#[test]
fn partially_overlapping_reservation_excludes_the_day() {
    let mut month = Month::new(2025, 8).unwrap();
    let busy = create_range_from_times(hm(10, 30), hm(10, 45)).unwrap();
    month.day_mut(3).unwrap().reserve_block(&busy);

    let found = month.search(&criteria(hm(10, 0), hm(11, 0), &[]));
    assert!(!day_numbers(&found).contains(&3));

    let found = month.search(&criteria(hm(11, 0), hm(12, 0), &[]));
    assert!(day_numbers(&found).contains(&3));
}

// ── Search: one weekday ─────────────────────────────────────────────────────

#[test]
fn single_weekday_search_keeps_that_weekday_only() {
    let month = Month::new(2025, 8).unwrap();
    let found = month.search(&criteria(hm(9, 0), hm(10, 0), &[Weekday::Fri]));
    assert_eq!(day_numbers(&found), vec![1, 8, 15, 22, 29]);
}

#[test]
fn duplicated_weekday_behaves_like_a_single_one() {
    let month = Month::new(2025, 8).unwrap();
    let window = criteria(hm(9, 0), hm(10, 0), &[Weekday::Tue, Weekday::Tue]);
    assert_eq!(window.weekdays(), &[Weekday::Tue]);
    assert_eq!(day_numbers(&month.search(&window)), vec![5, 12, 19, 26]);
}

// ── Search: several weekdays ────────────────────────────────────────────────

#[test]
fn tuesday_thursday_weeks_in_august() {
    let mut month = Month::new(2025, 8).unwrap();
    let window = criteria(hm(9, 0), hm(11, 0), &[Weekday::Tue, Weekday::Thu]);

    let found = month.search(&window);
    assert_eq!(day_numbers(&found), vec![5, 7, 12, 14, 19, 21, 26, 28]);

    month.day_mut(5).unwrap().reserve_block(window.range());

    let found = month.search(&window);
    assert_eq!(day_numbers(&found), vec![12, 14, 19, 21, 26, 28]);
}

#[test]
fn weekday_order_within_a_week_follows_criteria() {
    let month = Month::new(2025, 8).unwrap();
    let window = criteria(hm(9, 0), hm(11, 0), &[Weekday::Thu, Weekday::Tue]);
    assert_eq!(
        day_numbers(&month.search(&window)),
        vec![7, 5, 14, 12, 21, 19, 28, 26]
    );
}

#[test]
fn weeks_crossing_the_month_boundary_are_disqualified() {
    // 2025-08-01 is a Friday whose Monday is in July; 2025-08-31 is a Sunday
    // whose Monday is in September.
    let month = Month::new(2025, 8).unwrap();
    let window = criteria(hm(9, 0), hm(10, 0), &[Weekday::Mon, Weekday::Fri]);
    assert_eq!(
        day_numbers(&month.search(&window)),
        vec![4, 8, 11, 15, 18, 22, 25, 29]
    );
}

#[test]
fn month_starting_on_sunday_has_only_whole_weeks() {
    // February 2026 runs Sunday the 1st to Saturday the 28th.
    let month = Month::new(2026, 2).unwrap();
    let window = criteria(hm(8, 0), hm(9, 0), &[Weekday::Sun, Weekday::Sat]);
    assert_eq!(
        day_numbers(&month.search(&window)),
        vec![1, 7, 8, 14, 15, 21, 22, 28]
    );
}

#[test]
fn a_busy_day_removes_only_its_own_week() {
    let mut month = Month::new(2025, 8).unwrap();
    let window = criteria(hm(14, 0), hm(15, 0), &[Weekday::Mon, Weekday::Wed, Weekday::Fri]);
    month.day_mut(13).unwrap().reserve_block(window.range());

    assert_eq!(
        day_numbers(&month.search(&window)),
        vec![4, 6, 8, 18, 20, 22, 25, 27, 29]
    );
}

#[test]
fn reservation_outside_the_window_does_not_disqualify() {
    let mut month = Month::new(2025, 8).unwrap();
    let morning = create_range_from_times(hm(7, 0), hm(8, 0)).unwrap();
    month.day_mut(5).unwrap().reserve_block(&morning);

    let window = criteria(hm(9, 0), hm(11, 0), &[Weekday::Tue, Weekday::Thu]);
    assert_eq!(month.search(&window).len(), 8);
}

// ── Batch schedules ─────────────────────────────────────────────────────────

#[test]
fn reserve_schedule_reports_failures_without_rollback() {
    let mut month = Month::new(2025, 8).unwrap();
    let range = create_range_from_times(hm(9, 0), hm(11, 0)).unwrap();
    let clash = create_range_from_times(hm(10, 0), hm(10, 15)).unwrap();
    month.day_mut(12).unwrap().reserve_block(&clash);

    assert!(!month.reserve_schedule(&range, &[Weekday::Tue]));

    for day_of_month in [5, 19, 26] {
        let day = month.day(day_of_month).unwrap();
        assert!(!day.is_block_available(&range), "day {} should be reserved", day_of_month);
    }
    let clashing = month.day(12).unwrap();
    assert_eq!(clashing.reserved_slot_count(), 1);
    assert!(month.day(6).unwrap().is_free());
}

#[test]
fn reserve_schedule_without_weekdays_covers_every_day() {
    let mut month = Month::new(2025, 2).unwrap();
    let range = create_range_from_times(hm(12, 0), hm(13, 0)).unwrap();

    assert!(month.reserve_schedule(&range, &[]));
    assert!(month.days().iter().all(|d| d.reserved_slot_count() == 4));
    assert!(month.search(&criteria(hm(12, 0), hm(12, 15), &[])).is_empty());

    month.free_schedule(&range, &[]);
    assert!(month.days().iter().all(Day::is_free));
}

// ── Edges of the representable date range ───────────────────────────────────

#[test]
fn last_representable_month_is_complete() {
    let last = NaiveDate::MAX;
    assert_eq!(days_in_month(last.year(), last.month()), Some(31));

    let month = Month::new(last.year(), last.month()).unwrap();
    assert_eq!(month.days().len(), 31);
    assert_eq!(month.first_date(), date(last.year(), last.month(), 1));
    assert_eq!(month.last_date(), last);
}

#[test]
fn from_days_fills_the_last_representable_month() {
    let last = NaiveDate::MAX;
    let mut stored = Day::new(date(last.year(), last.month(), 5));
    stored.reserve_range(36, 4).unwrap();

    let month = Month::from_days(vec![stored.clone()]).unwrap();
    assert_eq!(month.days().len(), 31);
    assert_eq!(month.day(5), Some(&stored));
    assert_eq!(month.last_date(), last);
}

#[test]
fn week_search_works_at_both_ends_of_the_date_range() {
    let window = criteria(hm(9, 0), hm(10, 0), &[Weekday::Mon, Weekday::Fri]);
    for edge in [NaiveDate::MIN, NaiveDate::MAX] {
        let month = Month::new(edge.year(), edge.month()).unwrap();
        let found = month.search(&window);

        assert!(!found.is_empty(), "no weeks found around {}", edge);
        assert_eq!(found.len() % 2, 0);
        for pair in found.chunks(2) {
            assert_eq!(pair[0].weekday(), Weekday::Mon);
            assert_eq!(pair[1].weekday(), Weekday::Fri);
            assert_eq!(pair[1].date() - pair[0].date(), Duration::days(4));
        }
    }
}
