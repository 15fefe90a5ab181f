//! Tests for the storage and wire representation of a day.

use chrono::NaiveDate;
use slot_engine::day::Day;
use slot_engine::record::DayRecord;

fn busy_day() -> Day {
    let mut day = Day::new(NaiveDate::from_ymd_opt(2025, 8, 5).unwrap());
    day.reserve_range(0, 64).unwrap();
    day.reserve_range(94, 2).unwrap();
    day
}

#[test]
fn record_carries_raw_words_and_free_column() {
    let record = DayRecord::from(&busy_day());
    assert_eq!(record.bits_low, u64::MAX);
    assert_eq!(record.bits_high, 0b11 << 30);
    assert!(!record.is_free);
}

#[test]
fn words_are_written_as_decimal_strings() {
    let json = serde_json::to_value(DayRecord::from(&busy_day())).unwrap();
    assert_eq!(json["date"], "2025-08-05");
    assert_eq!(json["bitsLow"], "18446744073709551615");
    assert_eq!(json["bitsHigh"], "3221225472");
    assert_eq!(json["isFree"], false);
}

#[test]
fn words_are_read_from_strings_or_numbers() {
    let json = r#"[
        {"date":"2025-08-05","bitsLow":"18446744073709551615","bitsHigh":"3221225472","isFree":false},
        {"date":"2025-08-06","bitsLow":0,"bitsHigh":4294967296,"isFree":true}
    ]"#;
    let records: Vec<DayRecord> = serde_json::from_str(json).unwrap();
    let days: Vec<Day> = records.into_iter().map(Day::from).collect();

    assert_eq!(days[0], busy_day());
    assert!(days[1].is_free());
}

#[test]
fn free_column_is_not_cross_checked() {
    let record = DayRecord {
        date: NaiveDate::from_ymd_opt(2025, 8, 5).unwrap(),
        bits_low: 0,
        bits_high: 0,
        is_free: true,
    };
    let day = Day::from(record);
    assert!(!day.is_free());
    assert!(day.is_range_available(0, 96).unwrap());
}

#[test]
fn malformed_word_is_rejected() {
    let json = r#"{"date":"2025-08-05","bitsLow":"-1","bitsHigh":"0","isFree":true}"#;
    assert!(serde_json::from_str::<DayRecord>(json).is_err());
}
