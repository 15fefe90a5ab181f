//! Storage and wire representation of a [`Day`].
//!
//! A stored day is its date, its two raw words and a redundant `isFree`
//! column that storage layers index on. The column is written from the day's
//! own flag and ignored when a record is turned back into a day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::day::Day;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    pub date: NaiveDate,
    #[serde(with = "decimal_u64")]
    pub bits_low: u64,
    #[serde(with = "decimal_u64")]
    pub bits_high: u64,
    pub is_free: bool,
}

impl From<&Day> for DayRecord {
    fn from(day: &Day) -> Self {
        Self {
            date: day.date(),
            bits_low: day.bits_low(),
            bits_high: day.bits_high(),
            is_free: day.is_free(),
        }
    }
}

impl From<DayRecord> for Day {
    fn from(record: DayRecord) -> Self {
        Day::from_raw(record.date, record.bits_low, record.bits_high)
    }
}

/// Serde adapter writing a `u64` as a decimal string, for formats whose
/// numbers cannot hold the full unsigned 64-bit range (JSON in JavaScript).
/// Reading accepts either a string or a plain number.
pub mod decimal_u64 {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Number(u64),
    }

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Text(text) => text.trim().parse().map_err(de::Error::custom),
            Repr::Number(value) => Ok(value),
        }
    }
}
