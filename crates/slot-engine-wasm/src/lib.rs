//! WASM bindings for slot-engine.
//!
//! Exposes block range construction, month availability search and single-day
//! reservation to JavaScript via `wasm-bindgen`. Complex values cross the
//! boundary as JSON strings. Days travel as storage records whose 64-bit words
//! are decimal strings, since a JavaScript number cannot hold them exactly.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p slot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/slot-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/slot_engine_wasm.wasm
//! ```

use chrono::{Duration, Weekday};
use serde::{Deserialize, Serialize};
use slot_engine::timeblock::{hhmm, BlockRange};
use slot_engine::{Day, DayRecord, Month, SearchCriteria};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BlockRangeDto {
    start_block: usize,
    end_block: usize,
    block_count: usize,
    #[serde(with = "hhmm")]
    start_time: Duration,
    #[serde(with = "hhmm")]
    end_time: Duration,
}

impl From<&BlockRange> for BlockRangeDto {
    fn from(range: &BlockRange) -> Self {
        Self {
            start_block: range.start_block(),
            end_block: range.end_block(),
            block_count: range.block_count(),
            start_time: range.start_time(),
            end_time: range.end_time(),
        }
    }
}

/// Search input passed from JavaScript.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CriteriaInput {
    #[serde(with = "hhmm")]
    time_window_start: Duration,
    #[serde(with = "hhmm")]
    time_window_end: Duration,
    #[serde(default)]
    required_weekdays: Vec<Weekday>,
}

#[derive(Serialize)]
struct ReserveResultDto {
    reserved: bool,
    day: DayRecord,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Build an inclusive block range from two block indices (0-95).
///
/// Returns a JSON object `{startBlock, endBlock, blockCount, startTime, endTime}`
/// with `HH:MM` times; `endTime` is exclusive.
#[wasm_bindgen(js_name = "createRangeFromBlocks")]
pub fn create_range_from_blocks(start_block: i32, end_block: i32) -> Result<String, JsValue> {
    let range = slot_engine::create_range_from_blocks(i64::from(start_block), i64::from(end_block))
        .map_err(to_js)?;
    to_json(&BlockRangeDto::from(&range))
}

/// Build the block range covering `start..end`, both `HH:MM` (end may be `24:00`).
#[wasm_bindgen(js_name = "createRangeFromTimes")]
pub fn create_range_from_times(start: &str, end: &str) -> Result<String, JsValue> {
    let start = slot_engine::timeblock::parse_time_of_day(start).map_err(to_js)?;
    let end = slot_engine::timeblock::parse_time_of_day(end).map_err(to_js)?;
    let range = slot_engine::create_range_from_times(start, end).map_err(to_js)?;
    to_json(&BlockRangeDto::from(&range))
}

/// Search a month for days where a time window is free.
///
/// `days_json` is a JSON array of day records (`{date, bitsLow, bitsHigh,
/// isFree}`) from a single month; missing dates count as free.
/// `criteria_json` is `{timeWindowStart, timeWindowEnd, requiredWeekdays?}`.
/// Returns the matching day records as a JSON array.
#[wasm_bindgen(js_name = "searchMonth")]
pub fn search_month(days_json: &str, criteria_json: &str) -> Result<String, JsValue> {
    let records: Vec<DayRecord> = serde_json::from_str(days_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid days JSON: {}", e)))?;
    let input: CriteriaInput = serde_json::from_str(criteria_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid criteria JSON: {}", e)))?;

    let month = Month::from_days(records.into_iter().map(Day::from).collect()).map_err(to_js)?;
    let criteria = SearchCriteria::from_times(
        input.time_window_start,
        input.time_window_end,
        input.required_weekdays,
    )
    .map_err(to_js)?;

    let found: Vec<DayRecord> = month.search(&criteria).into_iter().map(DayRecord::from).collect();
    to_json(&found)
}

/// Reserve `length` slots from `start_slot` on a single day record.
///
/// Returns `{reserved, day}`: `reserved` is false (and `day` unchanged) when
/// any slot was already taken.
#[wasm_bindgen(js_name = "reserveRange")]
pub fn reserve_range(day_json: &str, start_slot: u32, length: u32) -> Result<String, JsValue> {
    let record: DayRecord = serde_json::from_str(day_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid day JSON: {}", e)))?;
    let mut day = Day::from(record);
    let reserved = day
        .reserve_range(start_slot as usize, length as usize)
        .map_err(to_js)?;
    to_json(&ReserveResultDto {
        reserved,
        day: DayRecord::from(&day),
    })
}
