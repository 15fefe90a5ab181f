//! `slots` CLI: block ranges, month availability search and day export.
//!
//! A month plan is a JSON file naming the month, an optional default search
//! window, stored days and reservations to apply before searching.
//!
//! ## Usage
//!
//! ```sh
//! # Blocks covered by a time window
//! slots range --start 09:00 --end 10:00
//!
//! # Times covered by a block range
//! slots range --start-block 36 --end-block 39
//!
//! # Tuesdays and Thursdays free 09:00-11:00, whole weeks only
//! slots search -i august.json --start 09:00 --end 11:00 --weekdays tue,thu
//!
//! # Same search restricted to a date range
//! slots search -i august.json --from 2025-08-10 --to 2025-08-20
//!
//! # Days as storage records (64-bit words as decimal strings)
//! slots export -i august.json -o days.json
//!
//! # Does switching plans require reloading day data?
//! slots diff --old august.json --new september.json
//! ```
//!
//! ## Plan format
//!
//! ```json
//! {
//!   "year": 2025,
//!   "month": 8,
//!   "timeWindowStart": "09:00",
//!   "timeWindowEnd": "11:00",
//!   "requiredWeekdays": ["Tue", "Thu"],
//!   "days": [{"date": "2025-08-20", "bitsLow": "0", "bitsHigh": "4294967296", "isFree": true}],
//!   "reservations": [{"day": 5, "start": "09:30", "end": "10:00"}],
//!   "schedules": [{"start": "12:00", "end": "13:00", "weekdays": ["Mon", "Fri"]}]
//! }
//! ```

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Weekday};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use slot_engine::timeblock::{self, hhmm, BlockRange};
use slot_engine::{
    configuration_diff, create_range_from_blocks, create_range_from_times, AvailabilityQuery, Day,
    DayRecord, Month, ScheduleConfig, SearchCriteria,
};
use std::io::{self, Read};
use tracing::{debug, warn, Level};

#[derive(Parser)]
#[command(name = "slots", version, about = "Quarter-hour availability CLI")]
struct Cli {
    /// Log more detail to stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the block range for a time window or the times for a block range
    Range {
        /// Window start, HH:MM
        #[arg(long, requires = "end", conflicts_with_all = ["start_block", "end_block"])]
        start: Option<String>,
        /// Window end (exclusive), HH:MM or 24:00
        #[arg(long, requires = "start")]
        end: Option<String>,
        /// First block, 0-95
        #[arg(long, requires = "end_block", allow_negative_numbers = true)]
        start_block: Option<i64>,
        /// Last block (inclusive), 0-95
        #[arg(long, requires = "start_block", allow_negative_numbers = true)]
        end_block: Option<i64>,
    },
    /// Find days in a month plan where a time window is free
    Search {
        /// Month plan file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Window start, HH:MM (defaults to the plan's window)
        #[arg(long)]
        start: Option<String>,
        /// Window end (exclusive), HH:MM or 24:00 (defaults to the plan's window)
        #[arg(long)]
        end: Option<String>,
        /// Comma-separated weekdays that must all be free in the same week
        #[arg(long, value_delimiter = ',')]
        weekdays: Vec<String>,
        /// Only report days on or after this date
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        /// Only report days on or before this date
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },
    /// Write every day of a month plan as storage records
    Export {
        /// Month plan file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Compare two plans and report whether day data must be reloaded
    Diff {
        #[arg(long)]
        old: String,
        #[arg(long)]
        new: String,
    },
}

/// A month plan as read from JSON.
#[derive(Deserialize)]
struct MonthPlan {
    #[serde(flatten)]
    config: ScheduleConfig,
    /// Previously stored days; missing dates start free.
    #[serde(default)]
    days: Vec<DayRecord>,
    #[serde(default)]
    reservations: Vec<Reservation>,
    #[serde(default)]
    schedules: Vec<Schedule>,
}

/// A one-off reservation on a single day of the month.
#[derive(Deserialize)]
struct Reservation {
    day: u32,
    #[serde(with = "hhmm")]
    start: Duration,
    #[serde(with = "hhmm")]
    end: Duration,
}

/// A reservation repeated on every matching weekday (every day if none).
#[derive(Deserialize)]
struct Schedule {
    #[serde(with = "hhmm")]
    start: Duration,
    #[serde(with = "hhmm")]
    end: Duration,
    #[serde(default)]
    weekdays: Vec<Weekday>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RangeView {
    start_block: usize,
    end_block: usize,
    block_count: usize,
    #[serde(with = "hhmm")]
    start_time: Duration,
    #[serde(with = "hhmm")]
    end_time: Duration,
}

impl From<&BlockRange> for RangeView {
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

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Range {
            start,
            end,
            start_block,
            end_block,
        } => {
            let range = match (start, end, start_block, end_block) {
                (Some(start), Some(end), _, _) => {
                    create_range_from_times(parse_time(&start)?, parse_time(&end)?)
                        .context("Invalid time window")?
                }
                (_, _, Some(start_block), Some(end_block)) => {
                    create_range_from_blocks(start_block, end_block)
                        .context("Invalid block range")?
                }
                _ => anyhow::bail!("Give either --start/--end or --start-block/--end-block"),
            };
            let json = serde_json::to_string_pretty(&RangeView::from(&range))?;
            write_output(None, &json)?;
        }
        Commands::Search {
            input,
            output,
            start,
            end,
            weekdays,
            from,
            to,
        } => {
            let plan = read_plan(input.as_deref())?;
            let month = build_month(&plan)?;

            let query = AvailabilityQuery {
                date_range_start: from.unwrap_or_else(|| month.first_date()),
                date_range_end: to.unwrap_or_else(|| month.last_date()),
                required_weekdays: if weekdays.is_empty() {
                    plan.config.required_weekdays.clone()
                } else {
                    parse_weekdays(&weekdays)?
                },
                time_window_start: match start {
                    Some(text) => parse_time(&text)?,
                    None => plan.config.time_window_start,
                },
                time_window_end: match end {
                    Some(text) => parse_time(&text)?,
                    None => plan.config.time_window_end,
                },
            };
            let criteria: SearchCriteria = query.criteria().context("Invalid time window")?;
            debug!(
                start_block = criteria.start_block(),
                blocks = criteria.block_count(),
                weekdays = ?criteria.weekdays(),
                "searching"
            );

            let found = if from.is_some() {
                query.run(std::slice::from_ref(&month))?
            } else {
                month.search(&criteria)
            };
            let dates: Vec<NaiveDate> = found.iter().map(|day| day.date()).collect();
            write_output(output.as_deref(), &serde_json::to_string_pretty(&dates)?)?;
        }
        Commands::Export { input, output } => {
            let plan = read_plan(input.as_deref())?;
            let month = build_month(&plan)?;
            let records: Vec<DayRecord> = month.days().iter().map(DayRecord::from).collect();
            write_output(output.as_deref(), &serde_json::to_string_pretty(&records)?)?;
        }
        Commands::Diff { old, new } => {
            let old = read_config(&old)?;
            let new = read_config(&new)?;
            let diff = configuration_diff(&old, &new);
            write_output(None, &serde_json::to_string_pretty(&diff)?)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

/// Load the plan's days, then apply its reservations and schedules in order.
///
/// A reservation that collides with an existing one is logged and skipped;
/// schedules keep whatever days they managed to reserve.
fn build_month(plan: &MonthPlan) -> Result<Month> {
    let config = &plan.config;
    let mut month = if plan.days.is_empty() {
        config.empty_month()?
    } else {
        let days: Vec<Day> = plan.days.iter().cloned().map(Day::from).collect();
        let month = Month::from_days(days).context("Invalid stored days")?;
        if (month.year(), month.month()) != (config.year, config.month) {
            anyhow::bail!(
                "Stored days belong to {}-{:02}, but the plan is for {}-{:02}",
                month.year(),
                month.month(),
                config.year,
                config.month
            );
        }
        month
    };

    for reservation in &plan.reservations {
        let range = create_range_from_times(reservation.start, reservation.end)
            .with_context(|| format!("Invalid reservation on day {}", reservation.day))?;
        let day = month.day_mut(reservation.day).with_context(|| {
            format!(
                "Day {} is not in {}-{:02}",
                reservation.day, config.year, config.month
            )
        })?;
        if !day.reserve_block(&range) {
            warn!(
                date = %day.date(),
                start = %timeblock::format_time_of_day(range.start_time()),
                end = %timeblock::format_time_of_day(range.end_time()),
                "reservation overlaps an existing one, skipped"
            );
        }
    }

    for schedule in &plan.schedules {
        let range =
            create_range_from_times(schedule.start, schedule.end).context("Invalid schedule")?;
        if !month.reserve_schedule(&range, &schedule.weekdays) {
            warn!(
                start = %timeblock::format_time_of_day(range.start_time()),
                end = %timeblock::format_time_of_day(range.end_time()),
                "schedule could not be reserved on every day"
            );
        }
    }

    Ok(month)
}

fn parse_time(text: &str) -> Result<Duration> {
    timeblock::parse_time_of_day(text).with_context(|| format!("Invalid time: '{}'", text))
}

fn parse_weekdays(raw: &[String]) -> Result<Vec<Weekday>> {
    raw.iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<Weekday>()
                .map_err(|_| anyhow::anyhow!("Unknown weekday: '{}'", part))
        })
        .collect()
}

fn read_plan(path: Option<&str>) -> Result<MonthPlan> {
    let json = read_input(path)?;
    serde_json::from_str(&json).context("Failed to parse month plan")
}

fn read_config(path: &str) -> Result<ScheduleConfig> {
    let json = read_input(Some(path))?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse plan: {}", path))
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
