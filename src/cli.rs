//! CLI interface for meterstat
//!
//! This module defines the command-line interface using clap. Each
//! subcommand selects one timeframe; the global flags pick the input, the
//! metric and how the report is rendered.
//!
//! # Example
//!
//! ```bash
//! # Hourly power usage for one day, in the Kolkata timezone
//! meterstat daily --date 2024-01-15 --timezone Asia/Kolkata --input readings.json
//!
//! # Monthly carbon report against a configured baseline, as JSON
//! meterstat monthly --month 2024-03 --metric carbon --baseline 420 --json < readings.json
//!
//! # Only the days that have data in a custom range
//! meterstat custom --start 2024-01-01 --end 2024-01-31 --sparse -i readings.json
//! ```

use crate::error::{MeterstatError, Result};
use crate::types::{Metric, TimeframeSpec};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Turn meter readings into chart-ready cumulative series
#[derive(Parser, Debug, Clone)]
#[command(name = "meterstat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// JSON file with meter readings, or "-" for stdin
    #[arg(
        long,
        short = 'i',
        global = true,
        env = "METERSTAT_INPUT",
        default_value = "-"
    )]
    pub input: PathBuf,

    /// Quantity carried by the readings (power or carbon)
    #[arg(long, short = 'm', global = true, default_value = "power")]
    pub metric: Metric,

    /// Baseline total for the whole period (used when the input carries none)
    #[arg(long, short = 'b', global = true)]
    pub baseline: Option<f64>,

    /// Timezone for hour and date grouping (e.g. "Asia/Kolkata", "Europe/London", "UTC")
    /// If not specified, uses the system's local timezone
    #[arg(long, short = 'z', global = true, env = "METERSTAT_TIMEZONE")]
    pub timezone: Option<String>,

    /// Use UTC for hour and date grouping (overrides --timezone)
    #[arg(long, global = true)]
    pub utc: bool,

    /// Omit custom-range days and yearly months without data
    #[arg(long, global = true)]
    pub sparse: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Timeframe to report on
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// The `--baseline` value, rejecting `NaN` and infinities
    pub fn configured_baseline(&self) -> Result<Option<f64>> {
        match self.baseline {
            Some(total) if !total.is_finite() => Err(MeterstatError::InvalidArgument(format!(
                "--baseline must be a finite number, got {total}"
            ))),
            baseline => Ok(baseline),
        }
    }
}

/// Available timeframes
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Hourly usage for one day
    Daily {
        /// Day to report (YYYY-MM-DD)
        #[arg(long, short = 'd')]
        date: String,
    },
    /// Daily usage for one month
    Monthly {
        /// Month to report (YYYY-MM)
        #[arg(long)]
        month: String,
    },
    /// Monthly usage for one year
    Yearly {
        /// Year to report
        #[arg(long, short = 'y')]
        year: i32,
    },
    /// Daily usage for an inclusive date range
    Custom {
        /// First day of the range (YYYY-MM-DD)
        #[arg(long, short = 's')]
        start: String,
        /// Last day of the range (YYYY-MM-DD)
        #[arg(long, short = 'e')]
        end: String,
    },
}

impl Command {
    /// Parse the subcommand arguments into a validated timeframe
    pub fn into_timeframe(&self) -> Result<TimeframeSpec> {
        let spec = match self {
            Self::Daily { date } => TimeframeSpec::daily(parse_date_filter(date)?),
            Self::Monthly { month } => {
                let (year, month) = parse_month_filter(month)?;
                TimeframeSpec::monthly(year, month)
            }
            Self::Yearly { year } => TimeframeSpec::yearly(*year),
            Self::Custom { start, end } => {
                TimeframeSpec::custom(parse_date_filter(start)?, parse_date_filter(end)?)
            }
        };
        spec.validate()?;
        Ok(spec)
    }
}

/// Parse a day from a YYYY-MM-DD string
///
/// # Example
///
/// ```
/// use meterstat::cli::parse_date_filter;
/// use chrono::Datelike;
///
/// let date = parse_date_filter("2024-01-15").unwrap();
/// assert_eq!(date.year(), 2024);
/// assert_eq!(date.day(), 15);
///
/// assert!(parse_date_filter("2024-02-30").is_err());
/// ```
pub fn parse_date_filter(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|_| {
        MeterstatError::InvalidDate(format!(
            "Invalid date format '{}', expected YYYY-MM-DD",
            date_str
        ))
    })
}

/// Parse a month from a YYYY-MM string into `(year, month)` with a 1-based month
///
/// # Example
///
/// ```
/// use meterstat::cli::parse_month_filter;
///
/// assert_eq!(parse_month_filter("2024-02").unwrap(), (2024, 2));
/// assert!(parse_month_filter("2024-13").is_err());
/// ```
pub fn parse_month_filter(month_str: &str) -> Result<(i32, u32)> {
    let parts: Vec<&str> = month_str.trim().split('-').collect();
    if parts.len() != 2 {
        return Err(MeterstatError::InvalidDate(format!(
            "Invalid month format '{}', expected YYYY-MM",
            month_str
        )));
    }

    let year = parts[0]
        .parse::<i32>()
        .map_err(|_| MeterstatError::InvalidDate(format!("Invalid year in '{month_str}'")))?;
    let month = parts[1]
        .parse::<u32>()
        .map_err(|_| MeterstatError::InvalidDate(format!("Invalid month in '{month_str}'")))?;

    if !(1..=12).contains(&month) {
        return Err(MeterstatError::InvalidDate(format!(
            "Month must be between 1-12, got {month}"
        )));
    }

    Ok((year, month))
}
