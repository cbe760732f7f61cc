//! Core domain types for meterstat
//!
//! This module contains the fundamental types shared by every stage of the
//! aggregation engine: the raw meter reading, the timeframe selector, the
//! grid key and the per-bucket / per-row values derived from them.

use crate::error::{MeterstatError, Result};
use crate::numeric::saturating_add;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// Earliest calendar year a timeframe may reference
pub const MIN_YEAR: i32 = 1970;
/// Latest calendar year a timeframe may reference
pub const MAX_YEAR: i32 = 2200;

/// One meter sample
///
/// Produced by the boundary adapter; the engine only reads it.
///
/// # Examples
/// ```
/// use meterstat_core::types::RawRecord;
/// use chrono::{TimeZone, Utc};
///
/// let record = RawRecord::new(Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap(), 5.0)
///     .with_baseline(6.0);
/// assert_eq!(record.value, 5.0);
/// assert_eq!(record.baseline_value, Some(6.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Instant the sample was taken; the sole ordering key
    pub timestamp: DateTime<Utc>,
    /// Energy (kWh) or carbon (kg) for the sample period
    pub value: f64,
    /// Baseline target for the same period, when the source supplies one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_value: Option<f64>,
}

impl RawRecord {
    /// Create a record without a per-record baseline
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            timestamp,
            value,
            baseline_value: None,
        }
    }

    /// Attach a per-record baseline value
    pub fn with_baseline(mut self, baseline: f64) -> Self {
        self.baseline_value = Some(baseline);
        self
    }
}

/// Quantity carried by the records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Energy consumption in kWh
    #[default]
    Power,
    /// Carbon emissions in kg CO2e
    Carbon,
}

impl Metric {
    /// Display unit for the metric
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Power => "kWh",
            Self::Carbon => "kg CO2e",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Power => write!(f, "power"),
            Self::Carbon => write!(f, "carbon"),
        }
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "power" | "energy" => Ok(Self::Power),
            "carbon" | "co2" => Ok(Self::Carbon),
            _ => Err(format!("Invalid metric: {s}")),
        }
    }
}

/// Timeframe selector
///
/// Determines both the shape of the grid and how a timestamp maps to a key.
///
/// # Examples
/// ```
/// use meterstat_core::types::TimeframeSpec;
/// use chrono::NaiveDate;
///
/// let spec = TimeframeSpec::Monthly { year: 2024, month: 2 };
/// assert!(spec.validate().is_ok());
/// assert!(spec.contains_date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
/// assert_eq!(spec.to_string(), "2024-02");
///
/// let reversed = TimeframeSpec::Custom {
///     start: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
///     end: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
/// };
/// assert!(reversed.validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TimeframeSpec {
    /// 24 hourly buckets of one calendar day
    Daily { date: NaiveDate },
    /// One bucket per day of a calendar month (`month` is 1-based)
    Monthly { year: i32, month: u32 },
    /// 12 monthly buckets of a calendar year
    Yearly { year: i32 },
    /// One bucket per calendar day from `start` to `end` inclusive
    Custom { start: NaiveDate, end: NaiveDate },
}

impl TimeframeSpec {
    /// Convenience constructor for a daily timeframe
    pub fn daily(date: NaiveDate) -> Self {
        Self::Daily { date }
    }

    /// Convenience constructor for a monthly timeframe
    pub fn monthly(year: i32, month: u32) -> Self {
        Self::Monthly { year, month }
    }

    /// Convenience constructor for a yearly timeframe
    pub fn yearly(year: i32) -> Self {
        Self::Yearly { year }
    }

    /// Convenience constructor for a custom range
    pub fn custom(start: NaiveDate, end: NaiveDate) -> Self {
        Self::Custom { start, end }
    }

    /// Check that the timeframe can produce a grid
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Daily { date } => check_year(date.year()),
            Self::Monthly { year, month } => {
                check_year(year)?;
                if !(1..=12).contains(&month) {
                    return Err(MeterstatError::InvalidTimeframe(format!(
                        "month must be between 1-12, got {month}"
                    )));
                }
                Ok(())
            }
            Self::Yearly { year } => check_year(year),
            Self::Custom { start, end } => {
                check_year(start.year())?;
                check_year(end.year())?;
                if start > end {
                    return Err(MeterstatError::InvalidTimeframe(format!(
                        "start {start} is after end {end}"
                    )));
                }
                Ok(())
            }
        }
    }

    /// Whether a local calendar date falls inside the timeframe
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        match *self {
            Self::Daily { date: day } => date == day,
            Self::Monthly { year, month } => date.year() == year && date.month() == month,
            Self::Yearly { year } => date.year() == year,
            Self::Custom { start, end } => start <= date && date <= end,
        }
    }

    /// Whether this is the hourly (Daily) timeframe
    pub fn is_daily(&self) -> bool {
        matches!(self, Self::Daily { .. })
    }

    /// Short mode name used in reports
    pub fn mode_name(&self) -> &'static str {
        match self {
            Self::Daily { .. } => "daily",
            Self::Monthly { .. } => "monthly",
            Self::Yearly { .. } => "yearly",
            Self::Custom { .. } => "custom",
        }
    }
}

impl fmt::Display for TimeframeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily { date } => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Monthly { year, month } => write!(f, "{year:04}-{month:02}"),
            Self::Yearly { year } => write!(f, "{year:04}"),
            Self::Custom { start, end } => write!(
                f,
                "{}..{}",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            ),
        }
    }
}

fn check_year(year: i32) -> Result<()> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(MeterstatError::InvalidTimeframe(format!(
            "year must be between {MIN_YEAR}-{MAX_YEAR}, got {year}"
        )))
    }
}

/// Position of a bucket in the grid
///
/// All keys of one grid share a variant, so the derived ordering is the time
/// ordering of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum GridKey {
    /// Hour of day, 0-23
    Hour(u32),
    /// Day of month, 1-based
    Day(u32),
    /// Calendar month, 0-11
    Month(u32),
    /// Calendar date of a custom range
    Date(NaiveDate),
}

impl GridKey {
    /// Hour of day for hourly keys
    pub fn hour(&self) -> Option<u32> {
        match self {
            Self::Hour(h) => Some(*h),
            _ => None,
        }
    }
}

impl fmt::Display for GridKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hour(h) => write!(f, "{h:02}:00"),
            Self::Day(d) => write!(f, "{d}"),
            Self::Month(m) => write!(f, "{}", m + 1),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// One grid slot after summing the records that map to it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketRow {
    pub key: GridKey,
    pub label: String,
    /// Sum of record values; zero for an empty bucket
    pub raw_value: f64,
    /// Sum of per-record baselines, if any record in the bucket carried one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_value: Option<f64>,
    /// Whether at least one record landed in this bucket
    pub has_data: bool,
}

impl BucketRow {
    /// Create an empty bucket for a grid key
    pub fn empty(key: GridKey, label: impl Into<String>) -> Self {
        Self {
            key,
            label: label.into(),
            raw_value: 0.0,
            baseline_value: None,
            has_data: false,
        }
    }
}

/// One chart row of the cumulative series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRow {
    pub key: GridKey,
    pub label: String,
    /// Non-cumulative bucket value the running total advanced by
    pub raw_value: f64,
    pub cumulative_actual: f64,
    pub cumulative_baseline: f64,
    /// Positive part of cumulative actual minus the flat period baseline
    pub excess: f64,
    pub has_data: bool,
}

/// A contiguous high-usage period of the daily grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakWindow {
    pub start_key: GridKey,
    pub end_key: GridKey,
    pub label: String,
    /// Number of peak buckets in the window (merge gaps are not counted)
    pub bucket_count: usize,
    pub average_value: f64,
    pub peak_value: f64,
}

/// Usage split between operating hours and the rest of the day
///
/// # Examples
/// ```
/// use meterstat_core::types::ActiveInactiveTotals;
///
/// let split = ActiveInactiveTotals::new(23.0, 1.0);
/// assert_eq!(split.total(), 24.0);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveInactiveTotals {
    pub active: f64,
    pub inactive: f64,
}

impl ActiveInactiveTotals {
    pub fn new(active: f64, inactive: f64) -> Self {
        Self { active, inactive }
    }

    pub fn total(&self) -> f64 {
        saturating_add(self.active, self.inactive)
    }

    /// Both halves are finite numbers
    pub fn is_finite(&self) -> bool {
        self.active.is_finite() && self.inactive.is_finite()
    }
}

impl Add for ActiveInactiveTotals {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            active: saturating_add(self.active, other.active),
            inactive: saturating_add(self.inactive, other.inactive),
        }
    }
}

impl AddAssign for ActiveInactiveTotals {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}
