//! Common test utilities and helpers for meterstat tests
//!
//! This module provides reusable record builders and engine setup so the
//! integration tests read as scenarios rather than fixture plumbing.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use meterstat::{
    aggregation::{Aggregator, EngineOptions, GridFill},
    timezone::TimezoneConfig,
    types::RawRecord,
};
use std::io::Write;
use tempfile::NamedTempFile;

/// Builder for creating test RawRecord instances
#[allow(dead_code)]
pub struct RecordBuilder {
    timestamp: DateTime<Utc>,
    value: f64,
    baseline_value: Option<f64>,
}

#[allow(dead_code)]
impl RecordBuilder {
    /// Create a new builder at 2024-01-15 00:00 UTC with a value of 1.0
    pub fn new() -> Self {
        Self {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
            value: 1.0,
            baseline_value: None,
        }
    }

    pub fn at(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = ts;
        self
    }

    /// Set the timestamp to a UTC wall-clock time
    pub fn at_utc(mut self, year: i32, month: u32, day: u32, hour: u32) -> Self {
        self.timestamp = Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap();
        self
    }

    pub fn value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    pub fn baseline(mut self, baseline: f64) -> Self {
        self.baseline_value = Some(baseline);
        self
    }

    pub fn build(self) -> RawRecord {
        RawRecord {
            timestamp: self.timestamp,
            value: self.value,
            baseline_value: self.baseline_value,
        }
    }
}

impl Default for RecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Records for one UTC day, one per `(hour, value)` pair
#[allow(dead_code)]
pub fn hourly_records(date: NaiveDate, values: &[(u32, f64)]) -> Vec<RawRecord> {
    use chrono::Datelike;
    values
        .iter()
        .map(|&(hour, value)| {
            RecordBuilder::new()
                .at_utc(date.year(), date.month(), date.day(), hour)
                .value(value)
                .build()
        })
        .collect()
}

/// An aggregator working in UTC
#[allow(dead_code)]
pub fn utc_aggregator() -> Aggregator {
    Aggregator::new(EngineOptions::new(TimezoneConfig::utc()))
}

/// An aggregator working in UTC that omits empty Custom/Yearly keys
#[allow(dead_code)]
pub fn sparse_aggregator() -> Aggregator {
    Aggregator::new(EngineOptions::new(TimezoneConfig::utc()).with_grid_fill(GridFill::Sparse))
}

#[allow(dead_code)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Write a JSON document to a temporary file
#[allow(dead_code)]
pub fn json_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

/// Compare floats with a tolerance suited to summed meter values
#[allow(dead_code)]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * (1.0 + a.abs().max(b.abs()))
}
