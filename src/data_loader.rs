//! Boundary adapter turning meter JSON into engine records
//!
//! Upstream services disagree on field names and number encodings. This
//! module absorbs that: it tries an ordered alias list per field, accepts
//! numbers or numeric strings, and normalises every timestamp to an instant
//! using the configured timezone. Records that cannot be read are skipped
//! and counted rather than failing the batch.
//!
//! Two document shapes are accepted:
//!
//! ```json
//! [ { "timestamp": "2024-01-15T08:00:00Z", "value": 5.0 } ]
//! ```
//!
//! ```json
//! {
//!   "data": [ { "time": "2024-01-15 08:00:00", "total_consumption": "5.0" } ],
//!   "baseline": 144.0,
//!   "active_inactive": { "active": 23.0, "inactive": 1.0 }
//! }
//! ```
//!
//! # Examples
//!
//! ```
//! use meterstat::data_loader::parse_batch;
//! use meterstat::timezone::TimezoneConfig;
//! use meterstat::types::Metric;
//!
//! let json = r#"[
//!     {"timestamp": "2024-01-15T08:00:00Z", "value": 5},
//!     {"timestamp": "not a time", "value": 1},
//!     {"created_at": "2024-01-15T09:00:00Z", "consumption": "9.5", "baselineValue": 6}
//! ]"#;
//!
//! let batch = parse_batch(json, Metric::Power, &TimezoneConfig::utc()).unwrap();
//! assert_eq!(batch.records.len(), 2);
//! assert_eq!(batch.skipped, 1);
//! assert_eq!(batch.records[1].value, 9.5);
//! assert_eq!(batch.records[1].baseline_value, Some(6.0));
//! ```

use crate::aggregation::ReportRequest;
use crate::error::{MeterstatError, Result};
use crate::sources::DataSource;
use crate::timezone::TimezoneConfig;
use crate::types::{ActiveInactiveTotals, Metric, RawRecord, TimeframeSpec};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

const TIMESTAMP_FIELDS: &[&str] = &["timestamp", "time", "datetime", "date", "created_at"];
const POWER_FIELDS: &[&str] = &[
    "value",
    "actual",
    "total_consumption",
    "total_power_consumption",
    "consumption",
];
const CARBON_FIELDS: &[&str] = &["value", "actual", "co2", "carbon", "total_carbon"];
const BASELINE_FIELDS: &[&str] = &["baselineValue", "baseline_value", "baseline"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Value field aliases for a metric, in lookup order
pub fn value_fields(metric: Metric) -> &'static [&'static str] {
    match metric {
        Metric::Power => POWER_FIELDS,
        Metric::Carbon => CARBON_FIELDS,
    }
}

/// Records plus the pre-aggregated figures shipped alongside them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeterBatch {
    pub records: Vec<RawRecord>,
    /// Records dropped because a timestamp or value could not be read
    pub skipped: usize,
    /// Period baseline total supplied by the upstream service
    pub baseline: Option<f64>,
    /// Active/inactive split supplied by the upstream service
    pub active_inactive: Option<ActiveInactiveTotals>,
}

impl MeterBatch {
    /// Build an engine request from this batch
    ///
    /// Server figures take priority over the operator's configured baseline.
    pub fn report_request(
        &self,
        timeframe: TimeframeSpec,
        configured_baseline: Option<f64>,
    ) -> ReportRequest {
        ReportRequest::new(timeframe)
            .with_baseline(DataSource::Server, self.baseline)
            .with_baseline(DataSource::Configured, configured_baseline)
            .with_active_inactive(DataSource::Server, self.active_inactive)
            .with_skipped_malformed(self.skipped)
    }
}

/// Parse a JSON document into a [`MeterBatch`]
///
/// # Errors
///
/// Returns an error when the text is not JSON or the document is neither an
/// array nor an object with a `data` array. Individual bad records are not
/// errors.
pub fn parse_batch(json: &str, metric: Metric, tz: &TimezoneConfig) -> Result<MeterBatch> {
    let document: Value = serde_json::from_str(json)?;

    let (items, baseline, active_inactive) = match document {
        Value::Array(items) => (items, None, None),
        Value::Object(mut envelope) => {
            let items = match envelope.remove("data") {
                Some(Value::Array(items)) => items,
                Some(_) => {
                    return Err(MeterstatError::MalformedInput(
                        "'data' must be an array of records".to_string(),
                    ));
                }
                None => {
                    return Err(MeterstatError::MalformedInput(
                        "expected an array of records or an object with a 'data' array"
                            .to_string(),
                    ));
                }
            };
            let baseline = envelope.get("baseline").and_then(finite_number_from);
            let active_inactive = envelope
                .get("active_inactive")
                .or_else(|| envelope.get("activeInactive"))
                .and_then(split_from);
            (items, baseline, active_inactive)
        }
        _ => {
            return Err(MeterstatError::MalformedInput(
                "expected an array of records or an object with a 'data' array".to_string(),
            ));
        }
    };

    let fields = value_fields(metric);
    let mut batch = MeterBatch {
        records: Vec::with_capacity(items.len()),
        skipped: 0,
        baseline,
        active_inactive,
    };

    for (index, item) in items.iter().enumerate() {
        match item.as_object().and_then(|obj| record_from(obj, fields, tz)) {
            Some(record) => batch.records.push(record),
            None => {
                warn!("Skipping malformed record at index {}", index);
                batch.skipped += 1;
            }
        }
    }

    debug!(
        "Parsed {} {} records ({} skipped)",
        batch.records.len(),
        metric,
        batch.skipped
    );
    Ok(batch)
}

fn record_from(
    obj: &Map<String, Value>,
    value_fields: &[&str],
    tz: &TimezoneConfig,
) -> Option<RawRecord> {
    let timestamp = first_field(obj, TIMESTAMP_FIELDS)
        .and_then(Value::as_str)
        .and_then(|s| parse_timestamp(s, tz))?;
    let value = first_field(obj, value_fields).and_then(number_from)?;

    let record = RawRecord::new(timestamp, value);
    Some(match first_field(obj, BASELINE_FIELDS).and_then(number_from) {
        Some(baseline) => record.with_baseline(baseline),
        None => record,
    })
}

/// First non-null field among `names`
fn first_field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| obj.get(*name))
        .find(|value| !value.is_null())
}

/// A JSON number or a numeric string
fn number_from(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Like [`number_from`], but `NaN` and infinities count as absent
fn finite_number_from(value: &Value) -> Option<f64> {
    number_from(value).filter(|v| v.is_finite())
}

fn split_from(value: &Value) -> Option<ActiveInactiveTotals> {
    let obj = value.as_object()?;
    let active = obj.get("active").and_then(finite_number_from)?;
    let inactive = obj.get("inactive").and_then(finite_number_from)?;
    Some(ActiveInactiveTotals::new(active, inactive))
}

/// Normalise a timestamp string to an instant
///
/// Strings with an offset are taken as-is. Offset-less strings are wall
/// clock time in the configured zone, and a bare date is local midnight.
pub fn parse_timestamp(s: &str, tz: &TimezoneConfig) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    tz.from_wall_clock(&naive)
}

/// Where meter records come from
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Load one batch of records
    async fn load(&self) -> Result<MeterBatch>;
}

/// Reads a JSON document from a file, or stdin when the path is `-`
pub struct JsonFileSource {
    path: PathBuf,
    metric: Metric,
    timezone: TimezoneConfig,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>, metric: Metric, timezone: TimezoneConfig) -> Self {
        Self {
            path: path.into(),
            metric,
            timezone,
        }
    }

    fn is_stdin(&self) -> bool {
        self.path.as_os_str() == "-"
    }
}

#[async_trait]
impl RecordSource for JsonFileSource {
    async fn load(&self) -> Result<MeterBatch> {
        let content = if self.is_stdin() {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        } else {
            debug!("Reading meter data from {}", self.path.display());
            tokio::fs::read_to_string(&self.path).await?
        };
        parse_batch(&content, self.metric, &self.timezone)
    }
}

/// A JSON document already held in memory
pub struct StaticSource {
    json: String,
    metric: Metric,
    timezone: TimezoneConfig,
}

impl StaticSource {
    pub fn new(json: impl Into<String>, metric: Metric, timezone: TimezoneConfig) -> Self {
        Self {
            json: json.into(),
            metric,
            timezone,
        }
    }
}

#[async_trait]
impl RecordSource for StaticSource {
    async fn load(&self) -> Result<MeterBatch> {
        parse_batch(&self.json, self.metric, &self.timezone)
    }
}
