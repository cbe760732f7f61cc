//! Bucketizer: maps raw records onto grid slots
//!
//! Each record is converted to a key by a [`KeyExtractor`] and its value is
//! added to the matching bucket. Records mapping to the same key are summed.
//! A record whose local date falls outside the timeframe has no key and is
//! dropped; callers are expected to pre-filter by period, and the drop count
//! is reported rather than treated as an error.
//!
//! Non-finite values (`NaN`, `±inf`) are coerced to zero here so that no
//! later stage ever sees them. A bucket sum that would overflow saturates
//! at `±f64::MAX` and is counted with the coerced readings.

use crate::grid::GridSlot;
use crate::numeric::saturating_add;
use crate::timezone::TimezoneConfig;
use crate::types::{BucketRow, GridKey, RawRecord, TimeframeSpec};
use chrono::{DateTime, Datelike, Utc};
use tracing::debug;

/// Maps an instant to the grid key it belongs to
pub trait KeyExtractor {
    /// Key for a timestamp, or `None` when it lies outside the timeframe
    fn key_of(&self, ts: &DateTime<Utc>) -> Option<GridKey>;
}

/// Key extraction matching the grid of a timeframe
///
/// Hour of day for Daily, day of month for Monthly, month for Yearly and
/// the calendar date for Custom, all read in the configured timezone.
#[derive(Debug, Clone, Copy)]
pub struct TimeframeKeys {
    spec: TimeframeSpec,
    tz: TimezoneConfig,
}

impl TimeframeKeys {
    pub fn new(spec: TimeframeSpec, tz: TimezoneConfig) -> Self {
        Self { spec, tz }
    }
}

impl KeyExtractor for TimeframeKeys {
    fn key_of(&self, ts: &DateTime<Utc>) -> Option<GridKey> {
        let local = self.tz.local(ts);
        let date = local.date_naive();
        if !self.spec.contains_date(date) {
            return None;
        }

        Some(match self.spec {
            TimeframeSpec::Daily { .. } => GridKey::Hour(self.tz.hour_of_day(ts)),
            TimeframeSpec::Monthly { .. } => GridKey::Day(date.day()),
            TimeframeSpec::Yearly { .. } => GridKey::Month(date.month0()),
            TimeframeSpec::Custom { .. } => GridKey::Date(date),
        })
    }
}

/// Hour-of-day keys for any in-period record, regardless of timeframe
///
/// Used to build the 24-hour profile behind the active/inactive split of
/// monthly, yearly and custom reports.
#[derive(Debug, Clone, Copy)]
pub struct HourOfDayKeys {
    spec: TimeframeSpec,
    tz: TimezoneConfig,
}

impl HourOfDayKeys {
    pub fn new(spec: TimeframeSpec, tz: TimezoneConfig) -> Self {
        Self { spec, tz }
    }
}

impl KeyExtractor for HourOfDayKeys {
    fn key_of(&self, ts: &DateTime<Utc>) -> Option<GridKey> {
        if !self.spec.contains_date(self.tz.local_date(ts)) {
            return None;
        }
        Some(GridKey::Hour(self.tz.hour_of_day(ts)))
    }
}

/// Result of bucketing one batch of records
#[derive(Debug, Clone, PartialEq)]
pub struct Bucketized {
    /// One row per grid slot, in grid order
    pub buckets: Vec<BucketRow>,
    /// Records that landed in a bucket
    pub bucketed: usize,
    /// Records without a key in the grid
    pub out_of_period: usize,
    /// Records whose value or baseline had to be coerced to zero
    pub non_finite_coerced: usize,
}

/// Sum records into the buckets of a grid
///
/// # Examples
///
/// ```
/// use meterstat::bucketizer::{bucketize, TimeframeKeys};
/// use meterstat::grid::build_grid;
/// use meterstat::timezone::TimezoneConfig;
/// use meterstat::types::{RawRecord, TimeframeSpec};
/// use chrono::{NaiveDate, TimeZone, Utc};
///
/// let spec = TimeframeSpec::daily(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
/// let grid = build_grid(&spec).unwrap();
/// let records = vec![
///     RawRecord::new(Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(), 4.0),
///     RawRecord::new(Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap(), 5.0),
/// ];
///
/// let result = bucketize(&records, &grid, &TimeframeKeys::new(spec, TimezoneConfig::utc()));
/// assert_eq!(result.buckets[9].raw_value, 9.0);
/// assert!(result.buckets[9].has_data);
/// assert!(!result.buckets[10].has_data);
/// ```
pub fn bucketize(
    records: &[RawRecord],
    grid: &[GridSlot],
    keys: &impl KeyExtractor,
) -> Bucketized {
    let mut buckets: Vec<BucketRow> = grid
        .iter()
        .map(|slot| BucketRow::empty(slot.key, slot.label.clone()))
        .collect();

    let mut bucketed = 0;
    let mut out_of_period = 0;
    let mut non_finite_coerced = 0;

    for record in records {
        let Some(index) = keys
            .key_of(&record.timestamp)
            .and_then(|key| grid.binary_search_by(|slot| slot.key.cmp(&key)).ok())
        else {
            out_of_period += 1;
            continue;
        };

        let (value, value_coerced) = finite_or_zero(record.value);
        let baseline = record.baseline_value.map(finite_or_zero);
        let mut coerced = value_coerced || baseline.is_some_and(|(_, coerced)| coerced);

        let bucket = &mut buckets[index];
        coerced |= accumulate_into(&mut bucket.raw_value, value);
        bucket.has_data = true;
        if let Some((baseline, _)) = baseline {
            coerced |= accumulate_into(bucket.baseline_value.get_or_insert(0.0), baseline);
        }
        if coerced {
            non_finite_coerced += 1;
        }
        bucketed += 1;
    }

    if out_of_period > 0 {
        debug!(
            "Dropped {} of {} records outside the requested period",
            out_of_period,
            records.len()
        );
    }
    if non_finite_coerced > 0 {
        debug!("Coerced {} non-finite readings to zero", non_finite_coerced);
    }

    Bucketized {
        buckets,
        bucketed,
        out_of_period,
        non_finite_coerced,
    }
}

/// Add `value` to `total`, returning whether the sum saturated
fn accumulate_into(total: &mut f64, value: f64) -> bool {
    let exact = *total + value;
    *total = saturating_add(*total, value);
    !exact.is_finite()
}

fn finite_or_zero(value: f64) -> (f64, bool) {
    if value.is_finite() {
        (value, false)
    } else {
        (0.0, true)
    }
}
