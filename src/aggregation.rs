//! Aggregation engine
//!
//! [`Aggregator`] runs the whole pipeline for one batch of records:
//!
//! 1. build the grid for the timeframe ([`crate::grid`])
//! 2. sum records into buckets ([`crate::bucketizer`])
//! 3. walk the buckets into cumulative rows ([`crate::series`])
//! 4. compare against the flat period baseline ([`crate::baseline`])
//! 5. detect peak windows, daily only ([`crate::peaks`])
//! 6. split active / inactive hours ([`crate::active_hours`])
//! 7. place the baseline on the chart's value axis ([`crate::gradient`])
//!
//! Each stage reads the previous stage's output and returns a new value.
//! The aggregator holds only immutable options, so a report is a pure
//! function of `(records, request, options)` and can be rebuilt at will.
//!
//! # Examples
//!
//! ```
//! use meterstat::aggregation::{Aggregator, EngineOptions, ReportRequest};
//! use meterstat::sources::DataSource;
//! use meterstat::timezone::TimezoneConfig;
//! use meterstat::types::{RawRecord, TimeframeSpec};
//! use chrono::{NaiveDate, TimeZone, Utc};
//!
//! # fn example() -> meterstat::Result<()> {
//! let aggregator = Aggregator::new(EngineOptions::new(TimezoneConfig::utc()));
//!
//! let records = vec![
//!     RawRecord::new(Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(), 9.0),
//!     RawRecord::new(Utc.with_ymd_and_hms(2024, 1, 15, 21, 0, 0).unwrap(), 1.0),
//! ];
//! let request = ReportRequest::new(TimeframeSpec::daily(
//!     NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
//! ))
//! .with_baseline(DataSource::Configured, Some(144.0));
//!
//! let report = aggregator.build_report(&records, &request)?;
//! assert_eq!(report.series.len(), 24);
//! assert_eq!(report.totals.total_actual, 10.0);
//! assert_eq!(report.totals.total_saved, 134.0);
//! assert_eq!(report.active_inactive.value.active, 9.0);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use crate::active_hours::split_active_inactive;
use crate::aggregation_types::{ChartReport, Diagnostics, ReportTotals};
use crate::baseline::compare_to_baseline;
use crate::bucketizer::{HourOfDayKeys, TimeframeKeys, bucketize};
use crate::error::Result;
use crate::gradient::compute_offset;
use crate::grid::{build_grid, hourly_slots};
use crate::numeric::saturating_add;
use crate::peaks::detect_peak_windows;
use crate::series::{BaselineDistribution, accumulate};
use crate::sources::{DataSource, Precedence, Sourced};
use crate::timezone::TimezoneConfig;
use crate::types::{ActiveInactiveTotals, BucketRow, RawRecord, TimeframeSpec};
use tracing::debug;

/// Which grid keys appear in the output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GridFill {
    /// Every key of the timeframe, with or without data
    #[default]
    Dense,
    /// Custom and Yearly grids keep only keys that received data, in
    /// chronological order. Daily and Monthly grids are always dense.
    Sparse,
}

impl GridFill {
    fn applies_to(&self, spec: &TimeframeSpec) -> bool {
        matches!(self, Self::Sparse)
            && matches!(spec, TimeframeSpec::Custom { .. } | TimeframeSpec::Yearly { .. })
    }
}

/// Engine configuration, fixed for the lifetime of an [`Aggregator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Zone every calendar field is read in
    pub timezone: TimezoneConfig,
    pub grid_fill: GridFill,
}

impl EngineOptions {
    pub fn new(timezone: TimezoneConfig) -> Self {
        Self {
            timezone,
            grid_fill: GridFill::default(),
        }
    }

    pub fn with_grid_fill(mut self, grid_fill: GridFill) -> Self {
        self.grid_fill = grid_fill;
        self
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::new(TimezoneConfig::default())
    }
}

/// What to build and which external figures may override local ones
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub timeframe: TimeframeSpec,
    /// Candidates for the period baseline total, highest priority first.
    /// The sum of per-record baselines is always tried after these.
    pub baseline: Precedence<f64>,
    /// Candidates for the active/inactive split, highest priority first.
    /// The local split is used when none is present.
    pub active_inactive: Precedence<ActiveInactiveTotals>,
    /// Records the boundary adapter rejected before the engine saw them
    pub skipped_malformed: usize,
}

impl ReportRequest {
    pub fn new(timeframe: TimeframeSpec) -> Self {
        Self {
            timeframe,
            baseline: Precedence::new(),
            active_inactive: Precedence::new(),
            skipped_malformed: 0,
        }
    }

    /// Add a baseline candidate below the existing ones
    ///
    /// A non-finite total counts as absent.
    pub fn with_baseline(mut self, source: DataSource, total: Option<f64>) -> Self {
        self.baseline = self
            .baseline
            .then(source, total.filter(|t| t.is_finite()));
        self
    }

    /// Add an active/inactive candidate below the existing ones
    ///
    /// A split with a non-finite half counts as absent.
    pub fn with_active_inactive(
        mut self,
        source: DataSource,
        split: Option<ActiveInactiveTotals>,
    ) -> Self {
        self.active_inactive = self
            .active_inactive
            .then(source, split.filter(ActiveInactiveTotals::is_finite));
        self
    }

    pub fn with_skipped_malformed(mut self, skipped: usize) -> Self {
        self.skipped_malformed = skipped;
        self
    }
}

/// Main aggregation engine
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    options: EngineOptions,
}

impl Aggregator {
    /// Create a new Aggregator
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    /// Get the timezone configuration
    pub fn timezone_config(&self) -> &TimezoneConfig {
        &self.options.timezone
    }

    /// Build every chart structure for one timeframe
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::MeterstatError::InvalidTimeframe`] when the
    /// timeframe is malformed; no stage runs in that case. An empty record
    /// list is not an error and yields an all-zero report.
    pub fn build_report(
        &self,
        records: &[RawRecord],
        request: &ReportRequest,
    ) -> Result<ChartReport> {
        let spec = request.timeframe;
        let tz = self.options.timezone;

        let grid = build_grid(&spec)?;
        let bucketized = bucketize(records, &grid, &TimeframeKeys::new(spec, tz));
        let buckets = if self.options.grid_fill.applies_to(&spec) {
            bucketized
                .buckets
                .into_iter()
                .filter(|b| b.has_data)
                .collect()
        } else {
            bucketized.buckets
        };

        let baseline = self.resolve_baseline(&buckets, &request.baseline);
        let distribution = BaselineDistribution::for_buckets(&buckets, baseline.value);
        let series = accumulate(&buckets, distribution);
        let comparison = compare_to_baseline(&series, baseline.value);
        let series = comparison.apply(series);

        let peak_windows = if spec.is_daily() {
            detect_peak_windows(&buckets)
        } else {
            Vec::new()
        };

        let active_inactive =
            self.resolve_active_inactive(records, &spec, &buckets, &request.active_inactive);

        let total_actual = series.last().map_or(0.0, |row| row.cumulative_actual);
        let totals = ReportTotals::new(total_actual, baseline.value);
        let gradient = compute_offset(0.0, total_actual.max(baseline.value), baseline.value);

        let diagnostics = Diagnostics {
            records_received: records.len(),
            records_bucketed: bucketized.bucketed,
            out_of_period: bucketized.out_of_period,
            non_finite_coerced: bucketized.non_finite_coerced,
            skipped_malformed: request.skipped_malformed,
        };

        debug!(
            "Built {} report for {}: {} buckets, {} of {} records bucketed, baseline from {}, split from {}",
            spec.mode_name(),
            spec,
            buckets.len(),
            diagnostics.records_bucketed,
            diagnostics.records_received,
            baseline.source,
            active_inactive.source
        );

        Ok(ChartReport {
            timeframe: spec,
            buckets,
            series,
            peak_windows,
            active_inactive,
            totals,
            flat_baseline: baseline.value,
            baseline_source: baseline.source,
            gradient,
            diagnostics,
        })
    }

    fn resolve_baseline(&self, buckets: &[BucketRow], candidates: &Precedence<f64>) -> Sourced<f64> {
        let from_records = buckets
            .iter()
            .filter_map(|b| b.baseline_value)
            .reduce(saturating_add);

        let resolved = candidates
            .clone()
            .then(DataSource::Records, from_records)
            .resolve_or(DataSource::Computed, 0.0);

        if resolved.value.is_finite() {
            resolved
        } else {
            debug!(
                "Ignoring non-finite baseline from {}, using zero",
                resolved.source
            );
            Sourced::new(0.0, resolved.source)
        }
    }

    fn resolve_active_inactive(
        &self,
        records: &[RawRecord],
        spec: &TimeframeSpec,
        buckets: &[BucketRow],
        candidates: &Precedence<ActiveInactiveTotals>,
    ) -> Sourced<ActiveInactiveTotals> {
        if let Some(precomputed) = candidates.resolve().filter(|p| p.value.is_finite()) {
            let split = split_active_inactive(buckets, Some(precomputed.value));
            return Sourced::new(split, precomputed.source);
        }

        let split = if spec.is_daily() {
            split_active_inactive(buckets, None)
        } else {
            split_active_inactive(&self.hourly_profile(records, spec), None)
        };
        Sourced::new(split, DataSource::Computed)
    }

    /// Hour-of-day totals of every in-period record
    fn hourly_profile(&self, records: &[RawRecord], spec: &TimeframeSpec) -> Vec<BucketRow> {
        let slots = hourly_slots();
        bucketize(
            records,
            &slots,
            &HourOfDayKeys::new(*spec, self.options.timezone),
        )
        .buckets
    }
}
