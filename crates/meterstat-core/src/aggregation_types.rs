//! Report data types for meterstat
//!
//! Pure data structures produced by one engine invocation and consumed by
//! formatters, charts and exporters. They are plain values: nothing in the
//! engine holds on to them after returning.

use crate::numeric::saturating_sub;
use crate::sources::{DataSource, Sourced};
use crate::types::{ActiveInactiveTotals, BucketRow, PeakWindow, SeriesRow, TimeframeSpec};
use serde::Serialize;

/// Scalar summary figures for the whole period
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ReportTotals {
    /// Sum of every bucket value (the final cumulative actual)
    pub total_actual: f64,
    /// Baseline target for the whole period
    pub total_baseline: f64,
    /// `total_baseline - total_actual`; negative means net exceedance
    pub total_saved: f64,
}

impl ReportTotals {
    pub fn new(total_actual: f64, total_baseline: f64) -> Self {
        Self {
            total_actual,
            total_baseline,
            total_saved: saturating_sub(total_baseline, total_actual),
        }
    }

    /// Whether actual usage exceeded the period baseline
    pub fn exceeded(&self) -> bool {
        self.total_saved < 0.0
    }
}

/// Counters describing what happened to the input records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Well-formed records handed to the engine
    pub records_received: usize,
    /// Records that landed in a grid bucket
    pub records_bucketed: usize,
    /// Records dropped because their local date is outside the timeframe
    pub out_of_period: usize,
    /// Records whose non-finite value or baseline was coerced to zero
    pub non_finite_coerced: usize,
    /// Records the boundary adapter could not parse
    pub skipped_malformed: usize,
}

/// Where the baseline colour change sits on the chart's value axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GradientOffset {
    /// Normalised position in `[0, 1]`, measured from the top of the domain
    pub offset: f64,
    /// False when the chart must fall back to a single solid colour
    pub usable: bool,
}

/// Everything a chart or summary card needs for one timeframe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartReport {
    pub timeframe: TimeframeSpec,
    /// Non-cumulative per-bucket values in grid order
    pub buckets: Vec<BucketRow>,
    /// Cumulative rows in grid order
    pub series: Vec<SeriesRow>,
    /// High-usage windows (daily timeframe only)
    pub peak_windows: Vec<PeakWindow>,
    pub active_inactive: Sourced<ActiveInactiveTotals>,
    pub totals: ReportTotals,
    /// Flat period-wide baseline reference line
    pub flat_baseline: f64,
    pub baseline_source: DataSource,
    pub gradient: GradientOffset,
    pub diagnostics: Diagnostics,
}

impl ChartReport {
    /// Whether any bucket received data
    pub fn has_data(&self) -> bool {
        self.buckets.iter().any(|b| b.has_data)
    }

    /// Largest excess over the flat baseline across the series
    pub fn max_excess(&self) -> f64 {
        self.series.iter().map(|r| r.excess).fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_saved_may_be_negative() {
        let totals = ReportTotals::new(150.0, 144.0);
        assert_eq!(totals.total_saved, -6.0);
        assert!(totals.exceeded());

        let totals = ReportTotals::new(24.0, 144.0);
        assert_eq!(totals.total_saved, 120.0);
        assert!(!totals.exceeded());

        let totals = ReportTotals::new(f64::MAX, -f64::MAX);
        assert_eq!(totals.total_saved, -f64::MAX);
    }
}
