//! Comparison of cumulative actual usage against the flat period baseline
//!
//! The chart draws the period baseline as a constant horizontal line and the
//! actual usage as a cumulative line. The excess at each point is the part
//! of the cumulative actual above that constant line; it is what the chart
//! shades red. It is not measured against the cumulative baseline.

use crate::numeric::saturating_sub;
use crate::types::SeriesRow;

/// Excess per row plus the period saving
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineComparison {
    /// `max(0, cumulative_actual - total_baseline)` per row
    pub excess_per_row: Vec<f64>,
    /// `total_baseline - final cumulative actual`; negative on exceedance
    pub total_saved: f64,
}

impl BaselineComparison {
    /// Produce the final rows with `excess` filled in
    pub fn apply(&self, series: Vec<SeriesRow>) -> Vec<SeriesRow> {
        series
            .into_iter()
            .zip(self.excess_per_row.iter())
            .map(|(row, &excess)| SeriesRow { excess, ..row })
            .collect()
    }
}

/// Compare a cumulative series with the period-wide baseline target
///
/// # Examples
///
/// ```
/// use meterstat::baseline::compare_to_baseline;
/// use meterstat::types::{GridKey, SeriesRow};
///
/// let row = |key: u32, cumulative_actual: f64| SeriesRow {
///     key: GridKey::Day(key),
///     label: key.to_string(),
///     raw_value: 0.0,
///     cumulative_actual,
///     cumulative_baseline: 0.0,
///     excess: 0.0,
///     has_data: true,
/// };
///
/// let comparison = compare_to_baseline(&[row(1, 80.0), row(2, 130.0)], 100.0);
/// assert_eq!(comparison.excess_per_row, vec![0.0, 30.0]);
/// assert_eq!(comparison.total_saved, -30.0);
/// ```
pub fn compare_to_baseline(series: &[SeriesRow], total_baseline: f64) -> BaselineComparison {
    let excess_per_row = series
        .iter()
        .map(|row| saturating_sub(row.cumulative_actual, total_baseline).max(0.0))
        .collect();
    let final_actual = series.last().map_or(0.0, |row| row.cumulative_actual);

    BaselineComparison {
        excess_per_row,
        total_saved: saturating_sub(total_baseline, final_actual),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GridKey;

    fn rows(cumulative: &[f64]) -> Vec<SeriesRow> {
        cumulative
            .iter()
            .enumerate()
            .map(|(i, &c)| SeriesRow {
                key: GridKey::Hour(i as u32),
                label: format!("{i:02}:00"),
                raw_value: 0.0,
                cumulative_actual: c,
                cumulative_baseline: (i as f64 + 1.0) * 6.0,
                excess: 0.0,
                has_data: true,
            })
            .collect()
    }

    #[test]
    fn test_excess_is_against_flat_line_not_cumulative_baseline() {
        // Row 0 is above its cumulative baseline (6) but below the flat line (20)
        let series = rows(&[10.0, 15.0, 25.0]);
        let comparison = compare_to_baseline(&series, 20.0);
        assert_eq!(comparison.excess_per_row, vec![0.0, 0.0, 5.0]);
    }

    #[test]
    fn test_total_saved_positive_when_under_baseline() {
        let comparison = compare_to_baseline(&rows(&[4.0, 24.0]), 144.0);
        assert_eq!(comparison.total_saved, 120.0);
        assert!(comparison.excess_per_row.iter().all(|e| *e == 0.0));
    }

    #[test]
    fn test_empty_series() {
        let comparison = compare_to_baseline(&[], 50.0);
        assert!(comparison.excess_per_row.is_empty());
        assert_eq!(comparison.total_saved, 50.0);
    }

    #[test]
    fn test_apply_fills_excess() {
        let series = rows(&[10.0, 30.0]);
        let comparison = compare_to_baseline(&series, 20.0);
        let applied = comparison.apply(series);
        assert_eq!(applied[0].excess, 0.0);
        assert_eq!(applied[1].excess, 10.0);
        assert_eq!(applied[1].cumulative_actual, 30.0);
    }

    #[test]
    fn test_extreme_differences_stay_finite() {
        let comparison = compare_to_baseline(&rows(&[f64::MAX]), -f64::MAX);
        assert_eq!(comparison.excess_per_row, vec![f64::MAX]);
        assert_eq!(comparison.total_saved, -f64::MAX);
    }
}
