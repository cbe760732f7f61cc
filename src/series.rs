//! Cumulative series construction
//!
//! Walks the buckets in grid order keeping two running sums: actual usage
//! and the baseline target. Both start at zero and carry across the whole
//! grid, including empty buckets. The sums saturate at `±f64::MAX`.

use crate::numeric::saturating_add;
use crate::types::{BucketRow, SeriesRow};

/// How the baseline is spread over the buckets of the period
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BaselineDistribution {
    /// The same amount is added for every bucket
    Flat { per_bucket: f64 },
    /// Each bucket adds the per-record baselines that landed in it
    PerBucket,
}

impl BaselineDistribution {
    /// Spread a period total evenly over `bucket_count` buckets
    pub fn even(period_total: f64, bucket_count: usize) -> Self {
        let per_bucket = if bucket_count == 0 {
            0.0
        } else {
            period_total / bucket_count as f64
        };
        Self::Flat { per_bucket }
    }

    /// Prefer per-bucket figures when any bucket carries one
    pub fn for_buckets(buckets: &[BucketRow], period_total: f64) -> Self {
        if buckets.iter().any(|b| b.baseline_value.is_some()) {
            Self::PerBucket
        } else {
            Self::even(period_total, buckets.len())
        }
    }

    fn amount_for(&self, bucket: &BucketRow) -> f64 {
        match self {
            Self::Flat { per_bucket } => *per_bucket,
            Self::PerBucket => bucket.baseline_value.unwrap_or(0.0),
        }
    }
}

/// Build cumulative rows from buckets
///
/// `excess` is left at zero; it is filled in from the flat period baseline
/// by [`crate::baseline::BaselineComparison::apply`].
///
/// # Examples
///
/// ```
/// use meterstat::series::{accumulate, BaselineDistribution};
/// use meterstat::types::{BucketRow, GridKey};
///
/// let mut a = BucketRow::empty(GridKey::Hour(0), "00:00");
/// a.raw_value = 2.0;
/// a.has_data = true;
/// let b = BucketRow::empty(GridKey::Hour(1), "01:00");
///
/// let rows = accumulate(&[a, b], BaselineDistribution::Flat { per_bucket: 1.5 });
/// assert_eq!(rows[1].cumulative_actual, 2.0);
/// assert_eq!(rows[1].cumulative_baseline, 3.0);
/// assert!(!rows[1].has_data);
/// ```
pub fn accumulate(buckets: &[BucketRow], distribution: BaselineDistribution) -> Vec<SeriesRow> {
    let mut running_actual = 0.0;
    let mut running_baseline = 0.0;

    buckets
        .iter()
        .map(|bucket| {
            running_actual = saturating_add(running_actual, bucket.raw_value);
            running_baseline = saturating_add(running_baseline, distribution.amount_for(bucket));
            SeriesRow {
                key: bucket.key,
                label: bucket.label.clone(),
                raw_value: bucket.raw_value,
                cumulative_actual: running_actual,
                cumulative_baseline: running_baseline,
                excess: 0.0,
                has_data: bucket.has_data,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GridKey;

    fn bucket(hour: u32, value: Option<f64>, baseline: Option<f64>) -> BucketRow {
        let mut row = BucketRow::empty(GridKey::Hour(hour), format!("{hour:02}:00"));
        if let Some(value) = value {
            row.raw_value = value;
            row.has_data = true;
        }
        row.baseline_value = baseline;
        row
    }

    #[test]
    fn test_running_sum_spans_empty_buckets() {
        let buckets = vec![
            bucket(0, Some(1.0), None),
            bucket(1, None, None),
            bucket(2, Some(2.0), None),
        ];
        let rows = accumulate(&buckets, BaselineDistribution::even(0.0, 3));
        let actual: Vec<_> = rows.iter().map(|r| r.cumulative_actual).collect();
        assert_eq!(actual, vec![1.0, 1.0, 3.0]);
        assert!(!rows[1].has_data);
        assert!(rows.iter().all(|r| r.excess == 0.0));
    }

    #[test]
    fn test_even_distribution() {
        let buckets: Vec<_> = (0..24).map(|h| bucket(h, None, None)).collect();
        let distribution = BaselineDistribution::for_buckets(&buckets, 144.0);
        assert_eq!(distribution, BaselineDistribution::Flat { per_bucket: 6.0 });

        let rows = accumulate(&buckets, distribution);
        assert_eq!(rows[0].cumulative_baseline, 6.0);
        assert_eq!(rows[23].cumulative_baseline, 144.0);
    }

    #[test]
    fn test_per_bucket_baselines_summed_verbatim() {
        let buckets = vec![
            bucket(0, Some(1.0), Some(4.0)),
            bucket(1, Some(1.0), None),
            bucket(2, Some(1.0), Some(0.5)),
        ];
        let distribution = BaselineDistribution::for_buckets(&buckets, 999.0);
        assert_eq!(distribution, BaselineDistribution::PerBucket);

        let rows = accumulate(&buckets, distribution);
        let baseline: Vec<_> = rows.iter().map(|r| r.cumulative_baseline).collect();
        assert_eq!(baseline, vec![4.0, 4.0, 4.5]);
    }

    #[test]
    fn test_empty_grid_distribution() {
        assert_eq!(
            BaselineDistribution::even(100.0, 0),
            BaselineDistribution::Flat { per_bucket: 0.0 }
        );
        assert!(accumulate(&[], BaselineDistribution::PerBucket).is_empty());
    }

    #[test]
    fn test_running_sums_saturate() {
        let buckets = vec![
            bucket(0, Some(f64::MAX), Some(f64::MAX)),
            bucket(1, Some(f64::MAX), Some(f64::MAX)),
        ];
        let rows = accumulate(&buckets, BaselineDistribution::PerBucket);
        assert_eq!(rows[1].cumulative_actual, f64::MAX);
        assert_eq!(rows[1].cumulative_baseline, f64::MAX);
    }
}
