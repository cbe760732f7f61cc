//! Peak window detection for the hourly (Daily) grid
//!
//! A bucket is a peak when its value is at least 80% of the day's maximum
//! or at least the fifth-highest value of the day, whichever admits more
//! buckets. Consecutive peak hours form a window, and windows whose labels
//! are at most two hours apart (e.g. 10:00 and 12:00) are merged.

use crate::numeric::saturating_add;
use crate::types::{BucketRow, GridKey, PeakWindow};

/// Fraction of the maximum a bucket must reach to qualify
pub const PEAK_RATIO: f64 = 0.8;
/// The N highest buckets always qualify
pub const TOP_N: usize = 5;
/// Windows whose end and next start are at most this many hours apart merge
pub const MERGE_GAP_HOURS: u32 = 2;

#[derive(Debug, Clone, Copy)]
struct WindowAcc {
    start: u32,
    end: u32,
    count: usize,
    sum: f64,
    peak: f64,
}

impl WindowAcc {
    fn new(hour: u32, value: f64) -> Self {
        Self {
            start: hour,
            end: hour,
            count: 1,
            sum: value,
            peak: value,
        }
    }

    fn extend(&mut self, hour: u32, value: f64) {
        self.end = hour;
        self.count += 1;
        self.sum = saturating_add(self.sum, value);
        self.peak = self.peak.max(value);
    }

    fn merge(&mut self, other: &WindowAcc) {
        self.end = other.end;
        self.count += other.count;
        self.sum = saturating_add(self.sum, other.sum);
        self.peak = self.peak.max(other.peak);
    }

    fn into_window(self) -> PeakWindow {
        let start_key = GridKey::Hour(self.start);
        let end_key = GridKey::Hour(self.end);
        let label = if self.start == self.end {
            start_key.to_string()
        } else {
            format!("{start_key}–{end_key}")
        };

        PeakWindow {
            start_key,
            end_key,
            label,
            bucket_count: self.count,
            average_value: self.sum / self.count as f64,
            peak_value: self.peak,
        }
    }
}

/// Find and merge high-usage windows in hourly buckets
///
/// Buckets without data never qualify. Returns an empty list when no bucket
/// has data; otherwise at least one window is returned, falling back to the
/// single maximum bucket when no bucket passes the thresholds.
///
/// # Examples
///
/// ```
/// use meterstat::peaks::detect_peak_windows;
/// use meterstat::types::{BucketRow, GridKey};
///
/// let buckets: Vec<BucketRow> = (0..24)
///     .map(|h| {
///         let mut row = BucketRow::empty(GridKey::Hour(h), format!("{h:02}:00"));
///         if (17..=19).contains(&h) {
///             row.raw_value = 10.0;
///             row.has_data = true;
///         }
///         row
///     })
///     .collect();
///
/// let windows = detect_peak_windows(&buckets);
/// assert_eq!(windows.len(), 1);
/// assert_eq!(windows[0].label, "17:00–19:00");
/// ```
pub fn detect_peak_windows(buckets: &[BucketRow]) -> Vec<PeakWindow> {
    let mut with_data: Vec<(u32, f64)> = buckets
        .iter()
        .filter(|b| b.has_data)
        .filter_map(|b| b.key.hour().map(|hour| (hour, b.raw_value)))
        .collect();
    if with_data.is_empty() {
        return Vec::new();
    }
    with_data.sort_by_key(|(hour, _)| *hour);

    let max_value = with_data
        .iter()
        .map(|(_, value)| *value)
        .fold(f64::NEG_INFINITY, f64::max);

    let mut ranked: Vec<f64> = with_data.iter().map(|(_, value)| *value).collect();
    ranked.sort_by(|a, b| b.total_cmp(a));
    let top_n_cutoff = ranked[ranked.len().min(TOP_N) - 1];

    let mut peaks: Vec<(u32, f64)> = with_data
        .iter()
        .copied()
        .filter(|(_, value)| {
            *value > 0.0 && (*value >= PEAK_RATIO * max_value || *value >= top_n_cutoff)
        })
        .collect();

    if peaks.is_empty() {
        // Degenerate data (nothing positive): surface the maximum bucket alone
        if let Some(max_bucket) = with_data.iter().find(|(_, value)| *value == max_value) {
            peaks.push(*max_bucket);
        }
    }

    merge_close_windows(group_consecutive(&peaks))
        .into_iter()
        .map(WindowAcc::into_window)
        .collect()
}

fn group_consecutive(peaks: &[(u32, f64)]) -> Vec<WindowAcc> {
    let mut windows: Vec<WindowAcc> = Vec::new();
    for &(hour, value) in peaks {
        match windows.last_mut() {
            Some(current) if hour == current.end + 1 => current.extend(hour, value),
            _ => windows.push(WindowAcc::new(hour, value)),
        }
    }
    windows
}

fn merge_close_windows(windows: Vec<WindowAcc>) -> Vec<WindowAcc> {
    let mut merged: Vec<WindowAcc> = Vec::with_capacity(windows.len());
    for window in windows {
        match merged.last_mut() {
            Some(previous) if window.start - previous.end <= MERGE_GAP_HOURS => {
                previous.merge(&window)
            }
            _ => merged.push(window),
        }
    }
    merged
}
