//! Active / inactive hours split
//!
//! Hours `[08:00, 20:00)` local are "active", the rest "inactive". When the
//! upstream service already returns a split it is authoritative and passed
//! through unchanged.

use crate::types::{ActiveInactiveTotals, BucketRow};
use std::ops::Range;

/// Local hours counted as active
pub const ACTIVE_HOURS: Range<u32> = 8..20;

/// Whether an hour of day falls in the active range
pub fn is_active_hour(hour: u32) -> bool {
    ACTIVE_HOURS.contains(&hour)
}

/// Split hourly buckets into active and inactive totals
///
/// Buckets without an hourly key are ignored.
///
/// # Examples
///
/// ```
/// use meterstat::active_hours::split_active_inactive;
/// use meterstat::types::{ActiveInactiveTotals, BucketRow, GridKey};
///
/// let mut night = BucketRow::empty(GridKey::Hour(2), "02:00");
/// night.raw_value = 1.0;
/// let mut day = BucketRow::empty(GridKey::Hour(9), "09:00");
/// day.raw_value = 4.0;
///
/// let split = split_active_inactive(&[night.clone(), day.clone()], None);
/// assert_eq!(split, ActiveInactiveTotals::new(4.0, 1.0));
///
/// let server = ActiveInactiveTotals::new(10.0, 10.0);
/// assert_eq!(split_active_inactive(&[night, day], Some(server)), server);
/// ```
pub fn split_active_inactive(
    buckets: &[BucketRow],
    precomputed: Option<ActiveInactiveTotals>,
) -> ActiveInactiveTotals {
    if let Some(precomputed) = precomputed {
        return precomputed;
    }

    buckets
        .iter()
        .filter_map(|b| b.key.hour().map(|hour| (hour, b.raw_value)))
        .fold(ActiveInactiveTotals::default(), |mut split, (hour, value)| {
            if is_active_hour(hour) {
                split += ActiveInactiveTotals::new(value, 0.0);
            } else {
                split += ActiveInactiveTotals::new(0.0, value);
            }
            split
        })
}
