//! Time grid construction
//!
//! The grid is the ordered list of bucket keys a timeframe must contain.
//! Keys are unique and strictly ascending; every later stage walks them in
//! this order and never invents or drops a key on its own.
//!
//! | Timeframe | Keys                     | Label          |
//! |-----------|--------------------------|----------------|
//! | Daily     | `Hour(0..=23)`           | `08:00`        |
//! | Monthly   | `Day(1..=days_in_month)` | `5 Jan`        |
//! | Yearly    | `Month(0..=11)`          | `Jan`          |
//! | Custom    | `Date(start..=end)`      | `2024-01-05`   |

use crate::error::{MeterstatError, Result};
use crate::types::{GridKey, TimeframeSpec};
use chrono::{Month, NaiveDate};

/// One grid slot: key plus display label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSlot {
    pub key: GridKey,
    pub label: String,
}

/// Build the ordered grid for a timeframe
///
/// # Errors
///
/// Returns [`MeterstatError::InvalidTimeframe`] for a reversed custom range
/// or a month/year outside the supported bounds.
///
/// # Examples
///
/// ```
/// use meterstat::grid::build_grid;
/// use meterstat::types::{GridKey, TimeframeSpec};
///
/// let grid = build_grid(&TimeframeSpec::monthly(2024, 2)).unwrap();
/// assert_eq!(grid.len(), 29);
/// assert_eq!(grid[0].key, GridKey::Day(1));
/// assert_eq!(grid[0].label, "1 Feb");
/// ```
pub fn build_grid(spec: &TimeframeSpec) -> Result<Vec<GridSlot>> {
    spec.validate()?;

    let slots = match *spec {
        TimeframeSpec::Daily { .. } => hourly_slots(),
        TimeframeSpec::Monthly { year, month } => (1..=days_in_month(year, month)?)
            .map(|day| slot(GridKey::Day(day), spec))
            .collect(),
        TimeframeSpec::Yearly { .. } => (0..12)
            .map(|month| slot(GridKey::Month(month), spec))
            .collect(),
        TimeframeSpec::Custom { start, end } => start
            .iter_days()
            .take_while(|date| *date <= end)
            .map(|date| slot(GridKey::Date(date), spec))
            .collect(),
    };

    Ok(slots)
}

/// The 24 hour-of-day slots of a daily grid
pub fn hourly_slots() -> Vec<GridSlot> {
    (0..24)
        .map(|hour| GridSlot {
            key: GridKey::Hour(hour),
            label: format!("{hour:02}:00"),
        })
        .collect()
}

fn slot(key: GridKey, spec: &TimeframeSpec) -> GridSlot {
    GridSlot {
        key,
        label: label_for(&key, spec),
    }
}

/// Display label of a key within a timeframe
pub fn label_for(key: &GridKey, spec: &TimeframeSpec) -> String {
    match (key, spec) {
        (GridKey::Hour(hour), _) => format!("{hour:02}:00"),
        (GridKey::Day(day), TimeframeSpec::Monthly { month, .. }) => {
            format!("{day} {}", month_abbrev(month.saturating_sub(1)))
        }
        (GridKey::Day(day), _) => day.to_string(),
        (GridKey::Month(month), _) => month_abbrev(*month).to_string(),
        (GridKey::Date(date), _) => date.format("%Y-%m-%d").to_string(),
    }
}

/// Three-letter abbreviation of a zero-based month index
pub fn month_abbrev(month0: u32) -> &'static str {
    u8::try_from(month0 + 1)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| &m.name()[..3])
        .unwrap_or("???")
}

/// Number of days in a calendar month (1-based `month`)
pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| MeterstatError::InvalidTimeframe(format!("no such month {year}-{month}")))?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| MeterstatError::InvalidTimeframe(format!("no such month {year}-{month}")))?;

    Ok(next_first.signed_duration_since(first).num_days() as u32)
}

/// Expected number of keys for a timeframe
pub fn expected_len(spec: &TimeframeSpec) -> Result<usize> {
    spec.validate()?;
    Ok(match *spec {
        TimeframeSpec::Daily { .. } => 24,
        TimeframeSpec::Monthly { year, month } => days_in_month(year, month)? as usize,
        TimeframeSpec::Yearly { .. } => 12,
        TimeframeSpec::Custom { start, end } => {
            end.signed_duration_since(start).num_days() as usize + 1
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_grid() {
        let grid = build_grid(&TimeframeSpec::daily(date(2024, 1, 15))).unwrap();
        assert_eq!(grid.len(), 24);
        assert_eq!(grid[0].label, "00:00");
        assert_eq!(grid[8].label, "08:00");
        assert_eq!(grid[23].key, GridKey::Hour(23));
    }

    #[test]
    fn test_monthly_grid_handles_leap_years() {
        assert_eq!(build_grid(&TimeframeSpec::monthly(2024, 2)).unwrap().len(), 29);
        assert_eq!(build_grid(&TimeframeSpec::monthly(2023, 2)).unwrap().len(), 28);
        assert_eq!(build_grid(&TimeframeSpec::monthly(2024, 4)).unwrap().len(), 30);

        let december = build_grid(&TimeframeSpec::monthly(2024, 12)).unwrap();
        assert_eq!(december.len(), 31);
        assert_eq!(december[30].label, "31 Dec");
    }

    #[test]
    fn test_yearly_grid() {
        let grid = build_grid(&TimeframeSpec::yearly(2024)).unwrap();
        let labels: Vec<_> = grid.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"
            ]
        );
        assert_eq!(grid[0].key, GridKey::Month(0));
    }

    #[test]
    fn test_custom_grid_inclusive_range() {
        let grid =
            build_grid(&TimeframeSpec::custom(date(2024, 2, 28), date(2024, 3, 1))).unwrap();
        let keys: Vec<_> = grid.iter().map(|s| s.key).collect();
        assert_eq!(
            keys,
            vec![
                GridKey::Date(date(2024, 2, 28)),
                GridKey::Date(date(2024, 2, 29)),
                GridKey::Date(date(2024, 3, 1)),
            ]
        );
        assert_eq!(grid[1].label, "2024-02-29");
    }

    #[test]
    fn test_custom_single_day() {
        let day = date(2024, 5, 5);
        let grid = build_grid(&TimeframeSpec::custom(day, day)).unwrap();
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn test_reversed_custom_range_is_rejected() {
        let result = build_grid(&TimeframeSpec::custom(date(2024, 3, 2), date(2024, 3, 1)));
        assert!(matches!(result, Err(MeterstatError::InvalidTimeframe(_))));
    }

    #[test]
    fn test_keys_strictly_ascending() {
        for spec in [
            TimeframeSpec::daily(date(2024, 1, 1)),
            TimeframeSpec::monthly(2024, 1),
            TimeframeSpec::yearly(2024),
            TimeframeSpec::custom(date(2023, 12, 25), date(2024, 1, 5)),
        ] {
            let grid = build_grid(&spec).unwrap();
            assert!(grid.windows(2).all(|w| w[0].key < w[1].key));
            assert_eq!(grid.len(), expected_len(&spec).unwrap());
        }
    }

    #[test]
    fn test_month_abbrev() {
        assert_eq!(month_abbrev(0), "Jan");
        assert_eq!(month_abbrev(11), "Dec");
        assert_eq!(month_abbrev(12), "???");
    }
}
