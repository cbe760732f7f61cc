//! Timezone utilities and the hour-of-day policy
//!
//! Every calendar field the engine reads from a timestamp (hour, day,
//! month, year, date) goes through [`TimezoneConfig::local`]: the instant is
//! converted into the one configured zone first. A fixed offset such as
//! +05:30 is expressed as the matching IANA zone (`Asia/Kolkata`).

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use std::str::FromStr;
use tracing::debug;

/// Configuration for timezone handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimezoneConfig {
    /// The timezone calendar fields are extracted in
    pub tz: Tz,
    /// Whether the timezone is UTC
    pub is_utc: bool,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self::new(get_local_timezone())
    }
}

impl TimezoneConfig {
    /// Create a configuration for an explicit zone
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            is_utc: tz == Tz::UTC,
        }
    }

    /// UTC configuration
    pub fn utc() -> Self {
        Self::new(Tz::UTC)
    }

    /// Create a new timezone configuration from CLI arguments
    pub fn from_cli(timezone_str: Option<&str>, use_utc: bool) -> crate::error::Result<Self> {
        if use_utc {
            return Ok(Self::utc());
        }

        if let Some(tz_str) = timezone_str {
            let tz = Tz::from_str(tz_str).map_err(|_| {
                crate::error::MeterstatError::InvalidTimezone(format!(
                    "'{}'. Use format like 'Asia/Kolkata', 'Europe/London', or 'UTC'",
                    tz_str
                ))
            })?;
            Ok(Self::new(tz))
        } else {
            Ok(Self::default())
        }
    }

    /// Get the display name for the configured timezone
    pub fn display_name(&self) -> &str {
        if self.is_utc { "UTC" } else { self.tz.name() }
    }

    /// Convert an instant into the configured zone
    pub fn local(&self, ts: &DateTime<Utc>) -> DateTime<Tz> {
        ts.with_timezone(&self.tz)
    }

    /// Hour of day (0-23) of an instant in the configured zone
    pub fn hour_of_day(&self, ts: &DateTime<Utc>) -> u32 {
        self.local(ts).hour()
    }

    /// Calendar date of an instant in the configured zone
    pub fn local_date(&self, ts: &DateTime<Utc>) -> NaiveDate {
        self.local(ts).date_naive()
    }

    /// Interpret an offset-less wall-clock time as local to the configured zone
    ///
    /// Ambiguous times (DST fall-back) resolve to the earlier instant. Times
    /// skipped by a DST spring-forward do not exist and yield `None`.
    pub fn from_wall_clock(&self, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
        self.tz
            .from_local_datetime(naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Zone used when neither `--utc` nor `--timezone` is given
///
/// Tries the `TZ` variable, then the system zone reported by
/// `iana-time-zone`, and falls back to UTC.
pub fn get_local_timezone() -> Tz {
    let from_env = std::env::var("TZ")
        .ok()
        .and_then(|name| Tz::from_str(&name).ok());
    if let Some(tz) = from_env {
        debug!("Using timezone from TZ: {}", tz.name());
        return tz;
    }

    match iana_time_zone::get_timezone().map(|name| Tz::from_str(&name).map_err(|_| name)) {
        Ok(Ok(tz)) => {
            debug!("Using system timezone: {}", tz.name());
            tz
        }
        Ok(Err(name)) => {
            debug!("Unknown system timezone '{}', using UTC", name);
            Tz::UTC
        }
        Err(e) => {
            debug!("System timezone unavailable ({:?}), using UTC", e);
            Tz::UTC
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::New_York;

    /// Sets `TZ` for one test and restores the previous value on drop
    struct TzVar(Option<String>);

    impl TzVar {
        fn set(value: &str) -> Self {
            let previous = std::env::var("TZ").ok();
            // Only this test writes TZ
            unsafe { std::env::set_var("TZ", value) };
            Self(previous)
        }
    }

    impl Drop for TzVar {
        fn drop(&mut self) {
            unsafe {
                match &self.0 {
                    Some(previous) => std::env::set_var("TZ", previous),
                    None => std::env::remove_var("TZ"),
                }
            }
        }
    }

    fn wall_clock(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_timezone_config_utc() {
        let config = TimezoneConfig::from_cli(None, true).unwrap();
        assert!(config.is_utc);
        assert_eq!(config.tz, Tz::UTC);
        assert_eq!(config.display_name(), "UTC");
    }

    #[test]
    fn test_timezone_config_explicit() {
        let config = TimezoneConfig::from_cli(Some("Asia/Kolkata"), false).unwrap();
        assert!(!config.is_utc);
        assert_eq!(config.display_name(), "Asia/Kolkata");
    }

    #[test]
    fn test_timezone_config_invalid() {
        let result = TimezoneConfig::from_cli(Some("Invalid/Timezone"), false);
        assert!(result.is_err());
    }

    #[test]
    fn test_utc_flag_overrides_timezone() {
        let config = TimezoneConfig::from_cli(Some("Asia/Tokyo"), true).unwrap();
        assert!(config.is_utc);
    }

    #[test]
    fn test_hour_of_day_uses_configured_zone() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 2, 45, 0).unwrap();
        assert_eq!(TimezoneConfig::utc().hour_of_day(&ts), 2);

        // +05:30 pushes 02:45Z to 08:15 local
        let ist = TimezoneConfig::new(chrono_tz::Asia::Kolkata);
        assert_eq!(ist.hour_of_day(&ts), 8);
    }

    #[test]
    fn test_local_date_crosses_midnight() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 20, 0, 0).unwrap();
        let ist = TimezoneConfig::new(chrono_tz::Asia::Kolkata);
        assert_eq!(
            ist.local_date(&ts),
            NaiveDate::from_ymd_opt(2024, 1, 16).unwrap()
        );
    }

    #[test]
    fn test_from_wall_clock() {
        let ist = TimezoneConfig::new(chrono_tz::Asia::Kolkata);
        let naive = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let instant = ist.from_wall_clock(&naive).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 1, 15, 2, 30, 0).unwrap());
        assert_eq!(ist.hour_of_day(&instant), 8);
    }

    #[test]
    fn test_ambiguous_wall_clock_takes_earlier_instant() {
        // 01:30 happens twice on 2024-11-03 in New York: EDT first, then EST
        let ny = TimezoneConfig::new(New_York);
        let instant = ny.from_wall_clock(&wall_clock(2024, 11, 3, 1, 30)).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 11, 3, 5, 30, 0).unwrap());
        assert_eq!(ny.hour_of_day(&instant), 1);
    }

    #[test]
    fn test_wall_clock_skipped_by_spring_forward_is_none() {
        let ny = TimezoneConfig::new(New_York);
        assert_eq!(ny.from_wall_clock(&wall_clock(2024, 3, 10, 2, 30)), None);

        let after = ny.from_wall_clock(&wall_clock(2024, 3, 10, 3, 0)).unwrap();
        assert_eq!(after, Utc.with_ymd_and_hms(2024, 3, 10, 7, 0, 0).unwrap());
    }

    #[test]
    fn test_tz_env_var_detection() {
        let _tz = TzVar::set("Europe/Berlin");
        assert_eq!(get_local_timezone(), chrono_tz::Europe::Berlin);
    }
}
