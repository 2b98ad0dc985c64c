//! Timezone utilities for billing windows
//!
//! Billing windows are requested as calendar dates. This module decides in
//! which timezone those dates start, detects the system's local timezone,
//! and parses timezone strings from user input.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;
use tracing::debug;

use crate::error::{HyperbillError, Result};

/// Configuration for timezone handling
#[derive(Debug, Clone)]
pub struct TimezoneConfig {
    /// The timezone in which window dates start
    pub tz: Tz,
    /// Whether the timezone is UTC
    pub is_utc: bool,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self {
            tz: Tz::UTC,
            is_utc: true,
        }
    }
}

impl TimezoneConfig {
    /// Create a new timezone configuration from CLI arguments
    ///
    /// An explicit timezone wins over `use_local`; with neither, dates are
    /// read as UTC days.
    pub fn from_cli(timezone_str: Option<&str>, use_local: bool) -> Result<Self> {
        let tz = match timezone_str {
            Some(tz_str) => Tz::from_str(tz_str).map_err(|_| {
                HyperbillError::InvalidTimezone(format!(
                    "'{}'. Use format like 'America/New_York', 'Asia/Manila', or 'UTC'",
                    tz_str
                ))
            })?,
            None if use_local => get_local_timezone(),
            None => Tz::UTC,
        };

        Ok(Self {
            tz,
            is_utc: tz == Tz::UTC,
        })
    }

    /// Get the display name for the configured timezone
    pub fn display_name(&self) -> &str {
        if self.is_utc { "UTC" } else { self.tz.name() }
    }

    /// The instant at which `date` begins in the configured timezone
    pub fn start_of_day(&self, date: NaiveDate) -> Result<DateTime<Utc>> {
        let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| {
            HyperbillError::InvalidDate(format!("{date} has no midnight"))
        })?;

        self.tz
            .from_local_datetime(&midnight)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| {
                HyperbillError::InvalidDate(format!(
                    "{date} does not start at midnight in {}",
                    self.display_name()
                ))
            })
    }
}

/// The zone named by `TZ`, else the system zone, else UTC
pub fn get_local_timezone() -> Tz {
    let name = std::env::var("TZ")
        .ok()
        .filter(|tz| Tz::from_str(tz).is_ok())
        .or_else(|| iana_time_zone::get_timezone().ok());

    match name.as_deref().map(Tz::from_str) {
        Some(Ok(tz)) => {
            debug!("Using local timezone {}", tz.name());
            tz
        }
        _ => {
            debug!("Could not detect a local timezone ({:?}), using UTC", name);
            Tz::UTC
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ENV_MUTEX, ScopedEnv};

    #[test]
    fn test_timezone_config_defaults_to_utc() {
        let config = TimezoneConfig::from_cli(None, false).unwrap();
        assert!(config.is_utc);
        assert_eq!(config.tz, Tz::UTC);
        assert_eq!(config.display_name(), "UTC");
    }

    #[test]
    fn test_timezone_config_explicit() {
        let config = TimezoneConfig::from_cli(Some("Asia/Manila"), false).unwrap();
        assert!(!config.is_utc);
        assert_eq!(config.tz.name(), "Asia/Manila");
    }

    #[test]
    fn test_timezone_config_explicit_beats_local() {
        let config = TimezoneConfig::from_cli(Some("Europe/Paris"), true).unwrap();
        assert_eq!(config.tz.name(), "Europe/Paris");
    }

    #[test]
    fn test_timezone_config_invalid() {
        let result = TimezoneConfig::from_cli(Some("Invalid/Timezone"), false);
        assert!(matches!(result, Err(HyperbillError::InvalidTimezone(_))));
    }

    #[tokio::test]
    async fn test_local_timezone_from_env() {
        let _lock = ENV_MUTEX.lock().await;
        let _tz = ScopedEnv::set("TZ", "America/New_York");

        let config = TimezoneConfig::from_cli(None, true).unwrap();
        assert_eq!(config.tz.name(), "America/New_York");
        assert!(!config.is_utc);
    }

    #[test]
    fn test_start_of_day_utc() {
        let config = TimezoneConfig::default();
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let start = config.start_of_day(date).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-02-01T00:00:00+00:00");
    }

    #[test]
    fn test_start_of_day_offset() {
        let config = TimezoneConfig::from_cli(Some("Asia/Manila"), false).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let start = config.start_of_day(date).unwrap();
        // Manila is UTC+8 with no DST
        assert_eq!(start.to_rfc3339(), "2024-01-31T16:00:00+00:00");
    }
}
