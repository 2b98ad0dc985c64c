//! Billing window
//!
//! The closed time range `[start, end]` to which billable time is clipped.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HyperbillError, Result};
use crate::timezone::TimezoneConfig;

/// A validated billing window with `start < end`
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use hyperbill_core::window::BillingWindow;
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let end = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
/// let window = BillingWindow::new(start, end).unwrap();
///
/// assert!(window.contains(start));
/// assert!(window.contains(end));
/// assert!(BillingWindow::new(end, start).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl BillingWindow {
    /// Create a window, rejecting empty or inverted ranges
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(HyperbillError::InvalidRequest(
                "Start date must be earlier than end date.".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    /// Create a window from calendar dates
    ///
    /// Both dates are taken at the start of the day in the configured
    /// timezone, so activity on `end` itself falls outside the window.
    pub fn from_dates(start: NaiveDate, end: NaiveDate, tz: &TimezoneConfig) -> Result<Self> {
        Self::new(tz.start_of_day(start)?, tz.start_of_day(end)?)
    }

    /// First instant of the window
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Last instant of the window
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether `timestamp` lies in the window, boundaries included
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn window() -> BillingWindow {
        BillingWindow::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_contains_boundaries() {
        let w = window();
        assert!(w.contains(w.start()));
        assert!(w.contains(w.end()));
        assert!(!w.contains(w.start() - TimeDelta::nanoseconds(1)));
        assert!(!w.contains(w.end() + TimeDelta::nanoseconds(1)));
    }

    #[test]
    fn test_rejects_empty_window() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let err = BillingWindow::new(t, t).unwrap_err();
        assert!(matches!(err, HyperbillError::InvalidRequest(_)));
    }

    #[test]
    fn test_from_dates() {
        let tz = TimezoneConfig::default();
        let w = BillingWindow::from_dates(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            &tz,
        )
        .unwrap();
        assert_eq!(w, window());

        let same_day = BillingWindow::from_dates(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            &tz,
        );
        assert!(same_day.is_err());
    }
}
