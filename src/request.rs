//! Invoice request validation
//!
//! Everything a caller supplies is checked here, before the board service
//! is contacted: the board ID, the billing window, and the five hourly
//! rates.

use chrono::NaiveDate;

use crate::error::{HyperbillError, Result};
use crate::timezone::TimezoneConfig;
use crate::types::{BoardId, Rates};
use crate::window::BillingWindow;

/// A validated request for one invoice
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRequest {
    board_id: BoardId,
    window: BillingWindow,
    rates: Rates,
}

impl InvoiceRequest {
    /// Validate raw request parameters
    ///
    /// Window dates are read as the start of the day in `tz`.
    pub fn new(
        board_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        rates: Rates,
        tz: &TimezoneConfig,
    ) -> Result<Self> {
        let board_id = BoardId::parse(board_id)?;
        let window = BillingWindow::from_dates(start, end, tz)?;
        validate_rates(&rates)?;

        Ok(Self {
            board_id,
            window,
            rates,
        })
    }

    pub fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    pub fn window(&self) -> &BillingWindow {
        &self.window
    }

    pub fn rates(&self) -> &Rates {
        &self.rates
    }
}

/// Reject negative or non-finite rates
pub fn validate_rates(rates: &Rates) -> Result<()> {
    for (tier, rate) in rates.iter() {
        if !rate.is_finite() {
            return Err(HyperbillError::InvalidRequest(format!(
                "{tier} rate must be a finite number"
            )));
        }
        if *rate < 0.0 {
            return Err(HyperbillError::InvalidRequest(format!(
                "{tier} rate cannot be less than zero"
            )));
        }
    }
    Ok(())
}

/// Parse a calendar date in `YYYY-MM-DD` form
pub fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
        HyperbillError::InvalidDate(format!("'{date_str}', expected YYYY-MM-DD: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Tier;

    const BOARD: &str = "5f0c1a2b3c4d5e6f7a8b9c0d";

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn rates() -> Rates {
        Rates::new([10.0, 20.0, 30.0, 40.0, 50.0])
    }

    #[test]
    fn test_valid_request() {
        let request = InvoiceRequest::new(
            BOARD,
            date("2024-01-01"),
            date("2024-02-01"),
            rates(),
            &TimezoneConfig::default(),
        )
        .unwrap();

        assert_eq!(request.board_id().as_str(), BOARD);
        assert_eq!(
            request.window().start().to_rfc3339(),
            "2024-01-01T00:00:00+00:00"
        );
        assert_eq!(request.window().end().to_rfc3339(), "2024-02-01T00:00:00+00:00");
        assert_eq!(request.rates()[Tier::T4], 40.0);
    }

    #[test]
    fn test_invalid_board_id() {
        let err = InvoiceRequest::new(
            "abc",
            date("2024-01-01"),
            date("2024-02-01"),
            rates(),
            &TimezoneConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, HyperbillError::InvalidRequest(_)));
    }

    #[test]
    fn test_window_order() {
        let tz = TimezoneConfig::default();
        let inverted =
            InvoiceRequest::new(BOARD, date("2024-02-01"), date("2024-01-01"), rates(), &tz);
        assert!(matches!(inverted, Err(HyperbillError::InvalidRequest(_))));

        let empty =
            InvoiceRequest::new(BOARD, date("2024-01-01"), date("2024-01-01"), rates(), &tz);
        assert!(matches!(empty, Err(HyperbillError::InvalidRequest(_))));
    }

    #[test]
    fn test_negative_rate() {
        let mut bad = rates();
        bad[Tier::T3] = -0.01;
        let err = validate_rates(&bad).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid request: T3 rate cannot be less than zero"
        );
    }

    #[test]
    fn test_non_finite_rate() {
        let mut bad = rates();
        bad[Tier::T1] = f64::NAN;
        assert!(validate_rates(&bad).is_err());
        bad[Tier::T1] = f64::INFINITY;
        assert!(validate_rates(&bad).is_err());
    }

    #[test]
    fn test_zero_rates_are_valid() {
        assert!(validate_rates(&Rates::default()).is_ok());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(date("2024-03-09").to_string(), "2024-03-09");
        assert!(matches!(
            parse_date("2024-13-01"),
            Err(HyperbillError::InvalidDate(_))
        ));
        assert!(parse_date("03/09/2024").is_err());
    }
}
