//! Invoice data types for hyperbill
//!
//! Pure data structures handed to the presentation layer. They carry no
//! formatting or currency logic; prices are plain `f64` amounts.

use chrono::{DateTime, TimeDelta, Utc};

use crate::types::{ActiveInterval, CardId, Tier, TierMap, duration_hours};
use crate::window::BillingWindow;

/// Billed time and price for one tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierReport {
    /// Hourly rate for the tier
    pub rate_per_hour: f64,
    /// Active time across all cards of the tier
    pub total_duration: TimeDelta,
    /// `total_duration` in hours times `rate_per_hour`
    pub total_price: f64,
}

impl TierReport {
    /// Price a tier's accumulated time
    ///
    /// The duration is converted to fractional hours and multiplied by the
    /// rate with no rounding in between.
    pub fn new(rate_per_hour: f64, total_duration: TimeDelta) -> Self {
        Self {
            rate_per_hour,
            total_duration,
            total_price: duration_hours(total_duration) * rate_per_hour,
        }
    }

    /// Billed time in fractional hours
    pub fn hours(&self) -> f64 {
        duration_hours(self.total_duration)
    }
}

impl Default for TierReport {
    fn default() -> Self {
        Self::new(0.0, TimeDelta::zero())
    }
}

/// Per-card detail, only populated for detailed invoices
#[derive(Debug, Clone, PartialEq)]
pub struct CardBreakdown {
    /// Card identifier
    pub card_id: CardId,
    /// Card title
    pub name: String,
    /// Tier the card was billed under
    pub tier: Tier,
    /// Active intervals inside the billing window
    pub intervals: Vec<ActiveInterval>,
    /// Sum of the interval durations
    pub duration: TimeDelta,
}

/// A finished invoice for one billing window
///
/// Built once per request and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    window: BillingWindow,
    reports: TierMap<TierReport>,
    total_price: f64,
    cards: Option<Vec<CardBreakdown>>,
}

impl Invoice {
    /// Assemble an invoice from per-tier reports
    pub fn new(window: BillingWindow, reports: TierMap<TierReport>) -> Self {
        // Highest tier first, matching the order reports are presented in
        let total_price = Tier::ALL
            .iter()
            .rev()
            .map(|tier| reports[*tier].total_price)
            .sum();

        Self {
            window,
            reports,
            total_price,
            cards: None,
        }
    }

    /// Attach per-card detail
    pub fn with_cards(mut self, cards: Vec<CardBreakdown>) -> Self {
        self.cards = Some(cards);
        self
    }

    pub fn window_start(&self) -> DateTime<Utc> {
        self.window.start()
    }

    pub fn window_end(&self) -> DateTime<Utc> {
        self.window.end()
    }

    /// Report for a single tier
    pub fn report(&self, tier: Tier) -> &TierReport {
        &self.reports[tier]
    }

    /// All five tier reports
    pub fn reports(&self) -> &TierMap<TierReport> {
        &self.reports
    }

    /// Sum of the five tier prices
    pub fn total_price(&self) -> f64 {
        self.total_price
    }

    /// Total billed time across tiers
    pub fn total_duration(&self) -> TimeDelta {
        self.reports
            .iter()
            .fold(TimeDelta::zero(), |acc, (_, report)| acc + report.total_duration)
    }

    /// Per-card detail, if requested when building
    pub fn cards(&self) -> Option<&[CardBreakdown]> {
        self.cards.as_deref()
    }
}
