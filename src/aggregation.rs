//! Aggregation module for per-tier billed time
//!
//! The [`Aggregator`] folds each card's active intervals into a running
//! total per tier. Adding durations is commutative and associative, so the
//! totals do not depend on the order in which cards are fed in, and two
//! aggregators built over disjoint card sets can be merged.
//!
//! # Examples
//!
//! ```
//! use chrono::{TimeDelta, TimeZone, Utc};
//! use hyperbill::aggregation::Aggregator;
//! use hyperbill::types::{ActiveInterval, Rates, Tier};
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
//! let interval = ActiveInterval::new(start, start + TimeDelta::hours(3));
//!
//! let mut aggregator = Aggregator::new();
//! aggregator.accumulate(Tier::T2, &[interval]);
//!
//! let reports = aggregator.into_reports(&Rates::new([0.0, 40.0, 0.0, 0.0, 0.0]));
//! assert_eq!(reports[Tier::T2].total_price, 120.0);
//! ```

use chrono::TimeDelta;
use tracing::debug;

use crate::intervals::total_duration;
use crate::invoice_types::TierReport;
use crate::types::{ActiveInterval, Rates, Tier, TierMap};

/// Running per-tier totals of billed time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregator {
    durations: TierMap<TimeDelta>,
    cards: usize,
}

impl Aggregator {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one card's intervals to its tier
    pub fn accumulate(&mut self, tier: Tier, intervals: &[ActiveInterval]) -> TimeDelta {
        let duration = total_duration(intervals);
        self.durations[tier] += duration;
        self.cards += 1;
        debug!(
            "Added {}s to {} ({} intervals)",
            duration.num_seconds(),
            tier,
            intervals.len()
        );
        duration
    }

    /// Fold another aggregator's totals into this one
    pub fn merge(mut self, other: Aggregator) -> Self {
        for (tier, duration) in other.durations.iter() {
            self.durations[tier] += *duration;
        }
        self.cards += other.cards;
        self
    }

    /// Time accumulated for a tier
    pub fn total_duration(&self, tier: Tier) -> TimeDelta {
        self.durations[tier]
    }

    /// Number of cards folded in so far
    pub fn card_count(&self) -> usize {
        self.cards
    }

    /// Price every tier at its hourly rate
    pub fn into_reports(self, rates: &Rates) -> TierMap<TierReport> {
        TierMap::from_fn(|tier| TierReport::new(rates[tier], self.durations[tier]))
    }
}
