//! Core domain types for hyperbill
//!
//! This module contains the fundamental types used throughout the hyperbill library.
//! These types provide strong typing for board and card identifiers, price tiers,
//! list change events and the active intervals reconstructed from them.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

use crate::error::{HyperbillError, Result};

/// Marker that flags a list as "in progress" when it appears in the list name
pub const ACTIVE_LIST_MARKER: &str = "(IP)";

/// Whether a list name denotes the active (in progress) state.
///
/// Activity is decided by a substring of the free-text list name, not by a
/// list identifier. Renaming a list on the board therefore changes how past
/// moves are billed.
///
/// # Examples
/// ```
/// use hyperbill_core::types::is_active_list_name;
///
/// assert!(is_active_list_name("Doing (IP)"));
/// assert!(!is_active_list_name("Doing"));
/// ```
pub fn is_active_list_name(name: &str) -> bool {
    name.contains(ACTIVE_LIST_MARKER)
}

const NANOS_PER_HOUR: i64 = 3_600_000_000_000;

/// Convert a duration to fractional hours without intermediate rounding
///
/// Whole hours and the sub-hour remainder are converted separately so that
/// long durations keep full nanosecond precision in the fraction.
///
/// # Examples
/// ```
/// use chrono::TimeDelta;
/// use hyperbill_core::types::duration_hours;
///
/// assert_eq!(duration_hours(TimeDelta::minutes(90)), 1.5);
/// ```
pub fn duration_hours(duration: TimeDelta) -> f64 {
    match duration.num_nanoseconds() {
        Some(nanos) => {
            let hours = nanos / NANOS_PER_HOUR;
            let rest = nanos % NANOS_PER_HOUR;
            hours as f64 + rest as f64 / NANOS_PER_HOUR as f64
        }
        None => duration.num_seconds() as f64 / 3600.0,
    }
}

/// Strongly-typed card ID wrapper
///
/// # Examples
/// ```
/// use hyperbill_core::types::CardId;
///
/// let card = CardId::new("65a1f0c2e4b0a1b2c3d4e5f6");
/// assert_eq!(card.as_str(), "65a1f0c2e4b0a1b2c3d4e5f6");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(String);

impl CardId {
    /// Create a new CardId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CardId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validated Trello board ID
///
/// Board IDs are 24 hexadecimal digits. Parsing is the only way to obtain
/// one, so every `BoardId` that reaches the board service is well formed.
///
/// # Examples
/// ```
/// use hyperbill_core::types::BoardId;
///
/// assert!(BoardId::parse("5f0c1a2b3c4d5e6f7a8b9c0d").is_ok());
/// assert!(BoardId::parse("not-a-board").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardId(String);

impl BoardId {
    /// Number of hex digits in a board ID
    pub const LEN: usize = 24;

    /// Parse a board ID, rejecting anything that is not 24 hex digits
    pub fn parse(id: &str) -> Result<Self> {
        if id.len() == Self::LEN && id.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self(id.to_string()))
        } else {
            Err(HyperbillError::InvalidRequest(format!(
                "Invalid Trello board ID: {id}"
            )))
        }
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A board visible to the authenticated member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Board ID as reported by the service
    pub id: String,
    /// Human-readable board name
    pub name: String,
}

/// A unit of trackable work on a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Card identifier
    pub id: CardId,
    /// Card title, only used for detailed reports
    #[serde(default)]
    pub name: String,
    /// Label names; tier markers are among them
    pub labels: Vec<String>,
}

impl Card {
    /// Create a card without a title
    pub fn new(id: impl Into<String>, labels: Vec<String>) -> Self {
        Self {
            id: CardId::new(id),
            name: String::new(),
            labels,
        }
    }

    /// Set the card title
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether the card carries a label with exactly this name
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// Price tier a card is billed under
///
/// # Examples
/// ```
/// use hyperbill_core::types::Tier;
/// use std::str::FromStr;
///
/// assert_eq!(Tier::from_str("T3").unwrap(), Tier::T3);
/// assert_eq!(Tier::T5.to_string(), "T5");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    T1,
    T2,
    T3,
    T4,
    T5,
}

impl Tier {
    /// All tiers in ascending order
    pub const ALL: [Tier; 5] = [Tier::T1, Tier::T2, Tier::T3, Tier::T4, Tier::T5];

    /// Label name that marks a card with this tier
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::T1 => "T1",
            Tier::T2 => "T2",
            Tier::T3 => "T3",
            Tier::T4 => "T4",
            Tier::T5 => "T5",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Tier::ALL
            .into_iter()
            .find(|tier| tier.as_str() == s)
            .ok_or_else(|| format!("Invalid tier: {s}"))
    }
}

/// One value per tier, indexed by [`Tier`]
///
/// # Examples
/// ```
/// use hyperbill_core::types::{Tier, TierMap};
///
/// let mut hours: TierMap<f64> = TierMap::default();
/// hours[Tier::T2] += 1.5;
/// assert_eq!(hours[Tier::T2], 1.5);
/// assert_eq!(hours[Tier::T1], 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TierMap<T>([T; 5]);

impl<T> TierMap<T> {
    /// Build a map from per-tier values, in T1..T5 order
    pub fn new(values: [T; 5]) -> Self {
        Self(values)
    }

    /// Build a map by computing a value for every tier
    pub fn from_fn(mut f: impl FnMut(Tier) -> T) -> Self {
        Self(Tier::ALL.map(&mut f))
    }

    /// Iterate over `(tier, value)` pairs in ascending tier order
    pub fn iter(&self) -> impl Iterator<Item = (Tier, &T)> {
        Tier::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<Tier> for TierMap<T> {
    type Output = T;

    fn index(&self, tier: Tier) -> &T {
        &self.0[tier.index()]
    }
}

impl<T> IndexMut<Tier> for TierMap<T> {
    fn index_mut(&mut self, tier: Tier) -> &mut T {
        &mut self.0[tier.index()]
    }
}

/// Hourly rate per tier
pub type Rates = TierMap<f64>;

/// What kind of change an event records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// The card moved from one list to another
    ListChanged,
    /// Any other activity; carries the raw action type
    Other(String),
}

/// A timestamped fact from a card's activity log
///
/// For `ListChanged` events the list names are expected to be present.
/// They stay optional here because the board service can hand back
/// entries where they are not readable; that is reported when the event
/// is consumed, not when it is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Card the event belongs to
    pub card_id: CardId,
    /// When the change happened
    pub timestamp: DateTime<Utc>,
    /// Kind of change
    pub kind: EventKind,
    /// Name of the list the card left
    pub list_before: Option<String>,
    /// Name of the list the card entered
    pub list_after: Option<String>,
}

impl Event {
    /// Create a list change event
    pub fn list_changed(
        card_id: CardId,
        timestamp: DateTime<Utc>,
        list_before: impl Into<String>,
        list_after: impl Into<String>,
    ) -> Self {
        Self {
            card_id,
            timestamp,
            kind: EventKind::ListChanged,
            list_before: Some(list_before.into()),
            list_after: Some(list_after.into()),
        }
    }

    /// Create an event of any other kind
    pub fn other(card_id: CardId, timestamp: DateTime<Utc>, kind: impl Into<String>) -> Self {
        Self {
            card_id,
            timestamp,
            kind: EventKind::Other(kind.into()),
            list_before: None,
            list_after: None,
        }
    }

    /// Whether the event records a list membership change
    pub fn is_list_change(&self) -> bool {
        self.kind == EventKind::ListChanged
    }
}

/// A span of continuous active time for one card
///
/// `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveInterval {
    /// When the card entered an active list
    pub start: DateTime<Utc>,
    /// When the card left it, or the last recorded event
    pub end: DateTime<Utc>,
}

impl ActiveInterval {
    /// Create an interval
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        debug_assert!(start <= end, "interval ends before it starts");
        Self { start, end }
    }

    /// Length of the interval
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}
