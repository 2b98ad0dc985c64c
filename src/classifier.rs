//! Tier classification
//!
//! Every card is billed under exactly one tier. The tier comes from the
//! card's labels: the highest tier whose name appears as a label wins, and
//! a card with no tier label is billed as T1.

use crate::types::{Card, Tier};

/// Pick the tier for a set of label names
///
/// # Examples
/// ```
/// use hyperbill::classifier::classify;
/// use hyperbill::types::Tier;
///
/// let labels = vec!["T2".to_string(), "T5".to_string()];
/// assert_eq!(classify(&labels), Tier::T5);
/// assert_eq!(classify(&[]), Tier::T1);
/// ```
pub fn classify(labels: &[String]) -> Tier {
    highest_tier(|name| labels.iter().any(|label| label == name))
}

/// Pick the tier for a card
pub fn classify_card(card: &Card) -> Tier {
    highest_tier(|name| card.has_label(name))
}

fn highest_tier(has_label: impl Fn(&str) -> bool) -> Tier {
    Tier::ALL
        .into_iter()
        .rev()
        .find(|tier| has_label(tier.as_str()))
        .unwrap_or(Tier::T1)
}
