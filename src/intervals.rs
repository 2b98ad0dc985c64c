//! Active interval reconstruction
//!
//! Turns a card's activity log into the spans of time during which the card
//! sat in an active list. Lists count as active when their name contains
//! [`ACTIVE_LIST_MARKER`](crate::types::ACTIVE_LIST_MARKER).
//!
//! The log is replayed as a two-state machine (idle / active) in timestamp
//! order. Only events inside the billing window are replayed; a transition
//! recorded outside the window is dropped along with its event, so a card
//! that entered an active list before the window opened is not billed for
//! the part of its session that falls inside the window.
//!
//! A card that is still active when its log ends is billed up to its last
//! recorded event inside the window, not up to the end of the window.
//!
//! # Examples
//!
//! ```
//! use chrono::{TimeDelta, TimeZone, Utc};
//! use hyperbill::intervals::{reconstruct, total_duration};
//! use hyperbill::types::{CardId, Event};
//! use hyperbill::window::BillingWindow;
//!
//! let card = CardId::new("c1");
//! let t0 = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
//! let t1 = Utc.with_ymd_and_hms(2024, 1, 10, 11, 0, 0).unwrap();
//! let events = vec![
//!     Event::list_changed(card.clone(), t1, "Doing (IP)", "Done"),
//!     Event::list_changed(card.clone(), t0, "Backlog", "Doing (IP)"),
//! ];
//!
//! let window = BillingWindow::new(
//!     Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
//!     Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
//! )
//! .unwrap();
//!
//! let intervals = reconstruct(&events, &window).unwrap();
//! assert_eq!(intervals.len(), 1);
//! assert_eq!(total_duration(&intervals), TimeDelta::hours(2));
//! ```

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, warn};

use crate::error::{HyperbillError, Result};
use crate::types::{ActiveInterval, Event, is_active_list_name};
use crate::window::BillingWindow;

#[derive(Debug, Clone, Copy)]
enum State {
    Idle,
    Active { since: DateTime<Utc> },
}

/// Reconstruct the active intervals of one card inside `window`
///
/// Events may be passed in any order. They are sorted by whole-second
/// timestamp with a stable sort, so events within the same second are
/// replayed in the order they were given. An exit replayed after an entry
/// but stamped earlier in that second closes a zero-length interval.
///
/// # Errors
///
/// Returns [`HyperbillError::MalformedEvent`] when a list change inside the
/// window lacks a readable list name.
pub fn reconstruct(events: &[Event], window: &BillingWindow) -> Result<Vec<ActiveInterval>> {
    let mut ordered: Vec<&Event> = events.iter().collect();
    ordered.sort_by_key(|event| event.timestamp.timestamp());

    let mut intervals = Vec::new();
    let mut state = State::Idle;
    let mut last_seen: Option<DateTime<Utc>> = None;

    for event in ordered {
        if !window.contains(event.timestamp) {
            continue;
        }
        last_seen = Some(event.timestamp);

        if !event.is_list_change() {
            continue;
        }

        let (before, after) = list_names(event)?;
        let left_active = is_active_list_name(before);
        let entered_active = is_active_list_name(after);

        state = match state {
            State::Idle if entered_active && !left_active => {
                debug!("Card {} became active at {}", event.card_id, event.timestamp);
                State::Active {
                    since: event.timestamp,
                }
            }
            State::Active { since } if left_active && !entered_active => {
                intervals.push(ActiveInterval::new(since, since.max(event.timestamp)));
                State::Idle
            }
            State::Idle if left_active && !entered_active => {
                debug!(
                    "Card {} left '{}' at {} without a recorded entry in the window",
                    event.card_id, before, event.timestamp
                );
                state
            }
            State::Active { since } if entered_active && !left_active => {
                warn!(
                    "Card {} entered '{}' at {} while already active since {}",
                    event.card_id, after, event.timestamp, since
                );
                state
            }
            _ => state,
        };
    }

    if let (State::Active { since }, Some(last)) = (state, last_seen) {
        intervals.push(ActiveInterval::new(since, since.max(last)));
    }

    Ok(intervals)
}

/// Sum of interval durations
pub fn total_duration(intervals: &[ActiveInterval]) -> TimeDelta {
    intervals
        .iter()
        .fold(TimeDelta::zero(), |acc, interval| acc + interval.duration())
}

fn list_names(event: &Event) -> Result<(&str, &str)> {
    let malformed = |field: &str| HyperbillError::MalformedEvent {
        card_id: event.card_id.clone(),
        reason: format!("list change at {} has no {field} name", event.timestamp),
    };

    let before = event
        .list_before
        .as_deref()
        .ok_or_else(|| malformed("listBefore"))?;
    let after = event
        .list_after
        .as_deref()
        .ok_or_else(|| malformed("listAfter"))?;
    Ok((before, after))
}
