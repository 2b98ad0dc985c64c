//! Common test utilities and helpers for hyperbill tests
//!
//! This module provides card and event builders plus an in-memory board
//! service so tests can drive the full invoice pipeline without network
//! access.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use hyperbill::{
    error::{AuthFailure, HyperbillError, Result},
    provider::BoardSource,
    types::{Board, BoardId, Card, CardId, Event},
    window::BillingWindow,
};
use std::collections::HashMap;
use std::sync::Mutex;

/// Board ID used across tests
pub const TEST_BOARD: &str = "5f0c1a2b3c4d5e6f7a8b9c0d";

/// Common active and idle list names
pub const TODO: &str = "To Do";
pub const DOING: &str = "Doing (IP)";
pub const REVIEW: &str = "Review (IP)";
pub const DONE: &str = "Done";

/// A UTC instant in January 2024
pub fn jan(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, minute, 0).unwrap()
}

/// The whole of January 2024
pub fn january() -> BillingWindow {
    BillingWindow::new(jan(1, 0, 0), Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()).unwrap()
}

pub fn board_id() -> BoardId {
    BoardId::parse(TEST_BOARD).unwrap()
}

/// Builder for a card and its event log
pub struct CardBuilder {
    id: CardId,
    name: String,
    labels: Vec<String>,
    events: Vec<Event>,
}

impl CardBuilder {
    /// Create a new builder with no labels and no history
    pub fn new(id: &str) -> Self {
        Self {
            id: CardId::new(id),
            name: String::new(),
            labels: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.labels.push(label.to_string());
        self
    }

    /// Record a move between two lists
    pub fn moved(mut self, at: DateTime<Utc>, from: &str, to: &str) -> Self {
        self.events
            .push(Event::list_changed(self.id.clone(), at, from, to));
        self
    }

    /// Record a non-move action such as a comment
    pub fn touched(mut self, at: DateTime<Utc>, kind: &str) -> Self {
        self.events.push(Event::other(self.id.clone(), at, kind));
        self
    }

    /// Enter an active list at `start` and leave it `minutes` later
    pub fn session(self, start: DateTime<Utc>, minutes: i64) -> Self {
        self.moved(start, TODO, DOING)
            .moved(start + TimeDelta::minutes(minutes), DOING, DONE)
    }

    /// Push a raw event, e.g. a malformed one
    pub fn with_event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    pub fn build(self) -> (Card, Vec<Event>) {
        let card = Card::new(self.id.as_str(), self.labels).with_name(self.name);
        (card, self.events)
    }
}

/// In-memory board service
///
/// Records every card whose history was requested, in order, and can be
/// told to fail the boards call, the cards call, or one card's history.
#[derive(Default)]
pub struct MockBoard {
    boards: Vec<Board>,
    cards: Vec<Card>,
    events: HashMap<CardId, Vec<Event>>,
    fail_boards: Option<fn() -> HyperbillError>,
    fail_cards: Option<fn() -> HyperbillError>,
    fail_card: Option<(CardId, fn() -> HyperbillError)>,
    fetched: Mutex<Vec<CardId>>,
}

impl MockBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_board(mut self, id: &str, name: &str) -> Self {
        self.boards.push(Board {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn with_card(mut self, (card, events): (Card, Vec<Event>)) -> Self {
        self.events.insert(card.id.clone(), events);
        self.cards.push(card);
        self
    }

    pub fn failing_boards(mut self, err: fn() -> HyperbillError) -> Self {
        self.fail_boards = Some(err);
        self
    }

    pub fn failing_cards(mut self, err: fn() -> HyperbillError) -> Self {
        self.fail_cards = Some(err);
        self
    }

    pub fn failing_card(mut self, id: &str, err: fn() -> HyperbillError) -> Self {
        self.fail_card = Some((CardId::new(id), err));
        self
    }

    /// Cards whose history was requested so far
    pub fn fetched(&self) -> Vec<CardId> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl BoardSource for MockBoard {
    async fn fetch_boards(&self) -> Result<Vec<Board>> {
        if let Some(err) = self.fail_boards {
            return Err(err());
        }
        Ok(self.boards.clone())
    }

    async fn fetch_cards(&self, _board_id: &BoardId) -> Result<Vec<Card>> {
        if let Some(err) = self.fail_cards {
            return Err(err());
        }
        Ok(self.cards.clone())
    }

    async fn fetch_card_events(&self, card_id: &CardId) -> Result<Vec<Event>> {
        self.fetched.lock().unwrap().push(card_id.clone());
        if let Some((ref id, err)) = self.fail_card {
            if id == card_id {
                return Err(err());
            }
        }
        Ok(self.events.get(card_id).cloned().unwrap_or_default())
    }
}

pub fn invalid_token() -> HyperbillError {
    HyperbillError::Unauthorized(AuthFailure::InvalidToken)
}

pub fn upstream_down() -> HyperbillError {
    HyperbillError::Upstream("HTTP 503 Service Unavailable: try later".to_string())
}

/// Assert that two floating point values are approximately equal
pub fn assert_approx_eq(a: f64, b: f64, tolerance: f64) {
    assert!(
        (a - b).abs() < tolerance,
        "Values not approximately equal: {a} vs {b} (tolerance: {tolerance})"
    );
}
