//! Thin Trello REST client
//!
//! Only fetches what billing needs: the member's boards, a board's cards
//! with their label names, and each card's activity log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hyperbill_core::error::{AuthFailure, HyperbillError, Result};
use hyperbill_core::provider::BoardSource;
use hyperbill_core::types::{Board, BoardId, Card, CardId, Event, EventKind};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Trello REST API base URL
const TRELLO_BASE_URL: &str = "https://api.trello.com/1/";

/// Action type Trello records for card updates, list moves included
const UPDATE_CARD_ACTION: &str = "updateCard";

/// Authenticated Trello client
pub struct TrelloClient {
    api_key: String,
    token: String,
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for TrelloClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrelloClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl TrelloClient {
    /// Create a client for the public Trello API
    pub fn new(api_key: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            token: token.into(),
            base_url: TRELLO_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the client at another API root (must end with `/`)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}{}?key={}&token={}",
            self.base_url, path, self.api_key, self.token
        )
    }

    /// GET a path and decode the JSON body
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!("GET {}{}", self.base_url, path);
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(redact)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(redact)?;
            return Err(classify_failure(status.as_u16(), &body));
        }

        response.json::<T>().await.map_err(redact)
    }
}

#[async_trait]
impl BoardSource for TrelloClient {
    /// Calls GET members/me/boards
    async fn fetch_boards(&self) -> Result<Vec<Board>> {
        let boards: Vec<BoardResponse> = self.get("members/me/boards").await?;
        Ok(boards
            .into_iter()
            .map(|b| Board {
                id: b.id,
                name: b.name,
            })
            .collect())
    }

    /// Calls GET boards/{boardID}/cards
    async fn fetch_cards(&self, board_id: &BoardId) -> Result<Vec<Card>> {
        let cards: Vec<CardResponse> = self.get(&format!("boards/{board_id}/cards")).await?;
        debug!("Board {} has {} cards", board_id, cards.len());
        Ok(cards.into_iter().map(CardResponse::into_card).collect())
    }

    /// Calls GET cards/{cardID}/actions
    async fn fetch_card_events(&self, card_id: &CardId) -> Result<Vec<Event>> {
        // TODO: batch these through /batch once boards get large enough to hit rate limits
        let actions: Vec<Action> = self.get(&format!("cards/{card_id}/actions")).await?;
        actions
            .into_iter()
            .map(|action| action.into_event(card_id))
            .collect()
    }
}

/// The request URL carries the key and token as query parameters
fn redact(err: reqwest::Error) -> HyperbillError {
    HyperbillError::from(err.without_url())
}

/// Map a failed response to an error
///
/// Trello answers credential problems with a plain-text body naming the
/// bad credential.
pub fn classify_failure(status: u16, body: &str) -> HyperbillError {
    match body.trim() {
        "invalid key" => HyperbillError::Unauthorized(AuthFailure::InvalidKey),
        "invalid app token" => HyperbillError::Unauthorized(AuthFailure::InvalidToken),
        _ if status == 401 => HyperbillError::Unauthorized(AuthFailure::Rejected),
        other => HyperbillError::Upstream(format!("HTTP {status}: {other}")),
    }
}

#[derive(Debug, Deserialize)]
struct BoardResponse {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct CardResponse {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    labels: Vec<LabelResponse>,
}

#[derive(Debug, Deserialize)]
struct LabelResponse {
    #[serde(default)]
    name: String,
}

impl CardResponse {
    fn into_card(self) -> Card {
        let labels = self.labels.into_iter().map(|l| l.name).collect();
        Card::new(self.id, labels).with_name(self.name)
    }
}

/// One entry of a card's activity log as Trello returns it
#[derive(Debug, Clone, Deserialize)]
pub struct Action {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub date: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Action {
    /// Convert to an [`Event`]
    ///
    /// An `updateCard` action that mentions `listBefore` or `listAfter` is a
    /// list change. List names that are missing or not strings are kept as
    /// `None` and reported once the event is used.
    pub fn into_event(self, card_id: &CardId) -> Result<Event> {
        let timestamp = DateTime::parse_from_rfc3339(&self.date)
            .map_err(|e| {
                HyperbillError::InvalidDate(format!(
                    "'{}' on action {} of card {}: {}",
                    self.date, self.id, card_id, e
                ))
            })?
            .with_timezone(&Utc);

        let moves_list =
            self.data.get("listBefore").is_some() || self.data.get("listAfter").is_some();
        if self.kind != UPDATE_CARD_ACTION || !moves_list {
            return Ok(Event::other(card_id.clone(), timestamp, self.kind));
        }

        Ok(Event {
            card_id: card_id.clone(),
            timestamp,
            kind: EventKind::ListChanged,
            list_before: list_name(&self.data, "listBefore"),
            list_after: list_name(&self.data, "listAfter"),
        })
    }
}

fn list_name(data: &serde_json::Value, key: &str) -> Option<String> {
    data.get(key)?.get("name")?.as_str().map(str::to_string)
}
