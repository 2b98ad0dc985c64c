//! Board service trait
//!
//! This module defines the `BoardSource` trait that board clients must
//! implement. Invoice building only sees boards, cards and card events
//! through it, so a client can be swapped for an in-memory fixture or a
//! batching implementation without touching the billing logic.

use crate::error::Result;
use crate::types::{Board, BoardId, Card, CardId, Event};
use async_trait::async_trait;

/// Read access to a project board's cards and their activity logs.
///
/// Implementations report credential problems as
/// [`HyperbillError::Unauthorized`](crate::error::HyperbillError::Unauthorized)
/// and every other failure as an upstream error.
#[async_trait]
pub trait BoardSource: Send + Sync {
    /// Boards visible to the authenticated member.
    async fn fetch_boards(&self) -> Result<Vec<Board>>;

    /// All cards on a board.
    async fn fetch_cards(&self, board_id: &BoardId) -> Result<Vec<Card>>;

    /// A card's activity log, in whatever order the service returns it.
    async fn fetch_card_events(&self, card_id: &CardId) -> Result<Vec<Event>>;
}
