//! Invoice building
//!
//! For every card on a board the builder fetches the card's activity log,
//! reconstructs its active intervals inside the billing window, classifies
//! the card into a tier, and folds the result into per-tier totals. Prices
//! are computed once all cards are in.
//!
//! Cards are processed one after the other. The first error of any kind
//! aborts the build; no partial invoice is returned.
//!
//! # Examples
//!
//! ```no_run
//! use hyperbill::{
//!     invoice::InvoiceBuilder,
//!     request::{InvoiceRequest, parse_date},
//!     timezone::TimezoneConfig,
//!     types::Rates,
//! };
//! use hyperbill_trello::TrelloClient;
//!
//! # async fn example() -> hyperbill::Result<()> {
//! let client = TrelloClient::new("api-key", "token");
//! let request = InvoiceRequest::new(
//!     "5f0c1a2b3c4d5e6f7a8b9c0d",
//!     parse_date("2024-01-01")?,
//!     parse_date("2024-02-01")?,
//!     Rates::new([25.0, 35.0, 45.0, 55.0, 65.0]),
//!     &TimezoneConfig::default(),
//! )?;
//!
//! let invoice = InvoiceBuilder::from_request(&request)
//!     .build_from_source(&client, request.board_id())
//!     .await?;
//! println!("Total: {:.2}", invoice.total_price());
//! # Ok(())
//! # }
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::aggregation::Aggregator;
use crate::classifier::classify_card;
use crate::error::Result;
use crate::intervals::reconstruct;
use crate::invoice_types::{CardBreakdown, Invoice};
use crate::provider::BoardSource;
use crate::request::{InvoiceRequest, validate_rates};
use crate::types::{Board, BoardId, Card, Event, Rates};
use crate::window::BillingWindow;

/// Builds an [`Invoice`] for one billing window and set of rates
#[derive(Debug, Clone)]
pub struct InvoiceBuilder {
    rates: Rates,
    window: BillingWindow,
    detailed: bool,
    show_progress: bool,
}

impl InvoiceBuilder {
    /// Create a builder, rejecting negative or non-finite rates
    pub fn new(rates: Rates, window: BillingWindow) -> Result<Self> {
        validate_rates(&rates)?;
        Ok(Self {
            rates,
            window,
            detailed: false,
            show_progress: false,
        })
    }

    /// Create a builder from an already validated request
    pub fn from_request(request: &InvoiceRequest) -> Self {
        Self {
            rates: *request.rates(),
            window: *request.window(),
            detailed: false,
            show_progress: false,
        }
    }

    /// Attach per-card detail to the invoice
    pub fn with_details(mut self, detailed: bool) -> Self {
        self.detailed = detailed;
        self
    }

    /// Enable or disable the progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Build from cards whose event logs are already in memory
    pub fn build<I>(&self, cards: I) -> Result<Invoice>
    where
        I: IntoIterator<Item = (Card, Vec<Event>)>,
    {
        let mut tally = Tally::new(self.detailed);
        for (card, events) in cards {
            self.add_card(&mut tally, &card, &events)?;
        }
        Ok(self.finish(tally))
    }

    /// Fetch a board's cards and their event logs, then build
    ///
    /// Each card's log is fetched only after the previous card has been
    /// processed.
    pub async fn build_from_source<S>(&self, source: &S, board_id: &BoardId) -> Result<Invoice>
    where
        S: BoardSource + ?Sized,
    {
        let cards = source.fetch_cards(board_id).await?;
        info!("Building invoice for {} cards on board {}", cards.len(), board_id);

        let progress = self.progress_bar(cards.len() as u64);
        let mut tally = Tally::new(self.detailed);

        for card in &cards {
            let events = source.fetch_card_events(&card.id).await?;
            self.add_card(&mut tally, card, &events)?;

            if let Some(ref pb) = progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        Ok(self.finish(tally))
    }

    fn add_card(&self, tally: &mut Tally, card: &Card, events: &[Event]) -> Result<()> {
        let intervals = reconstruct(events, &self.window)?;
        let tier = classify_card(card);
        let duration = tally.aggregator.accumulate(tier, &intervals);
        debug!(
            "Card {} billed as {} for {}s over {} intervals",
            card.id,
            tier,
            duration.num_seconds(),
            intervals.len()
        );

        if let Some(ref mut cards) = tally.cards {
            cards.push(CardBreakdown {
                card_id: card.id.clone(),
                name: card.name.clone(),
                tier,
                intervals,
                duration,
            });
        }
        Ok(())
    }

    fn finish(&self, tally: Tally) -> Invoice {
        let card_count = tally.aggregator.card_count();
        let invoice = Invoice::new(self.window, tally.aggregator.into_reports(&self.rates));
        info!(
            "Invoice covers {} cards, total price {:.2}",
            card_count,
            invoice.total_price()
        );

        match tally.cards {
            Some(cards) => invoice.with_cards(cards),
            None => invoice,
        }
    }

    fn progress_bar(&self, len: u64) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new(len);
        let style = ProgressStyle::with_template(
            "{spinner:.green} {msg} [{elapsed_precise}] {bar:30} {pos}/{len} cards",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb.set_message("Fetching card history");
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Some(pb)
    }
}

struct Tally {
    aggregator: Aggregator,
    cards: Option<Vec<CardBreakdown>>,
}

impl Tally {
    fn new(detailed: bool) -> Self {
        Self {
            aggregator: Aggregator::new(),
            cards: detailed.then(Vec::new),
        }
    }
}

/// Build the invoice a validated request asks for
pub async fn create_invoice<S>(source: &S, request: &InvoiceRequest) -> Result<Invoice>
where
    S: BoardSource + ?Sized,
{
    InvoiceBuilder::from_request(request)
        .build_from_source(source, request.board_id())
        .await
}

/// Boards the authenticated member can bill against
pub async fn list_boards<S>(source: &S) -> Result<Vec<Board>>
where
    S: BoardSource + ?Sized,
{
    let boards = source.fetch_boards().await?;
    info!("Found {} boards", boards.len());
    Ok(boards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HyperbillError;
    use crate::types::{CardId, EventKind, Tier};
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    fn window() -> BillingWindow {
        BillingWindow::new(at(1, 0), at(31, 0)).unwrap()
    }

    fn session(card: &str, day: u32, from: u32, to: u32) -> Vec<Event> {
        let id = CardId::new(card);
        vec![
            Event::list_changed(id.clone(), at(day, from), "To Do", "Doing (IP)"),
            Event::list_changed(id, at(day, to), "Doing (IP)", "Done"),
        ]
    }

    fn card(id: &str, labels: &[&str]) -> Card {
        Card::new(id, labels.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_single_card_invoice() {
        let rates = Rates::new([50.0, 0.0, 0.0, 0.0, 0.0]);
        let builder = InvoiceBuilder::new(rates, window()).unwrap();
        let invoice = builder
            .build(vec![(card("c1", &[]), session("c1", 3, 9, 11))])
            .unwrap();

        assert_eq!(invoice.report(Tier::T1).total_duration, TimeDelta::hours(2));
        assert_eq!(invoice.report(Tier::T1).total_price, 100.0);
        assert_eq!(invoice.total_price(), 100.0);
        assert!(invoice.cards().is_none());
    }

    #[test]
    fn test_cards_split_across_tiers() {
        let rates = Rates::new([10.0, 20.0, 30.0, 40.0, 50.0]);
        let builder = InvoiceBuilder::new(rates, window()).unwrap();
        let invoice = builder
            .build(vec![
                (card("a", &["T2", "T5"]), session("a", 3, 9, 10)),
                (card("b", &["T3"]), session("b", 4, 9, 12)),
                (card("c", &["T3"]), session("c", 5, 9, 10)),
                (card("d", &["misc"]), Vec::new()),
            ])
            .unwrap();

        assert_eq!(invoice.report(Tier::T5).total_duration, TimeDelta::hours(1));
        assert_eq!(invoice.report(Tier::T3).total_duration, TimeDelta::hours(4));
        assert_eq!(invoice.report(Tier::T2).total_duration, TimeDelta::zero());
        assert_eq!(invoice.total_price(), 50.0 + 120.0);
    }

    #[test]
    fn test_detailed_invoice() {
        let builder = InvoiceBuilder::new(Rates::default(), window())
            .unwrap()
            .with_details(true);
        let invoice = builder
            .build(vec![(
                card("c1", &["T4"]).with_name("Checkout flow"),
                session("c1", 3, 9, 11),
            )])
            .unwrap();

        let cards = invoice.cards().unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name, "Checkout flow");
        assert_eq!(cards[0].tier, Tier::T4);
        assert_eq!(cards[0].intervals.len(), 1);
        assert_eq!(cards[0].duration, TimeDelta::hours(2));
    }

    #[test]
    fn test_malformed_event_aborts_build() {
        let builder = InvoiceBuilder::new(Rates::default(), window()).unwrap();
        let broken = vec![Event {
            card_id: CardId::new("bad"),
            timestamp: at(3, 9),
            kind: EventKind::ListChanged,
            list_before: None,
            list_after: Some("Doing (IP)".to_string()),
        }];
        let result = builder.build(vec![
            (card("ok", &[]), session("ok", 2, 9, 10)),
            (card("bad", &[]), broken),
        ]);
        assert!(matches!(result, Err(HyperbillError::MalformedEvent { .. })));
    }

    struct StaticBoard(Vec<(Card, Vec<Event>)>);

    #[async_trait::async_trait]
    impl BoardSource for StaticBoard {
        async fn fetch_boards(&self) -> Result<Vec<Board>> {
            Ok(vec![Board {
                id: "5f0c1a2b3c4d5e6f7a8b9c0d".to_string(),
                name: "Client Work".to_string(),
            }])
        }

        async fn fetch_cards(&self, _board_id: &BoardId) -> Result<Vec<Card>> {
            Ok(self.0.iter().map(|(card, _)| card.clone()).collect())
        }

        async fn fetch_card_events(&self, card_id: &CardId) -> Result<Vec<Event>> {
            Ok(self
                .0
                .iter()
                .find(|(card, _)| &card.id == card_id)
                .map(|(_, events)| events.clone())
                .unwrap_or_default())
        }
    }

    #[test]
    fn test_source_matches_in_memory_build() {
        let cards = vec![
            (card("a", &["T2"]), session("a", 3, 9, 12)),
            (card("b", &[]), session("b", 4, 9, 10)),
        ];
        let board = StaticBoard(cards.clone());
        let builder = InvoiceBuilder::new(Rates::new([10.0, 20.0, 0.0, 0.0, 0.0]), window())
            .unwrap();
        let board_id = BoardId::parse("5f0c1a2b3c4d5e6f7a8b9c0d").unwrap();

        let fetched = tokio_test::block_on(builder.build_from_source(&board, &board_id)).unwrap();
        assert_eq!(fetched, builder.build(cards).unwrap());
        assert_eq!(fetched.total_price(), 70.0);

        let boards = tokio_test::block_on(list_boards(&board)).unwrap();
        assert_eq!(boards[0].name, "Client Work");
    }

    #[test]
    fn test_negative_rate_rejected() {
        let rates = Rates::new([10.0, -1.0, 0.0, 0.0, 0.0]);
        let err = InvoiceBuilder::new(rates, window()).unwrap_err();
        assert!(matches!(err, HyperbillError::InvalidRequest(_)));
    }
}
