//! hyperbill - Tiered billing invoices from Trello card history
//!
//! This library provides functionality to:
//! - Reconstruct the time each card spent in active lists
//! - Classify cards into price tiers by label
//! - Aggregate billed time per tier and price it at hourly rates
//! - Render invoices and board listings as tables or JSON
//!
//! The data model, errors and the board service trait live in
//! `hyperbill-core` and are re-exported here; the Trello client lives in
//! `hyperbill-trello`.
//!
//! # Examples
//!
//! ```no_run
//! use hyperbill::{
//!     invoice::create_invoice,
//!     output::get_formatter,
//!     request::{InvoiceRequest, parse_date},
//!     timezone::TimezoneConfig,
//!     types::Rates,
//! };
//! use hyperbill_trello::TrelloClient;
//!
//! #[tokio::main]
//! async fn main() -> hyperbill::Result<()> {
//!     let client = TrelloClient::new("api-key", "token");
//!     let tz = TimezoneConfig::default();
//!     let request = InvoiceRequest::new(
//!         "5f0c1a2b3c4d5e6f7a8b9c0d",
//!         parse_date("2024-01-01")?,
//!         parse_date("2024-02-01")?,
//!         Rates::new([25.0, 35.0, 45.0, 55.0, 65.0]),
//!         &tz,
//!     )?;
//!
//!     let invoice = create_invoice(&client, &request).await?;
//!     println!("{}", get_formatter(false, tz.tz).format_invoice(&invoice));
//!     Ok(())
//! }
//! ```

pub mod aggregation;
pub mod classifier;
pub mod cli;
pub mod intervals;
pub mod invoice;
pub mod output;
pub mod request;

pub use hyperbill_core::{error, invoice_types, provider, timezone, types, window};

// Re-export commonly used types
pub use error::{HyperbillError, Result};
pub use invoice_types::Invoice;
pub use types::{ActiveInterval, BoardId, Card, CardId, Event, Rates, Tier};
