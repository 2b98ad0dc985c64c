//! Output formatting module for hyperbill
//!
//! This module renders invoices and board listings in two formats:
//! - Table format for human-readable terminal output
//! - JSON format for machine-readable output and integration with other tools
//!
//! Currency and hour formatting happen only here; the invoice itself carries
//! raw amounts.
//!
//! # Examples
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use hyperbill::invoice_types::{Invoice, TierReport};
//! use hyperbill::output::get_formatter;
//! use hyperbill::types::TierMap;
//! use hyperbill::window::BillingWindow;
//!
//! let window = BillingWindow::new(
//!     Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
//!     Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
//! )
//! .unwrap();
//! let invoice = Invoice::new(window, TierMap::<TierReport>::default());
//!
//! let formatter = get_formatter(false, chrono_tz::UTC);
//! println!("{}", formatter.format_invoice(&invoice));
//!
//! let json_formatter = get_formatter(true, chrono_tz::UTC);
//! assert!(json_formatter.format_invoice(&invoice).contains("\"total_price\""));
//! ```

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use prettytable::{Table, format, row};
use serde_json::json;

use crate::invoice_types::{CardBreakdown, Invoice, TierReport};
use crate::types::{Board, Tier, duration_hours};

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format a finished invoice
    fn format_invoice(&self, invoice: &Invoice) -> String;

    /// Format the boards available for billing
    fn format_boards(&self, boards: &[Board]) -> String;
}

/// Table formatter for human-readable output
pub struct TableFormatter {
    /// Zone the window bounds and card intervals are shown in
    pub tz: Tz,
}

impl TableFormatter {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Format currency with dollar sign
    fn format_currency(amount: f64) -> String {
        format!("${amount:.2}")
    }

    /// Format a duration as fractional hours
    fn format_hours(duration: TimeDelta) -> String {
        format!("{:.2}h", duration_hours(duration))
    }

    fn format_datetime(&self, dt: &DateTime<Utc>) -> String {
        dt.with_timezone(&self.tz).format("%Y-%m-%d %H:%M %Z").to_string()
    }

    fn tier_table(invoice: &Invoice) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![b -> "Tier", b -> "Rate", b -> "Hours", b -> "Price"]);

        for (tier, report) in invoice.reports().iter() {
            table.add_row(Self::tier_row(tier, report));
        }

        table.add_row(row![
            b -> "TOTAL",
            "",
            rb -> Self::format_hours(invoice.total_duration()),
            rb -> Self::format_currency(invoice.total_price())
        ]);
        table
    }

    fn tier_row(tier: Tier, report: &TierReport) -> prettytable::Row {
        row![
            tier,
            r -> format!("{}/h", Self::format_currency(report.rate_per_hour)),
            r -> Self::format_hours(report.total_duration),
            r -> Self::format_currency(report.total_price)
        ]
    }

    fn card_table(&self, cards: &[CardBreakdown]) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![b -> "Card", b -> "Tier", b -> "Active", b -> "Hours"]);

        for card in cards {
            let title = if card.name.is_empty() {
                card.card_id.to_string()
            } else {
                card.name.clone()
            };
            table.add_row(row![
                title,
                c -> card.tier,
                "",
                r -> Self::format_hours(card.duration)
            ]);

            for interval in &card.intervals {
                let end = interval.end.with_timezone(&self.tz).format("%H:%M");
                table.add_row(row![
                    "",
                    "",
                    format!("  └─ {} - {}", self.format_datetime(&interval.start), end),
                    r -> Self::format_hours(interval.duration())
                ]);
            }
        }
        table
    }
}

impl OutputFormatter for TableFormatter {
    fn format_invoice(&self, invoice: &Invoice) -> String {
        let mut output = format!(
            "Invoice for {} to {}\n",
            self.format_datetime(&invoice.window_start()),
            self.format_datetime(&invoice.window_end())
        );
        output.push_str(&Self::tier_table(invoice).to_string());

        if let Some(cards) = invoice.cards() {
            output.push_str("\n=== CARDS ===\n");
            if cards.is_empty() {
                output.push_str("No cards on this board.\n");
            } else {
                output.push_str(&self.card_table(cards).to_string());
            }
        }
        output
    }

    fn format_boards(&self, boards: &[Board]) -> String {
        if boards.is_empty() {
            return "No boards found.".to_string();
        }

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![b -> "Board ID", b -> "Name"]);
        for board in boards {
            table.add_row(row![board.id, board.name]);
        }
        table.to_string()
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    fn tier_json(report: &TierReport) -> serde_json::Value {
        json!({
            "rate_per_hour": report.rate_per_hour,
            "total_seconds": report.total_duration.num_seconds(),
            "total_hours": report.hours(),
            "total_price": report.total_price,
        })
    }

    fn card_json(card: &CardBreakdown) -> serde_json::Value {
        json!({
            "id": card.card_id.as_str(),
            "name": card.name,
            "tier": card.tier,
            "total_seconds": card.duration.num_seconds(),
            "intervals": card.intervals.iter().map(|i| json!({
                "start": i.start.to_rfc3339(),
                "end": i.end.to_rfc3339(),
                "seconds": i.duration().num_seconds(),
            })).collect::<Vec<_>>(),
        })
    }

    fn render(value: &serde_json::Value) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_invoice(&self, invoice: &Invoice) -> String {
        let mut tiers = serde_json::Map::new();
        for (tier, report) in invoice.reports().iter() {
            tiers.insert(tier.to_string(), Self::tier_json(report));
        }

        let mut output = json!({
            "window": {
                "start": invoice.window_start().to_rfc3339(),
                "end": invoice.window_end().to_rfc3339(),
            },
            "tiers": tiers,
            "total_price": invoice.total_price(),
        });

        if let Some(cards) = invoice.cards() {
            output["cards"] = json!(cards.iter().map(Self::card_json).collect::<Vec<_>>());
        }

        Self::render(&output)
    }

    fn format_boards(&self, boards: &[Board]) -> String {
        let output = json!({
            "boards": boards.iter().map(|b| json!({
                "id": b.id,
                "name": b.name,
            })).collect::<Vec<_>>(),
        });
        Self::render(&output)
    }
}

/// Pick a formatter for the requested output mode
pub fn get_formatter(json: bool, tz: Tz) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter::new(tz))
    }
}
