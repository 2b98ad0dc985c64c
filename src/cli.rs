//! CLI interface for hyperbill
//!
//! This module defines the command-line interface using clap.
//!
//! # Example
//!
//! ```bash
//! # List the boards your credentials can see
//! hyperbill boards
//!
//! # Bill January 2024 on a board
//! hyperbill invoice --board 5f0c1a2b3c4d5e6f7a8b9c0d \
//!     --since 2024-01-01 --until 2024-02-01 \
//!     --t1 25 --t2 35 --t3 45 --t4 55 --t5 65
//!
//! # Same invoice as JSON with per-card detail
//! hyperbill --json invoice --board 5f0c1a2b3c4d5e6f7a8b9c0d \
//!     --since 2024-01-01 --until 2024-02-01 --t1 25 --detailed
//! ```

use clap::{Args, Parser, Subcommand};

use crate::error::{HyperbillError, Result};
use crate::request::{InvoiceRequest, parse_date};
use crate::timezone::TimezoneConfig;
use crate::types::Rates;

/// Build tiered billing invoices from Trello card history
#[derive(Parser, Debug, Clone)]
#[command(name = "hyperbill")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Trello API key
    #[arg(long, env = "TRELLO_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Trello API token
    #[arg(long, env = "TRELLO_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    #[command(flatten)]
    pub timezone_args: TimezoneArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Credentials from flags or the environment
    pub fn credentials(&self) -> Result<(&str, &str)> {
        match (self.api_key.as_deref(), self.token.as_deref()) {
            (Some(key), Some(token)) if !key.is_empty() && !token.is_empty() => Ok((key, token)),
            _ => Err(HyperbillError::Config(
                "the Trello API key and token must be supplied via --api-key/--token \
                 or TRELLO_API_KEY/TRELLO_TOKEN"
                    .to_string(),
            )),
        }
    }
}

/// Timezone in which window dates start
#[derive(Args, Debug, Clone, Default)]
pub struct TimezoneArgs {
    /// Timezone for window dates (e.g. "America/New_York", "Asia/Manila", "UTC")
    #[arg(long, short = 'z', global = true)]
    pub timezone: Option<String>,

    /// Use the system's local timezone for window dates (default: UTC)
    #[arg(long, global = true, conflicts_with = "timezone")]
    pub local_time: bool,
}

impl TimezoneArgs {
    pub fn to_config(&self) -> Result<TimezoneConfig> {
        TimezoneConfig::from_cli(self.timezone.as_deref(), self.local_time)
    }
}

/// Arguments for the invoice command
#[derive(Args, Debug, Clone)]
pub struct InvoiceArgs {
    /// Trello board ID (24 hex digits)
    #[arg(long, short = 'b')]
    pub board: String,

    /// First day of the billing window (YYYY-MM-DD)
    #[arg(long)]
    pub since: String,

    /// Day the billing window ends, exclusive of activity on that day (YYYY-MM-DD)
    #[arg(long)]
    pub until: String,

    /// Hourly rate for T1 cards and cards without a tier label
    #[arg(long, default_value = "0")]
    pub t1: f64,

    /// Hourly rate for T2 cards
    #[arg(long, default_value = "0")]
    pub t2: f64,

    /// Hourly rate for T3 cards
    #[arg(long, default_value = "0")]
    pub t3: f64,

    /// Hourly rate for T4 cards
    #[arg(long, default_value = "0")]
    pub t4: f64,

    /// Hourly rate for T5 cards
    #[arg(long, default_value = "0")]
    pub t5: f64,

    /// Show per-card intervals and durations
    #[arg(long, short = 'd')]
    pub detailed: bool,
}

impl InvoiceArgs {
    pub fn rates(&self) -> Rates {
        Rates::new([self.t1, self.t2, self.t3, self.t4, self.t5])
    }

    /// Validate the arguments into a request
    pub fn to_request(&self, tz: &TimezoneConfig) -> Result<InvoiceRequest> {
        let start = parse_date(&self.since)?;
        let end = parse_date(&self.until)?;
        InvoiceRequest::new(&self.board, start, end, self.rates(), tz)
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List the boards visible to your Trello account
    Boards,
    /// Build an invoice for a board and billing window
    Invoice(InvoiceArgs),
}
