//! Core types, traits, and utilities for hyperbill
//!
//! This crate provides the data model, error handling, billing window and
//! timezone handling, and the board service trait used by all other
//! hyperbill crates.

pub mod error;
pub mod invoice_types;
pub mod provider;
pub mod timezone;
pub mod types;
pub mod window;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{AuthFailure, HyperbillError, Result};
pub use provider::BoardSource;
pub use types::{ActiveInterval, BoardId, Card, CardId, Event, EventKind, Rates, Tier, TierMap};
pub use window::BillingWindow;
