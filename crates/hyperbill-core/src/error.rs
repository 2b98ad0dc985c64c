//! Error types for hyperbill
//!
//! This module defines the error types used throughout the hyperbill library.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! # Example
//!
//! ```
//! use hyperbill_core::error::{HyperbillError, Result};
//!
//! fn check_rate(rate: f64) -> Result<f64> {
//!     if rate < 0.0 {
//!         return Err(HyperbillError::InvalidRequest(
//!             "rate cannot be less than zero".to_string(),
//!         ));
//!     }
//!     Ok(rate)
//! }
//!
//! assert!(check_rate(-1.0).is_err());
//! ```

use thiserror::Error;

use crate::types::CardId;

/// Why the board service rejected our credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// The API key was not recognised
    InvalidKey,
    /// The API token was not recognised or has been revoked
    InvalidToken,
    /// The service answered 401 without saying which credential was wrong
    Rejected,
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthFailure::InvalidKey => write!(f, "the provided Trello API key is invalid"),
            AuthFailure::InvalidToken => write!(f, "the provided Trello API token is invalid"),
            AuthFailure::Rejected => write!(f, "the Trello credentials were rejected"),
        }
    }
}

/// Main error type for hyperbill operations
///
/// The first four variants are the billing taxonomy: a request that is
/// rejected up front, a credential failure, any other collaborator failure,
/// and an event log entry that cannot be read. None of them is recovered
/// from; building an invoice aborts on the first one.
#[derive(Error, Debug)]
pub enum HyperbillError {
    /// The invoice request failed validation before any external call
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The board service rejected the credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(AuthFailure),

    /// The board service failed for a reason unrelated to credentials
    #[error("Trello request failed: {0}")]
    Upstream(String),

    /// A list change event without readable list names
    #[error("Malformed event on card {card_id}: {reason}")]
    MalformedEvent {
        /// Card the event belongs to
        card_id: CardId,
        /// What was missing or unreadable
        reason: String,
    },

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Invalid timezone
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level failure talking to the board service
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl HyperbillError {
    /// Whether the error came from bad credentials.
    ///
    /// Front ends use this to stop offering further submissions until the
    /// credentials are fixed.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, HyperbillError::Unauthorized(_))
    }

    /// Whether the error is a failure of the board service or the
    /// connection to it, as opposed to bad input.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            HyperbillError::Upstream(_) | HyperbillError::Network(_) | HyperbillError::Json(_)
        )
    }
}

/// Convenience type alias for Results in hyperbill
pub type Result<T> = std::result::Result<T, HyperbillError>;
