//! Trello provider for hyperbill
//!
//! This crate implements the board service trait on top of the Trello
//! REST API.

pub mod client;

pub use client::TrelloClient;
