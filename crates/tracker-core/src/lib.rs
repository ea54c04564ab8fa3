//! Core types for the Tweet Tracker client.
//!
//! Holds the backend data model, the live-update wire messages, the
//! dashboard state store and everything that does not touch the network:
//! settings, notices, formatting and time helpers.

pub mod endpoints;
pub mod error;
pub mod formatting;
pub mod messages;
pub mod models;
pub mod notifications;
pub mod settings;
pub mod store;
pub mod time_utils;

pub use error::{Result, TrackerError};
