//! Runtime layer for the Tweet Tracker client.
//!
//! Owns all I/O: the REST client, the live-update socket with its reconnect
//! loop, the initial loader and the mutation actions. Every producer reports
//! back as [`tracker_core::store::Action`]s over an `mpsc` channel.

pub mod actions;
pub mod api;
pub mod backoff;
pub mod live;
pub mod loader;
pub mod orchestrator;
pub mod socket;

#[cfg(test)]
pub(crate) mod testing;

pub use tracker_core as core;
