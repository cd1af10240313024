//! Bus arrival board.
//!
//! Tracks live arrival predictions for a handful of saved bus stops:
//! a pass-through proxy to the upstream arrivals service, a client for
//! that proxy, a locally persisted list of stop subscriptions, and the
//! aggregator that merges per-stop results into one ordered board.

pub mod arrivals;
pub mod board;
pub mod config;
pub mod proxy;
pub mod settings;

#[cfg(test)]
mod test_support;
