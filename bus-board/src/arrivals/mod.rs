//! Client for the arrivals proxy.
//!
//! The proxy (see [`crate::proxy`]) forwards to the third-party arrivals
//! service and returns its JSON verbatim. This module fetches that JSON for
//! one stop code, maps it into typed records, and provides the pure helpers
//! used to present an ETA.
//!
//! Key characteristics of the upstream data:
//! - Each route ("service") carries up to three upcoming buses
//!   (`next`, `next2`, `next3`); later ones are `null` when nothing is scheduled
//! - `duration_ms` is signed; zero or negative means the bus is at the stop
//! - `monitored == 1` means the ETA comes from live vehicle tracking

mod client;
mod error;
pub mod format;
pub mod mock;
mod record;
mod source;
mod types;

pub use client::{ArrivalsClient, ArrivalsConfig};
pub use error::ArrivalsError;
pub use format::{
    ARRIVED_NOW, Urgency, classify, filter_services, format_arrival_time,
    format_arrival_time_in, format_duration, progress_percent,
};
pub use record::{ArrivalRecord, RouteStatus};
pub use source::ArrivalsSource;
pub use types::{ArrivalInfo, ArrivalsResponse, BusService};
