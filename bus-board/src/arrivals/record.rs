//! Typed arrival records derived from upstream services.

use serde::Serialize;

use super::types::{ArrivalInfo, BusService};

/// A predicted arrival for one bus on one route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrivalRecord {
    pub route_id: String,
    pub operator: String,
    /// Milliseconds until arrival; zero or negative means arrived.
    pub eta_millis: i64,
    /// Absolute estimate as sent by the upstream (ISO 8601).
    pub estimated_timestamp: String,
    pub is_live_tracked: bool,
}

impl ArrivalRecord {
    fn from_info(service: &BusService, info: &ArrivalInfo) -> Option<Self> {
        let eta_millis = info.duration_ms?;
        Some(Self {
            route_id: service.no.clone(),
            operator: service.operator.clone().unwrap_or_default(),
            eta_millis,
            estimated_timestamp: info.time.clone().unwrap_or_default(),
            is_live_tracked: info.monitored == Some(1),
        })
    }

    /// Records for the next, next+1 and next+2 buses of a service.
    ///
    /// Slots with no descriptor (or no duration) are skipped, so the result
    /// holds at most three records in arrival order.
    pub fn from_service(service: &BusService) -> Vec<Self> {
        service
            .upcoming()
            .into_iter()
            .flatten()
            .filter_map(|info| Self::from_info(service, info))
            .collect()
    }
}

/// Display state for one monitored route at one stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "arrivals", rename_all = "snake_case")]
pub enum RouteStatus {
    /// The route was returned with at least one upcoming bus.
    Arrivals(Vec<ArrivalRecord>),
    /// The route was requested but the upstream did not return it,
    /// or the fetch for the stop failed.
    NotFound,
    /// The route was returned with an empty schedule.
    NoData,
}

impl RouteStatus {
    /// Status for a route given the matching upstream service, if any.
    pub fn from_service(service: Option<&BusService>) -> Self {
        match service {
            None => RouteStatus::NotFound,
            Some(service) => {
                let records = ArrivalRecord::from_service(service);
                if records.is_empty() {
                    RouteStatus::NoData
                } else {
                    RouteStatus::Arrivals(records)
                }
            }
        }
    }

    /// The soonest arrival, if any.
    pub fn next(&self) -> Option<&ArrivalRecord> {
        match self {
            RouteStatus::Arrivals(records) => records.first(),
            _ => None,
        }
    }
}
