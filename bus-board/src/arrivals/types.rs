//! Upstream arrivals DTOs.
//!
//! These types map directly to the JSON the arrivals service returns (and
//! the proxy passes through). They use `Option` liberally because the
//! service sends `null` for buses that are not scheduled and omits fields
//! it has no value for.

use serde::{Deserialize, Serialize};

/// Arrivals for one stop.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ArrivalsResponse {
    /// Routes serving this stop, in upstream order.
    #[serde(default)]
    pub services: Vec<BusService>,
}

/// One route at the stop, with its next few buses.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BusService {
    /// Route number, e.g. "371".
    pub no: String,

    /// Operator code, e.g. "SBST".
    pub operator: Option<String>,

    /// The next bus.
    pub next: Option<ArrivalInfo>,

    /// Alias of `next2` kept by the upstream for older clients.
    pub subsequent: Option<ArrivalInfo>,

    /// The bus after next.
    pub next2: Option<ArrivalInfo>,

    /// The third bus.
    pub next3: Option<ArrivalInfo>,
}

/// A single predicted arrival.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ArrivalInfo {
    /// Estimated arrival as an ISO 8601 timestamp with offset.
    pub time: Option<String>,

    /// Milliseconds until arrival. Zero or negative when at the stop.
    pub duration_ms: Option<i64>,

    pub lat: Option<f64>,
    pub lng: Option<f64>,

    /// Crowding: "SEA", "SDA" or "LSD".
    pub load: Option<String>,

    /// "WAB" for wheelchair accessible.
    pub feature: Option<String>,

    /// Vehicle type: "SD", "DD" or "BD".
    #[serde(rename = "type")]
    pub vehicle_type: Option<String>,

    pub visit_number: Option<u32>,
    pub origin_code: Option<String>,
    pub destination_code: Option<String>,

    /// 1 when the ETA comes from live tracking, 0 when scheduled.
    pub monitored: Option<u8>,
}

impl BusService {
    /// The three upcoming-bus slots in order: next, next+1, next+2.
    ///
    /// Falls back to `subsequent` when `next2` is absent.
    pub fn upcoming(&self) -> [Option<&ArrivalInfo>; 3] {
        [
            self.next.as_ref(),
            self.next2.as_ref().or(self.subsequent.as_ref()),
            self.next3.as_ref(),
        ]
    }
}
