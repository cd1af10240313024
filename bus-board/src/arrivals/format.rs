//! Pure presentation helpers for arrival ETAs.

use std::fmt;

use chrono::{DateTime, Local, TimeZone};
use tracing::debug;

use super::types::BusService;

/// Shown instead of a duration once the bus is at the stop.
pub const ARRIVED_NOW: &str = "arrived now";

/// Upper bound (inclusive, whole seconds) of the "arriving" tier.
const ARRIVING_MAX_SECS: i64 = 60;

/// Upper bound (inclusive, whole seconds) of the "soon" tier.
const SOON_MAX_SECS: i64 = 180;

/// ETA at which the progress bar starts filling (15 minutes).
const PROGRESS_HORIZON_MS: i64 = 15 * 60 * 1000;

/// How close a bus is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Urgency {
    /// Within a minute (or already at the stop).
    Arriving,
    /// Within three minutes.
    Soon,
    OnTheWay,
}

impl Urgency {
    pub fn label(self) -> &'static str {
        match self {
            Urgency::Arriving => "Arriving",
            Urgency::Soon => "Soon",
            Urgency::OnTheWay => "On the way",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify an ETA into an urgency tier.
///
/// Works on whole seconds (rounded down), so both 60 000 ms and 60 999 ms
/// are still "arriving".
pub fn classify(eta_ms: i64) -> Urgency {
    let secs = eta_ms.div_euclid(1000);
    if secs <= ARRIVING_MAX_SECS {
        Urgency::Arriving
    } else if secs <= SOON_MAX_SECS {
        Urgency::Soon
    } else {
        Urgency::OnTheWay
    }
}

/// Human-readable ETA, e.g. `"4m 5s"`.
///
/// The minutes component is dropped below one minute (`"42s"`), and any
/// non-positive ETA renders as [`ARRIVED_NOW`].
pub fn format_duration(eta_ms: i64) -> String {
    if eta_ms <= 0 {
        return ARRIVED_NOW.to_string();
    }

    let secs = eta_ms / 1000;
    let mins = secs / 60;
    let rem = secs % 60;

    if mins == 0 {
        format!("{rem}s")
    } else {
        format!("{mins}m {rem}s")
    }
}

/// Wall-clock `HH:MM:SS` for an upstream timestamp, in local time.
///
/// Returns an empty string when the timestamp cannot be parsed.
pub fn format_arrival_time(timestamp: &str) -> String {
    format_arrival_time_in(timestamp, &Local)
}

/// Wall-clock `HH:MM:SS` for an upstream timestamp, in the given zone.
pub fn format_arrival_time_in<Tz>(timestamp: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(dt) => dt.with_timezone(tz).format("%H:%M:%S").to_string(),
        Err(e) => {
            debug!(timestamp, error = %e, "unparseable arrival timestamp");
            String::new()
        }
    }
}

/// Progress towards arrival over a 15 minute horizon, 0..=100.
pub fn progress_percent(eta_ms: i64) -> u8 {
    let eta = eta_ms.clamp(0, PROGRESS_HORIZON_MS);
    ((PROGRESS_HORIZON_MS - eta) * 100 / PROGRESS_HORIZON_MS) as u8
}

/// Services whose route number is in `routes`, in upstream order.
pub fn filter_services<'a, R>(services: &'a [BusService], routes: &[R]) -> Vec<&'a BusService>
where
    R: AsRef<str>,
{
    services
        .iter()
        .filter(|s| routes.iter().any(|r| r.as_ref() == s.no))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn service(no: &str) -> BusService {
        BusService {
            no: no.to_string(),
            operator: None,
            next: None,
            subsequent: None,
            next2: None,
            next3: None,
        }
    }

    #[test]
    fn classify_boundaries() {
        assert_eq!(classify(-5_000), Urgency::Arriving);
        assert_eq!(classify(0), Urgency::Arriving);
        assert_eq!(classify(60_000), Urgency::Arriving);
        assert_eq!(classify(60_999), Urgency::Arriving);
        assert_eq!(classify(61_000), Urgency::Soon);
        assert_eq!(classify(180_000), Urgency::Soon);
        assert_eq!(classify(181_000), Urgency::OnTheWay);
        assert_eq!(classify(900_000), Urgency::OnTheWay);
    }

    #[test]
    fn urgency_labels() {
        assert_eq!(Urgency::Arriving.to_string(), "Arriving");
        assert_eq!(Urgency::Soon.to_string(), "Soon");
        assert_eq!(Urgency::OnTheWay.to_string(), "On the way");
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(0), ARRIVED_NOW);
        assert_eq!(format_duration(-30_000), ARRIVED_NOW);
        assert_eq!(format_duration(999), "0s");
        assert_eq!(format_duration(42_500), "42s");
        assert_eq!(format_duration(60_000), "1m 0s");
        assert_eq!(format_duration(245_000), "4m 5s");
        assert_eq!(format_duration(3_600_000), "60m 0s");
    }

    #[test]
    fn arrival_time_in_fixed_zone() {
        let sgt = FixedOffset::east_opt(8 * 3600).unwrap();
        assert_eq!(
            format_arrival_time_in("2024-05-01T08:02:10+08:00", &sgt),
            "08:02:10"
        );
        assert_eq!(
            format_arrival_time_in("2024-05-01T08:02:10+08:00", &Utc),
            "00:02:10"
        );
    }

    #[test]
    fn malformed_arrival_time_is_empty() {
        assert_eq!(format_arrival_time(""), "");
        assert_eq!(format_arrival_time("not a time"), "");
        assert_eq!(format_arrival_time_in("2024-13-45T99:00:00Z", &Utc), "");
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(progress_percent(0), 100);
        assert_eq!(progress_percent(-10_000), 100);
        assert_eq!(progress_percent(PROGRESS_HORIZON_MS), 0);
        assert_eq!(progress_percent(PROGRESS_HORIZON_MS * 2), 0);
        assert_eq!(progress_percent(PROGRESS_HORIZON_MS / 2), 50);
        assert_eq!(progress_percent(i64::MIN), 100);
        assert_eq!(progress_percent(i64::MAX), 0);
    }

    #[test]
    fn filter_keeps_upstream_order() {
        let services = vec![service("5"), service("371"), service("3"), service("10")];
        let routes = vec!["10".to_string(), "371".to_string(), "999".to_string()];

        let filtered = filter_services(&services, &routes);
        let nos: Vec<&str> = filtered.iter().map(|s| s.no.as_str()).collect();
        assert_eq!(nos, vec!["371", "10"]);
    }
}
