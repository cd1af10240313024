//! Scripted arrivals source for tests and offline development.
//!
//! Replies are registered per stop code and served as if they came from the
//! proxy. An optional per-stop delay makes it possible to have responses
//! complete out of order.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;

use super::error::ArrivalsError;
use super::source::ArrivalsSource;
use super::types::{ArrivalInfo, ArrivalsResponse, BusService};

#[derive(Debug, Clone)]
enum Reply {
    Arrivals(ArrivalsResponse),
    Failure { status: u16, message: String },
}

#[derive(Debug, Clone)]
struct Scripted {
    reply: Reply,
    delay: Duration,
}

/// Mock arrivals source keyed by stop code.
#[derive(Clone, Default)]
pub struct MockArrivalsSource {
    stops: Arc<RwLock<HashMap<String, Scripted>>>,
    calls: Arc<AtomicUsize>,
}

impl MockArrivalsSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `response` for `stop_code`.
    pub async fn set_arrivals(&self, stop_code: &str, response: ArrivalsResponse) {
        self.script(stop_code, Reply::Arrivals(response)).await;
    }

    /// Make `stop_code` fail as if the proxy returned `status`.
    pub async fn set_failure(&self, stop_code: &str, status: u16, message: &str) {
        let reply = Reply::Failure {
            status,
            message: message.to_string(),
        };
        self.script(stop_code, reply).await;
    }

    /// Delay every reply for `stop_code` by `delay`.
    pub async fn set_delay(&self, stop_code: &str, delay: Duration) {
        let mut stops = self.stops.write().await;
        if let Some(scripted) = stops.get_mut(stop_code) {
            scripted.delay = delay;
        }
    }

    /// Number of fetches served so far, successful or not.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn script(&self, stop_code: &str, reply: Reply) {
        let mut stops = self.stops.write().await;
        let delay = stops.get(stop_code).map(|s| s.delay).unwrap_or_default();
        stops.insert(stop_code.to_string(), Scripted { reply, delay });
    }

    async fn fetch(&self, stop_code: &str) -> Result<ArrivalsResponse, ArrivalsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let scripted = {
            let stops = self.stops.read().await;
            stops.get(stop_code).cloned()
        };

        let Some(scripted) = scripted else {
            return Err(ArrivalsError::Api {
                status: 404,
                message: format!("No mock data for stop {stop_code}"),
            });
        };

        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }

        match scripted.reply {
            Reply::Arrivals(response) => Ok(response),
            Reply::Failure { status, message } => Err(ArrivalsError::Api { status, message }),
        }
    }
}

impl ArrivalsSource for MockArrivalsSource {
    fn fetch_arrivals(
        &self,
        stop_code: &str,
    ) -> impl std::future::Future<Output = Result<ArrivalsResponse, ArrivalsError>> + Send {
        self.fetch(stop_code)
    }
}

/// Build a service for route `no` with one live-tracked bus per ETA.
///
/// At most three ETAs are used (next, next2, next3).
pub fn service(no: &str, etas_ms: &[i64]) -> BusService {
    let slot = |i: usize| {
        etas_ms.get(i).map(|&ms| ArrivalInfo {
            time: Some("2024-05-01T08:00:00+08:00".to_string()),
            duration_ms: Some(ms),
            monitored: Some(1),
            ..Default::default()
        })
    };

    BusService {
        no: no.to_string(),
        operator: Some("SBST".to_string()),
        next: slot(0),
        subsequent: None,
        next2: slot(1),
        next3: slot(2),
    }
}

/// Build a response from a list of services.
pub fn response(services: Vec<BusService>) -> ArrivalsResponse {
    ArrivalsResponse { services }
}
