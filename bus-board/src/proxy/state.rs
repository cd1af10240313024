//! Application state for the proxy.

use std::sync::Arc;

use super::upstream::UpstreamClient;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Client for the third-party arrivals service
    pub upstream: Arc<UpstreamClient>,
}

impl AppState {
    pub fn new(upstream: UpstreamClient) -> Self {
        Self {
            upstream: Arc::new(upstream),
        }
    }
}
