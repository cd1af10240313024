//! HTTP client for the third-party arrivals service.

use axum::body::Bytes;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::de::IgnoredAny;

use super::error::ProxyError;

/// Default upstream arrivals service.
pub(crate) const DEFAULT_UPSTREAM_URL: &str = "https://arrivelah2.busrouter.sg/";

const USER_AGENT: &str = "Mozilla/5.0 (compatible; BusArrivalApp/1.0)";

/// Configuration for the upstream client.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL; the stop code is sent as the `id` query parameter
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 15,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self::new(DEFAULT_UPSTREAM_URL)
    }
}

/// Upstream arrivals client.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig) -> Result<Self, ProxyError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// Fetch the raw arrivals JSON for a stop.
    ///
    /// The body is only checked to be JSON; the bytes are returned untouched.
    pub async fn fetch(&self, stop_code: &str) -> Result<Bytes, ProxyError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("id", stop_code)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::UpstreamStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice::<IgnoredAny>(&body)
            .map_err(|e| ProxyError::InvalidBody(e.to_string()))?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = UpstreamConfig::default();
        assert_eq!(config.base_url, DEFAULT_UPSTREAM_URL);
        assert_eq!(config.timeout_secs, 15);
    }

    #[test]
    fn config_builder() {
        let config = UpstreamConfig::new("http://localhost:9000/").with_timeout(2);
        assert_eq!(config.base_url, "http://localhost:9000/");
        assert_eq!(config.timeout_secs, 2);
    }

    #[test]
    fn client_creation() {
        assert!(UpstreamClient::new(UpstreamConfig::default()).is_ok());
    }
}
