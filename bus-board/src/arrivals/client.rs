//! HTTP client for the arrivals proxy.
//!
//! Every request bypasses HTTP caches: it sends `no-cache` headers and a
//! millisecond timestamp query parameter, so each call reflects live state.

use chrono::Utc;
use reqwest::header::{self, HeaderMap, HeaderValue};

use crate::proxy::ErrorResponse;

use super::error::ArrivalsError;
use super::types::ArrivalsResponse;

/// Default proxy location (the `bus-board` server on its default port).
pub(crate) const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:3000";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the arrivals client.
#[derive(Debug, Clone)]
pub struct ArrivalsConfig {
    /// Base URL of the proxy, without the `/bus-arrival` path
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ArrivalsConfig {
    /// Create a new config pointing at the given proxy.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for ArrivalsConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PROXY_URL)
    }
}

/// Arrivals proxy client.
#[derive(Debug, Clone)]
pub struct ArrivalsClient {
    http: reqwest::Client,
    base_url: String,
}

impl ArrivalsClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ArrivalsConfig) -> Result<Self, ArrivalsError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch current arrivals for one stop.
    ///
    /// Errors are returned rather than swallowed: callers need to tell a
    /// failed stop apart from a stop that simply has none of their routes.
    pub async fn fetch_arrivals(&self, stop_code: &str) -> Result<ArrivalsResponse, ArrivalsError> {
        let stop_code = stop_code.trim();
        if stop_code.is_empty() {
            return Err(ArrivalsError::EmptyStopCode);
        }

        let url = format!("{}/bus-arrival", self.base_url);
        let cache_buster = Utc::now().timestamp_millis().to_string();

        let response = self
            .http
            .get(&url)
            .query(&[("code", stop_code), ("t", cache_buster.as_str())])
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ArrivalsError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| ArrivalsError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

/// Pull the human-readable message out of the proxy's error envelope,
/// falling back to the raw body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            error,
            details: Some(details),
        }) => format!("{error}: {details}"),
        Ok(ErrorResponse { error, .. }) => error,
        Err(_) => body.chars().take(500).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::extract::Query;
    use axum::http::{HeaderMap as AxumHeaders, StatusCode};
    use axum::response::IntoResponse;
    use axum::{Router, routing::get};

    use crate::test_support::{SAMPLE_ARRIVALS, serve};

    #[test]
    fn config_builder() {
        let config = ArrivalsConfig::new("http://localhost:8080").with_timeout(3);
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn config_defaults() {
        let config = ArrivalsConfig::default();
        assert_eq!(config.base_url, DEFAULT_PROXY_URL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn error_message_prefers_envelope() {
        assert_eq!(
            error_message(r#"{"error":"Failed to fetch bus arrival data","details":"timeout"}"#),
            "Failed to fetch bus arrival data: timeout"
        );
        assert_eq!(
            error_message(r#"{"error":"Bus stop code is required"}"#),
            "Bus stop code is required"
        );
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    /// A stand-in proxy that checks the cache-busting contract.
    async fn fake_proxy(
        headers: AxumHeaders,
        Query(params): Query<HashMap<String, String>>,
    ) -> axum::response::Response {
        let no_cache = headers
            .get("cache-control")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("no-cache"));
        if !no_cache || !params.contains_key("t") {
            return (StatusCode::BAD_REQUEST, "cache headers missing").into_response();
        }

        match params.get("code").map(String::as_str) {
            Some("67009") => (
                [("content-type", "application/json")],
                SAMPLE_ARRIVALS,
            )
                .into_response(),
            Some("garbage") => "<html>not json</html>".into_response(),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                r#"{"error":"Failed to fetch bus arrival data","details":"API responded with status: 503"}"#,
            )
                .into_response(),
        }
    }

    async fn client() -> ArrivalsClient {
        let addr = serve(Router::new().route("/bus-arrival", get(fake_proxy))).await;
        ArrivalsClient::new(ArrivalsConfig::new(format!("http://{addr}/"))).unwrap()
    }

    #[tokio::test]
    async fn fetches_and_parses_arrivals() {
        let client = client().await;
        let response = client.fetch_arrivals("67009").await.unwrap();

        let nos: Vec<&str> = response.services.iter().map(|s| s.no.as_str()).collect();
        assert_eq!(nos, vec!["371", "3", "80"]);
    }

    #[tokio::test]
    async fn error_status_is_propagated() {
        let client = client().await;
        let err = client.fetch_arrivals("00000").await.unwrap_err();

        match err {
            ArrivalsError::Api { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("503"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_an_error() {
        let client = client().await;
        let err = client.fetch_arrivals("garbage").await.unwrap_err();
        assert!(matches!(err, ArrivalsError::Json { .. }));
    }

    #[tokio::test]
    async fn blank_stop_code_is_rejected() {
        let client = client().await;
        let err = client.fetch_arrivals("  ").await.unwrap_err();
        assert!(matches!(err, ArrivalsError::EmptyStopCode));
    }
}
