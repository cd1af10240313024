//! Arrivals client error types.

/// Errors from fetching arrivals through the proxy.
#[derive(Debug, thiserror::Error)]
pub enum ArrivalsError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The proxy answered with a body that is not an arrivals response
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// The proxy returned an error status code
    #[error("proxy error {status}: {message}")]
    Api { status: u16, message: String },

    /// Stop code was blank
    #[error("stop code must not be empty")]
    EmptyStopCode,
}
