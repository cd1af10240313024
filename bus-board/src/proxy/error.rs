//! Proxy error type and its HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use super::dto::ErrorResponse;
use super::routes::cors_headers;

/// Errors while serving `/bus-arrival`.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// `code` query parameter missing or blank
    #[error("Bus stop code is required")]
    MissingCode,

    /// Upstream answered with a non-success status
    #[error("API responded with status: {0}")]
    UpstreamStatus(u16),

    /// Upstream unreachable or timed out
    #[error("request to arrivals service failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream body was not JSON
    #[error("arrivals service returned invalid JSON: {0}")]
    InvalidBody(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ProxyError::MissingCode => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: self.to_string(),
                    details: None,
                },
            ),
            _ => {
                error!(error = %self, "error fetching bus arrival data");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Failed to fetch bus arrival data".to_string(),
                        details: Some(self.to_string()),
                    },
                )
            }
        };

        (status, cors_headers(), Json(body)).into_response()
    }
}
