//! HTTP route handlers.

use axum::http::{HeaderName, header};
use axum::{
    Json, Router,
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::debug;

use super::dto::ArrivalQuery;
use super::error::ProxyError;
use super::state::AppState;

/// Cross-origin headers sent on every `/bus-arrival` response.
pub(super) fn cors_headers() -> [(HeaderName, &'static str); 4] {
    [
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, OPTIONS"),
        (
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            "Content-Type, Authorization",
        ),
        (header::ACCESS_CONTROL_MAX_AGE, "86400"),
    ]
}

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/bus-arrival", get(bus_arrival).options(preflight))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// CORS preflight: empty JSON object with the CORS headers.
async fn preflight() -> impl IntoResponse {
    (cors_headers(), Json(json!({})))
}

/// Forward a stop's arrivals from upstream, verbatim.
async fn bus_arrival(
    State(state): State<AppState>,
    Query(query): Query<ArrivalQuery>,
) -> Result<Response, ProxyError> {
    let code = query
        .code
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or(ProxyError::MissingCode)?;

    debug!(code = %code, "proxying arrivals request");
    let body = state.upstream.fetch(&code).await?;

    Ok((
        cors_headers(),
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CACHE_CONTROL, "no-store, max-age=0"),
        ],
        body,
    )
        .into_response())
}
