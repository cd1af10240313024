//! Pass-through proxy to the upstream arrivals service.
//!
//! Browsers and the board client call this instead of the third-party
//! service directly, which sidesteps CORS and lets us set request headers.
//! Responses are never cached on either leg.

mod dto;
mod error;
mod routes;
mod state;
mod upstream;

pub use dto::{ArrivalQuery, ErrorResponse};
pub use error::ProxyError;
pub use routes::create_router;
pub use state::AppState;
pub use upstream::{UpstreamClient, UpstreamConfig};
