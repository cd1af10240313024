//! Data transfer objects for proxy requests and responses.

use serde::{Deserialize, Serialize};

/// Query string of `GET /bus-arrival`.
#[derive(Debug, Deserialize)]
pub struct ArrivalQuery {
    /// Bus stop code
    pub code: Option<String>,
}

/// JSON error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
