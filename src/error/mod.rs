// Error types for the pixelgate gateway
// Author: kelexine (https://github.com/kelexine)

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};
use thiserror::Error;

/// Message returned to callers when the processing service cannot be reached.
pub const UNAVAILABLE_MESSAGE: &str =
    "Python service unavailable. Please ensure the Python service is running.";

/// Message returned for every failure whose details must stay server-side.
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Failure of a single call to the AI-processing service.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The service could not be reached at all (connection refused, DNS, ...).
    #[error("Upstream unavailable: {0}")]
    Unavailable(String),

    /// The service answered with a non-2xx status and a JSON body.
    #[error("Upstream rejected request with HTTP {status}")]
    UpstreamRejected { status: u16, body: Value },

    #[error("Upstream call timed out after {0}s")]
    Timeout(u64),

    /// Unexpected or unparsable response.
    #[error("Upstream internal error: {0}")]
    Internal(String),
}

impl UpstreamError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Unavailable(_) => "unavailable",
            UpstreamError::UpstreamRejected { .. } => "rejected",
            UpstreamError::Timeout(_) => "timeout",
            UpstreamError::Internal(_) => "internal",
        }
    }
}

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("Gallery error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unable to connect to API. Please ensure services are running.")]
    Disconnected,

    /// A gateway answered with `success: false` (client side).
    #[error("{message} (HTTP {status})")]
    Remote { status: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// HTTP status this error maps to at the gateway boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Upstream(UpstreamError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Upstream(UpstreamError::UpstreamRejected { status, .. }) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Convert GatewayError to HTTP responses for Axum
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            GatewayError::Validation(message) => json!({
                "success": false,
                "error": message,
            }),
            GatewayError::Upstream(UpstreamError::Unavailable(_)) => json!({
                "success": false,
                "error": UNAVAILABLE_MESSAGE,
            }),
            // The upstream's own error vocabulary is forwarded untouched
            GatewayError::Upstream(UpstreamError::UpstreamRejected { body, .. }) => body,
            _ => json!({
                "success": false,
                "error": INTERNAL_MESSAGE,
            }),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
