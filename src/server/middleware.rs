// HTTP middleware
// Author: kelexine (https://github.com/kelexine)

use crate::error::{GatewayError, Result, INTERNAL_MESSAGE};
use axum::{
    extract::{MatchedPath, Request},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::info;

/// Create request ID layers for the application
pub fn request_id_layers() -> (SetRequestIdLayer<MakeRequestUuid>, PropagateRequestIdLayer) {
    (
        SetRequestIdLayer::x_request_id(MakeRequestUuid),
        PropagateRequestIdLayer::x_request_id(),
    )
}

/// CORS restricted to the configured front-end origin.
pub fn cors_layer(frontend_url: &str) -> Result<CorsLayer> {
    let origin: HeaderValue = frontend_url
        .trim_end_matches('/')
        .parse()
        .map_err(|e| GatewayError::Config(format!("Invalid frontend_url {:?}: {}", frontend_url, e)))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true))
}

/// One log line per request, plus request metrics.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let started = Instant::now();
    let response = next.run(req).await;
    let elapsed = started.elapsed();

    info!(
        "{} - {} {} -> {} ({}ms)",
        chrono::Utc::now().to_rfc3339(),
        method,
        path,
        response.status().as_u16(),
        elapsed.as_millis()
    );
    crate::metrics::record_request(
        method.as_str(),
        &endpoint,
        response.status().as_u16(),
        elapsed.as_secs_f64(),
    );

    response
}

/// Rewrite error responses produced outside the handlers (body limit,
/// extractor and method rejections) into the `{success, error}` envelope.
pub async fn envelope_rejections(response: Response) -> Response {
    let status = response.status();
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));
    if is_json || !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let message = match status {
        StatusCode::PAYLOAD_TOO_LARGE => "Request body too large",
        StatusCode::METHOD_NOT_ALLOWED => "Method not allowed",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "Unsupported content type",
        s if s.is_server_error() => INTERNAL_MESSAGE,
        _ => "Invalid request body",
    };
    (status, Json(json!({"success": false, "error": message}))).into_response()
}
