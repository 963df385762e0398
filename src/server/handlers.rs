// HTTP request handlers
// Author: kelexine (https://github.com/kelexine)

use super::routes::AppState;
use crate::error::{GatewayError, UpstreamError};
use crate::models::{
    parse_body, Envelope, HealthResponse, ImagePayload, ImageRequest, UpscaleRequest, VideoRequest,
};
use crate::upstream::EndpointKind;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::{info, warn};

type HandlerResult = Result<Json<Value>, GatewayError>;

/// Forward one call and pass the upstream body through unchanged.
async fn forward(state: &AppState, kind: EndpointKind, payload: Option<Value>) -> HandlerResult {
    let body = state.upstream.call(kind, payload.as_ref()).await?;

    if let Some(seconds) = body
        .pointer("/metadata/processingTime")
        .and_then(Value::as_f64)
    {
        info!("{} completed in {}s", kind.name(), seconds);
    }

    Ok(Json(body))
}

/// `GET /api/health`: the gateway is healthy when the processing service answers.
pub async fn health_handler(State(state): State<AppState>) -> Response {
    match state.upstream.call(EndpointKind::Health, None).await {
        Ok(upstream) => Json(HealthResponse::healthy(upstream)).into_response(),
        Err(e) => {
            let status = match e {
                UpstreamError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(HealthResponse::unhealthy())).into_response()
        }
    }
}

pub async fn models_handler(State(state): State<AppState>) -> HandlerResult {
    forward(&state, EndpointKind::Models, None).await
}

pub async fn test_connection_handler(State(state): State<AppState>) -> HandlerResult {
    info!("Testing processing service connection...");
    let body = forward(&state, EndpointKind::TestConnection, None).await?;

    let envelope = Envelope::of(&body);
    if envelope.success {
        info!("Connection test successful");
    } else {
        warn!(
            "Connection test failed: {}",
            envelope.error.as_deref().unwrap_or("no details")
        );
    }

    Ok(body)
}

pub async fn generate_image_handler(State(state): State<AppState>, body: Bytes) -> HandlerResult {
    let req: ImageRequest = parse_body(&body)?;
    req.validate()?;

    info!("Generating image: \"{}\"", req.prompt);
    forward(&state, EndpointKind::GenerateImage, Some(serde_json::to_value(&req)?)).await
}

pub async fn generate_video_handler(State(state): State<AppState>, body: Bytes) -> HandlerResult {
    let req: VideoRequest = parse_body(&body)?;
    req.validate()?;

    info!("Video generation request: \"{}\"", req.prompt);
    forward(&state, EndpointKind::GenerateVideo, Some(serde_json::to_value(&req)?)).await
}

pub async fn remove_background_handler(State(state): State<AppState>, body: Bytes) -> HandlerResult {
    let req: ImagePayload = parse_body(&body)?;
    req.validate()?;

    info!("Processing background removal...");
    forward(&state, EndpointKind::RemoveBackground, Some(serde_json::to_value(&req)?)).await
}

pub async fn upscale_image_handler(State(state): State<AppState>, body: Bytes) -> HandlerResult {
    let req: UpscaleRequest = parse_body(&body)?;
    req.validate()?;

    info!("Processing image upscaling with factor {}...", req.scale_factor);
    forward(&state, EndpointKind::UpscaleImage, Some(serde_json::to_value(&req)?)).await
}

pub async fn caption_image_handler(State(state): State<AppState>, body: Bytes) -> HandlerResult {
    let req: ImagePayload = parse_body(&body)?;
    req.validate()?;

    info!("Processing image captioning...");
    forward(&state, EndpointKind::CaptionImage, Some(serde_json::to_value(&req)?)).await
}

pub async fn image_to_text_handler(State(state): State<AppState>, body: Bytes) -> HandlerResult {
    let req: ImagePayload = parse_body(&body)?;
    req.validate()?;

    info!("Processing text extraction...");
    forward(&state, EndpointKind::ImageToText, Some(serde_json::to_value(&req)?)).await
}

/// Prometheus text exposition.
pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::gather_metrics(),
    )
}

pub async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "Endpoint not found",
        })),
    )
}
