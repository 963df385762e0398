// HTTP routes configuration
// Author: kelexine (https://github.com/kelexine)

use super::handlers::*;
use super::middleware::{cors_layer, envelope_rejections, log_requests, request_id_layers};
use crate::config::AppConfig;
use crate::error::Result;
use crate::upstream::UpstreamClient;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub upstream: Arc<UpstreamClient>,
}

pub fn create_router(config: AppConfig, upstream: UpstreamClient) -> Result<Router> {
    let cors = cors_layer(&config.server.frontend_url)?;
    let body_limit = config.server.body_limit_bytes;

    let state = AppState {
        config,
        upstream: Arc::new(upstream),
    };

    let (set_request_id, propagate_request_id) = request_id_layers();

    let app = Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/models", get(models_handler))
        .route("/api/test-connection", get(test_connection_handler))
        .route("/api/generate/image", post(generate_image_handler))
        .route("/api/generate/video", post(generate_video_handler))
        .route("/api/remove-background", post(remove_background_handler))
        .route("/api/upscale-image", post(upscale_image_handler))
        .route("/api/caption-image", post(caption_image_handler))
        .route("/api/image-to-text", post(image_to_text_handler))
        .route("/metrics", get(metrics_handler))
        .fallback(not_found_handler)
        // Base64 images are large; replace axum's 2MB default with the configured limit
        .layer(DefaultBodyLimit::disable())
        .layer(tower_http::limit::RequestBodyLimitLayer::new(body_limit))
        .layer(middleware::map_response(envelope_rejections))
        .layer(middleware::from_fn(log_requests))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id)
        .layer(set_request_id)
        .with_state(state);

    Ok(app)
}
