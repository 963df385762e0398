// HTTP client for a running pixelgate gateway
// Author: kelexine (https://github.com/kelexine)

use crate::config::ClientConfig;
use crate::error::{GatewayError, Result};
use crate::models::{
    Envelope, HealthResponse, ImagePayload, ImageRequest, ModelInfo, ModelsResponse,
    UpscaleRequest, VideoRequest,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Talks to the gateway's public `/api` surface.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http_client: Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(5))
            .use_rustls_tls()
            .build()
            .map_err(|e| GatewayError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.gateway_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Health document of the gateway. Unhealthy answers (500/503) are still
    /// returned as a document; only transport failures are errors.
    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self
            .http_client
            .get(self.url("/api/health"))
            .send()
            .await?;
        Ok(response.json().await?)
    }

    pub async fn models(&self) -> Result<Vec<ModelInfo>> {
        let body = self.get("/api/models").await?;
        let models: ModelsResponse = serde_json::from_value(body)?;
        Ok(models.models)
    }

    pub async fn test_connection(&self) -> Result<Value> {
        self.get("/api/test-connection").await
    }

    pub async fn generate_image(&self, req: &ImageRequest) -> Result<Value> {
        self.post("/api/generate/image", req).await
    }

    pub async fn generate_video(&self, req: &VideoRequest) -> Result<Value> {
        self.post("/api/generate/video", req).await
    }

    pub async fn remove_background(&self, req: &ImagePayload) -> Result<Value> {
        self.post("/api/remove-background", req).await
    }

    pub async fn upscale_image(&self, req: &UpscaleRequest) -> Result<Value> {
        self.post("/api/upscale-image", req).await
    }

    pub async fn caption_image(&self, req: &ImagePayload) -> Result<Value> {
        self.post("/api/caption-image", req).await
    }

    pub async fn image_to_text(&self, req: &ImagePayload) -> Result<Value> {
        self.post("/api/image-to-text", req).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Result<Value> {
        debug!("GET {}", path);
        let response = self.http_client.get(self.url(path)).send().await?;
        Self::read_envelope(response).await
    }

    async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Value> {
        debug!("POST {}", path);
        let response = self
            .http_client
            .post(self.url(path))
            .json(body)
            .send()
            .await?;
        Self::read_envelope(response).await
    }

    /// Accept a body only when it reports `success: true`; otherwise surface
    /// the gateway's error string.
    async fn read_envelope(response: reqwest::Response) -> Result<Value> {
        let status = response.status().as_u16();
        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text).map_err(|_| GatewayError::Remote {
            status,
            message: "Gateway returned a non-JSON response".to_string(),
        })?;

        let envelope = Envelope::of(&body);
        if envelope.success {
            Ok(body)
        } else {
            Err(GatewayError::Remote {
                status,
                message: envelope
                    .error
                    .unwrap_or_else(|| "Request failed".to_string()),
            })
        }
    }
}

/// Read an image file into a base64 data URL suitable for the tool endpoints.
pub fn encode_image_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let mime = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    };
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}
