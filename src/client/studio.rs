// Client-side session: gateway calls, connectivity gating and the gallery
// Author: kelexine (https://github.com/kelexine)

use super::GatewayClient;
use crate::cache::{ArtifactKind, CacheEntry, FileStorage, GenerationResult, ResultCache, Storage};
use crate::connectivity::{ConnectivityMonitor, ConnectivityState};
use crate::error::{GatewayError, Result};
use crate::models::{ImagePayload, ImageRequest, UpscaleRequest, VideoRequest};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// What a user of the gateway works with: generation calls that land in the
/// local gallery, guarded by the connectivity status.
pub struct Studio<S = FileStorage> {
    client: GatewayClient,
    gallery: ResultCache<S>,
    monitor: Arc<ConnectivityMonitor>,
}

impl<S: Storage> Studio<S> {
    pub fn new(client: GatewayClient, gallery: ResultCache<S>) -> Self {
        let monitor = Arc::new(ConnectivityMonitor::new(client.clone()));
        Self {
            client,
            gallery,
            monitor,
        }
    }

    pub fn client(&self) -> &GatewayClient {
        &self.client
    }

    pub fn gallery(&self) -> &ResultCache<S> {
        &self.gallery
    }

    pub fn monitor(&self) -> &Arc<ConnectivityMonitor> {
        &self.monitor
    }

    /// Generate an image and store it at the front of the gallery.
    pub async fn generate_image(&self, req: &ImageRequest) -> Result<CacheEntry> {
        req.validate()?;
        self.ensure_connected().await?;

        let started = Instant::now();
        let body = self.client.generate_image(req).await?;
        self.store(ArtifactKind::Image, &body, started)
    }

    /// Generate a video and store it at the front of the gallery.
    pub async fn generate_video(&self, req: &VideoRequest) -> Result<CacheEntry> {
        req.validate()?;
        self.ensure_connected().await?;

        let started = Instant::now();
        let body = self.client.generate_video(req).await?;
        self.store(ArtifactKind::Video, &body, started)
    }

    // Tool results are shown to the user but not kept in the gallery

    pub async fn remove_background(&self, req: &ImagePayload) -> Result<Value> {
        req.validate()?;
        self.ensure_connected().await?;
        self.client.remove_background(req).await
    }

    pub async fn upscale_image(&self, req: &UpscaleRequest) -> Result<Value> {
        req.validate()?;
        self.ensure_connected().await?;
        self.client.upscale_image(req).await
    }

    pub async fn caption_image(&self, req: &ImagePayload) -> Result<Value> {
        req.validate()?;
        self.ensure_connected().await?;
        self.client.caption_image(req).await
    }

    pub async fn image_to_text(&self, req: &ImagePayload) -> Result<Value> {
        req.validate()?;
        self.ensure_connected().await?;
        self.client.image_to_text(req).await
    }

    /// Actions are refused while disconnected; an unknown status is probed first.
    /// A probe already in flight does not hold anything up.
    async fn ensure_connected(&self) -> Result<()> {
        let state = match self.monitor.state() {
            ConnectivityState::Unknown => self.monitor.probe().await,
            other => other,
        };

        if state == ConnectivityState::Disconnected {
            return Err(GatewayError::Disconnected);
        }
        Ok(())
    }

    fn store(&self, kind: ArtifactKind, body: &Value, started: Instant) -> Result<CacheEntry> {
        let round_trip = started.elapsed();
        let result = GenerationResult::from_envelope(kind, body)?;
        info!(
            "Generated {:?} {} in {:.2}s",
            kind,
            result.uuid,
            round_trip.as_secs_f64()
        );
        self.gallery.insert(result, round_trip)
    }
}
