//! Client for the AI-processing service.
//!
//! Every capability is described by an [`EndpointKind`]; the [`UpstreamClient`]
//! turns a kind and an optional JSON payload into one HTTP call and classifies
//! any failure into an [`UpstreamError`](crate::error::UpstreamError).
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod client;

pub use client::UpstreamClient;

use reqwest::Method;

/// One capability of the processing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    Health,
    Models,
    TestConnection,
    GenerateImage,
    GenerateVideo,
    RemoveBackground,
    UpscaleImage,
    CaptionImage,
    ImageToText,
}

impl EndpointKind {
    pub const ALL: [EndpointKind; 9] = [
        EndpointKind::Health,
        EndpointKind::Models,
        EndpointKind::TestConnection,
        EndpointKind::GenerateImage,
        EndpointKind::GenerateVideo,
        EndpointKind::RemoveBackground,
        EndpointKind::UpscaleImage,
        EndpointKind::CaptionImage,
        EndpointKind::ImageToText,
    ];

    /// Path on the processing service.
    pub fn path(self) -> &'static str {
        match self {
            EndpointKind::Health => "/health",
            EndpointKind::Models => "/models",
            EndpointKind::TestConnection => "/test-connection",
            EndpointKind::GenerateImage => "/generate/image",
            EndpointKind::GenerateVideo => "/generate/video",
            EndpointKind::RemoveBackground => "/remove-background",
            EndpointKind::UpscaleImage => "/upscale-image",
            EndpointKind::CaptionImage => "/caption-image",
            EndpointKind::ImageToText => "/image-to-text",
        }
    }

    pub fn method(self) -> Method {
        if self.is_probe() {
            Method::GET
        } else {
            Method::POST
        }
    }

    /// Lightweight calls without a payload. They use the shorter probe timeout.
    pub fn is_probe(self) -> bool {
        matches!(
            self,
            EndpointKind::Health | EndpointKind::Models | EndpointKind::TestConnection
        )
    }

    /// Label used in logs and metrics.
    pub fn name(self) -> &'static str {
        match self {
            EndpointKind::Health => "health",
            EndpointKind::Models => "models",
            EndpointKind::TestConnection => "test_connection",
            EndpointKind::GenerateImage => "generate_image",
            EndpointKind::GenerateVideo => "generate_video",
            EndpointKind::RemoveBackground => "remove_background",
            EndpointKind::UpscaleImage => "upscale_image",
            EndpointKind::CaptionImage => "caption_image",
            EndpointKind::ImageToText => "image_to_text",
        }
    }
}
