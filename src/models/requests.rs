//! Request bodies accepted by the gateway.
//!
//! Each capability has its own body type. Missing optional parameters get the
//! same defaults the processing service would apply, so the forwarded payload
//! is always complete. `validate` runs before any upstream call is made.

// Author: kelexine (https://github.com/kelexine)

use super::choices::*;
use crate::error::{GatewayError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Number;
use tracing::debug;

/// Parse a raw JSON body. An empty body is treated as `{}` so that missing
/// fields are reported by name rather than as a syntax error. Parser details
/// never reach the caller.
pub fn parse_body<T: DeserializeOwned>(body: impl AsRef<[u8]>) -> Result<T> {
    let body = body.as_ref();
    let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|e| {
        debug!("Rejected request body: {}", e);
        if e.is_syntax() || e.is_eof() {
            GatewayError::Validation("Invalid JSON body".to_string())
        } else {
            GatewayError::Validation("Invalid request body".to_string())
        }
    })
}

/// `null` is read as the field's default, so required fields report their
/// own "is required" message.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn require_prompt(prompt: &str) -> Result<()> {
    if prompt.trim().is_empty() {
        return Err(GatewayError::Validation("Prompt is required".to_string()));
    }
    Ok(())
}

fn require_image(image: &str) -> Result<()> {
    if image.trim().is_empty() {
        return Err(GatewayError::Validation("Image data is required".to_string()));
    }
    Ok(())
}

fn one_of<T: PartialEq + std::fmt::Debug>(field: &str, value: T, allowed: &[T]) -> Result<()> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(GatewayError::Validation(format!(
            "{} must be one of {:?}, got {:?}",
            field, allowed, value
        )))
    }
}

/// Text-to-image request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub prompt: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_dimension")]
    pub width: u32,
    #[serde(default = "default_dimension")]
    pub height: u32,
    #[serde(default = "default_steps")]
    pub steps: u32,
    /// Kept as a JSON number so integers are forwarded as integers.
    #[serde(default = "default_cfg_scale")]
    pub cfg_scale: Number,
}

impl ImageRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: default_model(),
            width: DEFAULT_DIMENSION,
            height: DEFAULT_DIMENSION,
            steps: DEFAULT_STEPS,
            cfg_scale: default_cfg_scale(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_prompt(&self.prompt)?;
        if self.model.trim().is_empty() {
            return Err(GatewayError::Validation("Model must not be empty".to_string()));
        }
        one_of("width", self.width, IMAGE_DIMENSIONS)?;
        one_of("height", self.height, IMAGE_DIMENSIONS)?;
        if !STEPS_RANGE.contains(&self.steps) {
            return Err(GatewayError::Validation(format!(
                "steps must be between {} and {}, got {}",
                STEPS_RANGE.start(),
                STEPS_RANGE.end(),
                self.steps
            )));
        }
        let cfg = self.cfg_scale.as_f64().unwrap_or(f64::NAN);
        if !CFG_SCALE_RANGE.contains(&cfg) {
            return Err(GatewayError::Validation(format!(
                "cfgScale must be between {} and {}, got {}",
                CFG_SCALE_RANGE.start(),
                CFG_SCALE_RANGE.end(),
                self.cfg_scale
            )));
        }
        Ok(())
    }
}

/// Text-to-video request. Unset fields are left for the processing service to default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_quality: Option<u32>,
}

impl VideoRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_quality(mut self, quality: VideoQuality) -> Self {
        let (width, height) = quality.dimensions();
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_prompt(&self.prompt)?;
        if let Some(duration) = self.duration {
            one_of("duration", duration, VIDEO_DURATIONS)?;
        }
        match (self.width, self.height) {
            (None, None) => {}
            (Some(width), Some(height)) => {
                if VideoQuality::from_dimensions(width, height).is_none() {
                    return Err(GatewayError::Validation(format!(
                        "Video resolution {}x{} must match a 720p, 1080p or 4K preset",
                        width, height
                    )));
                }
            }
            _ => {
                return Err(GatewayError::Validation(
                    "Video width and height must be provided together".to_string(),
                ))
            }
        }
        if let Some(rate) = self.frame_rate {
            one_of("frameRate", rate, FRAME_RATES)?;
        }
        if let Some(format) = &self.output_format {
            one_of("outputFormat", format.as_str(), OUTPUT_FORMATS)?;
        }
        if let Some(quality) = self.output_quality {
            if !OUTPUT_QUALITY_RANGE.contains(&quality) {
                return Err(GatewayError::Validation(format!(
                    "outputQuality must be between {} and {}, got {}",
                    OUTPUT_QUALITY_RANGE.start(),
                    OUTPUT_QUALITY_RANGE.end(),
                    quality
                )));
            }
        }
        Ok(())
    }
}

/// Body of the single-image tools (background removal, captioning, text extraction).
/// `image` is base64, optionally as a data URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImagePayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
}

impl ImagePayload {
    pub fn new(image: impl Into<String>) -> Self {
        Self { image: image.into() }
    }

    pub fn validate(&self) -> Result<()> {
        require_image(&self.image)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpscaleRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
    #[serde(default = "default_scale_factor")]
    pub scale_factor: u32,
}

impl UpscaleRequest {
    pub fn new(image: impl Into<String>, scale_factor: u32) -> Self {
        Self {
            image: image.into(),
            scale_factor,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_image(&self.image)?;
        one_of("scaleFactor", self.scale_factor, SCALE_FACTORS)
    }
}

fn default_model() -> String {
    DEFAULT_IMAGE_MODEL.to_string()
}

fn default_dimension() -> u32 {
    DEFAULT_DIMENSION
}

fn default_steps() -> u32 {
    DEFAULT_STEPS
}

fn default_cfg_scale() -> Number {
    Number::from(DEFAULT_CFG_SCALE as u64)
}

fn default_scale_factor() -> u32 {
    DEFAULT_SCALE_FACTOR
}
