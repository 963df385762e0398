// Enumerated parameter choices accepted by the gateway
// Author: kelexine (https://github.com/kelexine)

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

pub const DEFAULT_IMAGE_MODEL: &str = "runware:101@1";
pub const DEFAULT_DIMENSION: u32 = 1024;
pub const DEFAULT_STEPS: u32 = 20;
pub const DEFAULT_CFG_SCALE: f64 = 7.0;
pub const DEFAULT_SCALE_FACTOR: u32 = 2;

pub const IMAGE_DIMENSIONS: &[u32] = &[512, 768, 1024, 1536];
pub const STEPS_RANGE: RangeInclusive<u32> = 10..=50;
pub const CFG_SCALE_RANGE: RangeInclusive<f64> = 1.0..=20.0;

pub const VIDEO_DURATIONS: &[u32] = &[5, 10, 15];
pub const FRAME_RATES: &[u32] = &[24, 30, 60];
pub const OUTPUT_QUALITY_RANGE: RangeInclusive<u32> = 1..=100;
pub const OUTPUT_FORMATS: &[&str] = &["mp4", "webm", "mov"];

pub const SCALE_FACTORS: &[u32] = &[2, 3, 4];

/// Named video resolution presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoQuality {
    Hd,
    FullHd,
    UltraHd,
}

impl VideoQuality {
    pub const ALL: [VideoQuality; 3] = [VideoQuality::Hd, VideoQuality::FullHd, VideoQuality::UltraHd];

    pub fn dimensions(self) -> (u32, u32) {
        match self {
            VideoQuality::Hd => (1280, 720),
            VideoQuality::FullHd => (1920, 1080),
            VideoQuality::UltraHd => (3840, 2160),
        }
    }

    pub fn from_dimensions(width: u32, height: u32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|q| q.dimensions() == (width, height))
    }
}

impl fmt::Display for VideoQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VideoQuality::Hd => "720p",
            VideoQuality::FullHd => "1080p",
            VideoQuality::UltraHd => "4K",
        })
    }
}

impl FromStr for VideoQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "720p" | "hd" => Ok(VideoQuality::Hd),
            "1080p" | "fullhd" => Ok(VideoQuality::FullHd),
            "4k" | "2160p" => Ok(VideoQuality::UltraHd),
            other => Err(format!("unknown video quality '{}' (expected 720p, 1080p or 4K)", other)),
        }
    }
}
