// CLI module for pixelgate
// Author: kelexine (https://github.com/kelexine)

pub mod commands;

use crate::config::AppConfig;
use crate::models::choices::{DEFAULT_CFG_SCALE, DEFAULT_DIMENSION, DEFAULT_IMAGE_MODEL, DEFAULT_STEPS};
use crate::models::VideoQuality;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pixelgate - gateway and local gallery for AI image and video generation
#[derive(Parser, Debug)]
#[command(name = "pixelgate", version, about, long_about = None)]
pub struct Args {
    /// Address the gateway binds to
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Port the gateway listens on
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Base URL of a running gateway (client commands)
    #[arg(long, global = true, env = "PIXELGATE_GATEWAY_URL")]
    pub gateway_url: Option<String>,

    /// Gallery file (client commands)
    #[arg(long, global = true)]
    pub gallery: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Args {
    /// Apply flag overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = &self.gateway_url {
            config.client.gateway_url = url.clone();
        }
        if let Some(path) = &self.gallery {
            config.gallery.path = path.clone();
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP gateway (default)
    Serve,
    /// Probe a running gateway and report the connection status
    Status,
    /// List the models offered by the processing service
    Models,
    /// Ask the processing service to test its own provider connection
    TestConnection,
    /// Generate an image and add it to the gallery
    Image {
        /// Text description of the image
        #[arg(long, short)]
        prompt: String,
        #[arg(long, default_value = DEFAULT_IMAGE_MODEL)]
        model: String,
        #[arg(long, default_value_t = DEFAULT_DIMENSION)]
        width: u32,
        #[arg(long, default_value_t = DEFAULT_DIMENSION)]
        height: u32,
        #[arg(long, default_value_t = DEFAULT_STEPS)]
        steps: u32,
        #[arg(long, default_value_t = DEFAULT_CFG_SCALE)]
        cfg_scale: f64,
    },
    /// Generate a video and add it to the gallery
    Video {
        #[arg(long, short)]
        prompt: String,
        /// Length in seconds (5, 10 or 15)
        #[arg(long)]
        duration: Option<u32>,
        /// Resolution preset: 720p, 1080p or 4K
        #[arg(long)]
        quality: Option<VideoQuality>,
        /// Frames per second (24, 30 or 60)
        #[arg(long)]
        frame_rate: Option<u32>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        output_format: Option<String>,
        #[arg(long)]
        output_quality: Option<u32>,
    },
    /// Remove the background of an image file
    RemoveBackground { file: PathBuf },
    /// Upscale an image file
    Upscale {
        file: PathBuf,
        /// Scale factor (2, 3 or 4)
        #[arg(long, default_value_t = 2)]
        scale: u32,
    },
    /// Describe an image file
    Caption { file: PathBuf },
    /// Extract text from an image file
    ImageToText { file: PathBuf },
    /// Inspect or edit the local gallery
    Gallery {
        #[command(subcommand)]
        action: GalleryAction,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Subcommand, Debug)]
pub enum GalleryAction {
    /// List entries, most recent first
    List,
    /// Print one entry as JSON
    Show { uuid: String },
    /// Delete one entry
    Remove { uuid: String },
    /// Delete every entry
    Clear {
        /// Confirm deleting all entries
        #[arg(long)]
        yes: bool,
    },
}
