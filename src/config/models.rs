//! Configuration data structures for pixelgate.
//!
//! This module defines the schema for the application settings: the gateway's
//! HTTP server, the upstream AI-processing service, the client side (gateway URL
//! and local gallery) and logging.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings (host, port, CORS origin).
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream AI-processing service settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Settings used by the CLI when talking to a running gateway.
    #[serde(default)]
    pub client: ClientConfig,

    /// Local gallery of generated artifacts.
    #[serde(default)]
    pub gallery: GalleryConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the built-in HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The IP address or hostname the server should bind to.
    /// Default: `127.0.0.1`
    #[serde(default = "default_host")]
    pub host: String,

    /// The port number the server should listen on.
    /// Default: `3001`
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origin of the browser front-end allowed by CORS.
    /// Default: `http://localhost:5174`
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,

    /// Maximum accepted request body, sized for base64-encoded images.
    /// Default: 50 MiB
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

/// Settings for the upstream AI-processing service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the processing service.
    /// Default: `http://localhost:5000`
    #[serde(default = "default_upstream_url")]
    pub base_url: String,

    /// Timeout for payload-bearing calls (generation, processing).
    /// Default: `30`
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Timeout for lightweight probes (health, models, connection test).
    /// Default: `10`
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_seconds: u64,

    /// TCP connect timeout.
    /// Default: `5`
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of a running gateway.
    /// Default: `http://localhost:3001`
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// Overall timeout of one client request. Video generation is slow.
    /// Default: `120`
    #[serde(default = "default_client_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryConfig {
    /// JSON file holding the persisted gallery.
    /// Default: `~/.pixelgate/gallery.json`
    #[serde(default = "default_gallery_path")]
    pub path: PathBuf,

    /// Number of most recent artifacts kept.
    /// Default: `20`
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`, `compact`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            frontend_url: default_frontend_url(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_url(),
            timeout_seconds: default_timeout(),
            probe_timeout_seconds: default_probe_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            gateway_url: default_gateway_url(),
            timeout_seconds: default_client_timeout(),
        }
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            path: default_gallery_path(),
            capacity: default_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Directory holding the config file and the gallery.
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".pixelgate")
}

// Helper functions for serde defaults
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_frontend_url() -> String {
    "http://localhost:5174".to_string()
}

fn default_body_limit() -> usize {
    50 * 1024 * 1024
}

fn default_upstream_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_probe_timeout() -> u64 {
    10
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_gateway_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_client_timeout() -> u64 {
    120
}

fn default_gallery_path() -> PathBuf {
    data_dir().join("gallery.json")
}

fn default_capacity() -> usize {
    crate::cache::DEFAULT_CAPACITY
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
