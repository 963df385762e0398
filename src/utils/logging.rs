//! Structured logging and payload-safe trace utilities.
//!
//! This module configures the `tracing` ecosystem for the application and
//! keeps base64 image payloads (often several megabytes) out of log sinks.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::config::LoggingConfig;
use crate::error::Result;
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Strings longer than this are replaced by a length marker in logs.
const MAX_LOGGED_STRING: usize = 256;

/// Initializes the global tracing subscriber for the application.
///
/// Supports three output formats:
/// - `json`: Structured JSON logs for production ingestion.
/// - `compact`: Single-line human-readable output.
/// - `pretty` (default): Multi-line, colorized output for development.
///
/// Log levels are controlled via the `RUST_LOG` environment variable or
/// the provided `LoggingConfig`.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        "compact" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().compact())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

/// Renders a JSON payload for logging with long strings elided.
///
/// Base64 images and data URLs are replaced by `<N bytes>` so that a debug
/// log line stays readable and never contains the uploaded image.
pub fn summarize_payload(payload: &Value) -> String {
    elide(payload).to_string()
}

fn elide(value: &Value) -> Value {
    match value {
        Value::String(s) if s.len() > MAX_LOGGED_STRING => {
            let kind = if s.starts_with("data:") { "data url" } else { "string" };
            Value::String(format!("<{} {} bytes>", kind, s.len()))
        }
        Value::Array(items) => Value::Array(items.iter().map(elide).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), elide(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}
