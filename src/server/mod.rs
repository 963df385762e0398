//! Axum-based HTTP gateway.
//!
//! This module exposes the stable public contract (one endpoint per capability),
//! validates request bodies before anything leaves the process, and forwards
//! valid requests to the processing service through the
//! [`UpstreamClient`](crate::upstream::UpstreamClient).
//!
//! # Components
//!
//! - `handlers`: One handler per capability plus health, metrics and the 404 fallback.
//! - `middleware`: Request IDs, CORS, and the per-request log line.
//! - `routes`: The router configuration that ties everything together.
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod handlers;
mod middleware;
mod routes;

pub use routes::{create_router, AppState};
