//! Utility functions and helpers for pixelgate.
//!
//! # Submodules
//!
//! - `logging`: Tracing initialization and payload elision for log lines.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod logging;
