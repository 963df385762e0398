// pixelgate - AI media generation gateway and local gallery
// Author: kelexine (https://github.com/kelexine)

pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod metrics;
pub mod models;
pub mod server;
pub mod upstream;
pub mod utils;
