//! Gateway connectivity monitor.
//!
//! Holds the tri-state connection status used to gate user actions and
//! refreshes it through an explicit [`ConnectivityMonitor::probe`]. Probes are
//! triggered by the caller (start-up, a manual retry); nothing polls in the
//! background.
//!
//! ```text
//! Unknown ──probe──▶ Checking ──healthy──▶ Connected
//!                        │
//!                        └──any failure──▶ Disconnected ──retry──▶ Checking
//! ```
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::client::GatewayClient;
use crate::models::HealthStatus;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityState {
    Unknown,
    Checking,
    Connected,
    Disconnected,
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectivityState::Unknown => "unknown",
            ConnectivityState::Checking => "checking connection...",
            ConnectivityState::Connected => "connected",
            ConnectivityState::Disconnected => {
                "unable to connect to API. Please ensure services are running."
            }
        })
    }
}

pub struct ConnectivityMonitor {
    client: GatewayClient,
    state: watch::Sender<ConnectivityState>,
}

impl ConnectivityMonitor {
    pub fn new(client: GatewayClient) -> Self {
        let (state, _) = watch::channel(ConnectivityState::Unknown);
        Self { client, state }
    }

    pub fn state(&self) -> ConnectivityState {
        *self.state.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectivityState::Connected
    }

    /// Receiver notified on every transition.
    pub fn subscribe(&self) -> watch::Receiver<ConnectivityState> {
        self.state.subscribe()
    }

    /// Check the gateway's health endpoint and record the outcome.
    ///
    /// Safe to call repeatedly; each call moves through `Checking` and ends in
    /// `Connected` or `Disconnected`.
    pub async fn probe(&self) -> ConnectivityState {
        self.state.send_replace(ConnectivityState::Checking);
        debug!("Probing gateway at {}", self.client.base_url());

        let next = match self.client.health().await {
            Ok(health) if health.status == HealthStatus::Healthy => ConnectivityState::Connected,
            Ok(health) => {
                warn!(
                    "Gateway reports unhealthy: {}",
                    health.error.as_deref().unwrap_or("no details")
                );
                ConnectivityState::Disconnected
            }
            Err(e) => {
                warn!("Connection check failed: {}", e);
                ConnectivityState::Disconnected
            }
        };

        self.state.send_replace(next);
        info!("Connectivity: {}", next);
        next
    }

    /// Run a probe in the background without waiting for it.
    pub fn spawn_probe(self: &Arc<Self>) -> JoinHandle<ConnectivityState> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move { monitor.probe().await })
    }
}
