// Processing service HTTP client
// Author: kelexine (https://github.com/kelexine)

use super::EndpointKind;
use crate::config::UpstreamConfig;
use crate::error::{GatewayError, Result, UpstreamError};
use crate::utils::logging::summarize_payload;
use reqwest::Client;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Client for the AI-processing service.
///
/// Stateless across calls apart from the pooled HTTP client and the fixed base
/// address. There is no retry: a failed call is reported once and the caller
/// decides whether to try again.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http_client: Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .build()
            .map_err(|e| GatewayError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        debug!("Created upstream client for {}", config.base_url);

        Ok(Self {
            http_client,
            config: config.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Deadline applied to one call of `kind`.
    pub fn timeout_for(&self, kind: EndpointKind) -> Duration {
        if kind.is_probe() {
            Duration::from_secs(self.config.probe_timeout_seconds)
        } else {
            Duration::from_secs(self.config.timeout_seconds)
        }
    }

    /// Call one capability and return the upstream JSON body on 2xx.
    pub async fn call(
        &self,
        kind: EndpointKind,
        payload: Option<&Value>,
    ) -> std::result::Result<Value, UpstreamError> {
        let started = Instant::now();
        let result = self.execute(kind, payload).await;
        let elapsed = started.elapsed().as_secs_f64();

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        crate::metrics::record_upstream_call(kind.name(), outcome, elapsed);

        match &result {
            Ok(_) => debug!("Upstream {} succeeded in {:.2}s", kind.name(), elapsed),
            Err(e @ UpstreamError::UpstreamRejected { .. }) => {
                warn!("Upstream {} failed after {:.2}s: {}", kind.name(), elapsed, e)
            }
            Err(e) => error!("Upstream {} failed after {:.2}s: {}", kind.name(), elapsed, e),
        }

        result
    }

    async fn execute(
        &self,
        kind: EndpointKind,
        payload: Option<&Value>,
    ) -> std::result::Result<Value, UpstreamError> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), kind.path());
        let timeout = self.timeout_for(kind);

        debug!("Calling {} {}", kind.method(), url);
        if let Some(payload) = payload {
            debug!("Upstream payload: {}", summarize_payload(payload));
        }

        let mut request = self
            .http_client
            .request(kind.method(), &url)
            .timeout(timeout);
        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = request
            .send()
            .await
            .map_err(|e| classify_transport_error(e, timeout))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| classify_transport_error(e, timeout))?;

        let parsed: std::result::Result<Value, _> = serde_json::from_str(&text);

        if !status.is_success() {
            return match parsed {
                Ok(body) => Err(UpstreamError::UpstreamRejected {
                    status: status.as_u16(),
                    body,
                }),
                Err(_) => Err(UpstreamError::Internal(format!(
                    "HTTP {} with non-JSON body ({} bytes)",
                    status,
                    text.len()
                ))),
            };
        }

        parsed.map_err(|e| UpstreamError::Internal(format!("Response parsing error: {}", e)))
    }
}

fn classify_transport_error(e: reqwest::Error, timeout: Duration) -> UpstreamError {
    if e.is_connect() {
        UpstreamError::Unavailable(e.to_string())
    } else if e.is_timeout() {
        UpstreamError::Timeout(timeout.as_secs())
    } else {
        UpstreamError::Internal(e.to_string())
    }
}
