// Configuration module
// Author: kelexine (https://github.com/kelexine)

mod models;

pub use models::*;

use crate::error::{GatewayError, Result};
use config::{Config, Environment, File};

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Legacy variables (`PYTHON_SERVICE_URL`, `PORT`, `FRONTEND_URL`) (highest)
    /// 2. Environment variables (`PIXELGATE_SECTION__KEY`)
    /// 3. Config file
    /// 4. Defaults (lowest)
    ///
    /// CLI flags are applied on top by the caller.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_config_path())
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .map(|p| {
                p.parse::<u16>()
                    .map_err(|e| GatewayError::Config(format!("Invalid PORT {:?}: {}", p, e)))
            })
            .transpose()?;

        let config = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?)
            // Load from config file if it exists
            .add_source(File::with_name(path).required(false))
            // Override with environment variables (prefix: PIXELGATE_)
            .add_source(
                Environment::with_prefix("PIXELGATE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("upstream.base_url", std::env::var("PYTHON_SERVICE_URL").ok())?
            .set_override_option("server.frontend_url", std::env::var("FRONTEND_URL").ok())?
            .set_override_option("server.port", port.map(i64::from))?
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| GatewayError::Config(e.to_string()))
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| GatewayError::Config(e.to_string()))
    }

    fn default_config_path() -> String {
        data_dir().join("config.toml").to_string_lossy().to_string()
    }
}
