//! Runtime settings.
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then `ENVWATCH_*` environment variables (nested keys use `__`, e.g.
//! `ENVWATCH_BACKOFF__FLOOR_MS=5000`). Command-line flags are applied on
//! top by the binary.
//!
//! ```toml
//! api_base_url = "https://apisensor-production.up.railway.app"
//! request_timeout_ms = 8000
//! max_points = 30
//! hidden_interval_ms = 10000
//!
//! [backoff]
//! floor_ms = 3000
//! ceiling_ms = 20000
//! factor = 1.6
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::data::DEFAULT_MAX_POINTS;
use crate::poll::{BackoffPolicy, PollConfig};

/// Default API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://apisensor-production.up.railway.app";

/// Dashboard settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    pub max_points: usize,
    pub hidden_interval_ms: u64,
    pub backoff: BackoffPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_ms: 8_000,
            max_points: DEFAULT_MAX_POINTS,
            hidden_interval_ms: 10_000,
            backoff: BackoffPolicy::default(),
        }
    }
}

impl Settings {
    /// Load settings from an optional file plus the environment.
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let config = builder
            .add_source(
                Environment::with_prefix("ENVWATCH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Poll loop parameters derived from these settings.
    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            backoff: self.backoff,
            hidden_interval: Duration::from_millis(self.hidden_interval_ms),
            max_points: self.max_points.max(1),
            ..PollConfig::default()
        }
    }
}
