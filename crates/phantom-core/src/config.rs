//! Application configuration model.
//!
//! Loaded from `config.toml` by the infrastructure layer; every field has a
//! default so a missing file means a fully default configuration.

use serde::{Deserialize, Serialize};

/// Default lifetime of an ephemeral message, in milliseconds.
pub const DEFAULT_EPHEMERAL_TTL_MS: u64 = 15_000;

/// Default sweep period, in seconds.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 1;

/// Tunable application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// How long an ephemeral message lives before the sweep evicts it.
    #[serde(default = "default_ephemeral_ttl_ms")]
    pub ephemeral_ttl_ms: u64,
    /// Period of the background expiry sweep.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Overrides the provider model name from `secret.json`.
    #[serde(default)]
    pub model: Option<String>,
}

fn default_ephemeral_ttl_ms() -> u64 {
    DEFAULT_EPHEMERAL_TTL_MS
}

fn default_sweep_interval_secs() -> u64 {
    DEFAULT_SWEEP_INTERVAL_SECS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ephemeral_ttl_ms: DEFAULT_EPHEMERAL_TTL_MS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            model: None,
        }
    }
}

impl AppConfig {
    pub fn ephemeral_ttl(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.ephemeral_ttl_ms as i64)
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs)
    }
}
