use serde::Deserialize;

use crate::error::{DripError, DripResult};

/// Root application configuration. Loaded from environment variables
/// with the prefix `DRIP_CHAIN__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: String,
}

// ─── Simulation Config ──────────────────────────────────────────────────
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Upper bound on loop iterations of a single walk.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    /// Artificial latency of the mock mailer.
    #[serde(default = "default_send_delay_ms")]
    pub send_delay_ms: u64,
    /// Language of the human-readable step messages (`ru` or `en`).
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_recipient")]
    pub default_recipient: String,
}

// Default functions
fn default_node_id() -> String {
    "node-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    4000
}
fn default_body_limit_bytes() -> usize {
    2 * 1024 * 1024
}
fn default_metrics_enabled() -> bool {
    false
}
fn default_metrics_port() -> u16 {
    9091
}
fn default_storage_path() -> String {
    "storage.json".to_string()
}
fn default_max_steps() -> usize {
    100
}
fn default_send_delay_ms() -> u64 {
    50
}
fn default_locale() -> String {
    "ru".to_string()
}
fn default_recipient() -> String {
    "test@example.com".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            port: default_metrics_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            send_delay_ms: default_send_delay_ms(),
            locale: default_locale(),
            default_recipient: default_recipient(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            storage: StorageConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> DripResult<Self> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("DRIP_CHAIN")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .and_then(|built| built.try_deserialize())
            .map_err(|e| DripError::Config(e.to_string()))
    }
}
