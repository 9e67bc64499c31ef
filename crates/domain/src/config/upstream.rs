use serde::{Deserialize, Serialize};

/// Upstream resolver the server forwards cache misses to.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_server")]
    pub server: String,

    /// Per-attempt receive deadline.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_initial_retry_delay_ms")]
    pub initial_retry_delay_ms: u64,

    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            initial_retry_delay_ms: default_initial_retry_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

fn default_server() -> String {
    "8.8.8.8:53".to_string()
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_retry_delay_ms() -> u64 {
    100
}

fn default_backoff_multiplier() -> f64 {
    2.0
}
