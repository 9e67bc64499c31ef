use serde::{Deserialize, Serialize};

/// Per-client sliding-window admission control.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_max_queries_per_window")]
    pub max_queries_per_window: u32,

    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_queries_per_window: default_max_queries_per_window(),
            window_seconds: default_window_seconds(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_max_queries_per_window() -> u32 {
    250
}

fn default_window_seconds() -> u64 {
    1
}
