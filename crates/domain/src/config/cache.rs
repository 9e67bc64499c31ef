use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// TTL floor applied to cached entries, seconds.
    #[serde(default = "default_min_ttl")]
    pub min_ttl: u32,

    /// TTL ceiling applied to cached entries, seconds.
    #[serde(default = "default_max_ttl")]
    pub max_ttl: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_entries: default_max_entries(),
            min_ttl: default_min_ttl(),
            max_ttl: default_max_ttl(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_max_entries() -> usize {
    10_000
}

fn default_min_ttl() -> u32 {
    60
}

fn default_max_ttl() -> u32 {
    86_400
}
