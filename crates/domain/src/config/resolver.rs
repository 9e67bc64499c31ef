use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Maximum CNAME hops followed before giving up on a chain.
    #[serde(default = "default_max_cname_chain")]
    pub max_cname_chain: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_cname_chain: default_max_cname_chain(),
        }
    }
}

fn default_max_cname_chain() -> usize {
    8
}
