use emberdns_domain::ResourceRecord;
use std::sync::Arc;
use std::time::Instant;

/// One cached record set. Lives until `expires_at`; an expired entry is
/// indistinguishable from an absent one.
#[derive(Debug, Clone)]
pub struct CachedEntry {
    pub records: Arc<Vec<ResourceRecord>>,
    pub expires_at: Instant,
}

impl CachedEntry {
    pub fn new(records: Vec<ResourceRecord>, ttl_secs: u32, now: Instant) -> Self {
        Self {
            records: Arc::new(records),
            expires_at: now + std::time::Duration::from_secs(u64::from(ttl_secs)),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Seconds of life left, for the TTL reported on cache hits.
    pub fn remaining_ttl(&self, now: Instant) -> u32 {
        self.expires_at
            .saturating_duration_since(now)
            .as_secs()
            .min(u64::from(u32::MAX)) as u32
    }
}
