use super::{CacheKey, CachedEntry, CacheMetrics, CacheMetricsSnapshot};
use dashmap::DashMap;
use emberdns_domain::{RecordType, ResourceRecord};
use rustc_hash::FxBuildHasher;
use std::sync::atomic::Ordering as AtomicOrdering;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

pub struct ResponseCacheConfig {
    pub max_entries: usize,
    pub min_ttl: u32,
    pub max_ttl: u32,
}

/// TTL-keyed (name, type) -> record-set store. Names are expected
/// normalized by the caller; expiry is checked under the map reference so
/// a racing insert cannot resurrect a stale set.
pub struct ResponseCache {
    entries: DashMap<CacheKey, CachedEntry, FxBuildHasher>,
    max_entries: usize,
    min_ttl: u32,
    max_ttl: u32,
    metrics: Arc<CacheMetrics>,
}

impl ResponseCache {
    pub fn new(config: ResponseCacheConfig) -> Self {
        Self {
            entries: DashMap::with_capacity_and_hasher(config.max_entries, FxBuildHasher),
            max_entries: config.max_entries,
            min_ttl: config.min_ttl,
            max_ttl: config.max_ttl,
            metrics: Arc::new(CacheMetrics::default()),
        }
    }

    pub fn get(&self, domain: &Arc<str>, record_type: RecordType) -> Option<Vec<ResourceRecord>> {
        self.get_at(domain, record_type, Instant::now())
    }

    fn get_at(
        &self,
        domain: &Arc<str>,
        record_type: RecordType,
        now: Instant,
    ) -> Option<Vec<ResourceRecord>> {
        let key = CacheKey::new(Arc::clone(domain), record_type);

        if let Some(entry) = self.entries.get(&key) {
            if entry.is_expired(now) {
                drop(entry);
                // Expired means absent; drop it on sight.
                self.entries
                    .remove_if(&key, |_, entry| entry.is_expired(now));
                self.metrics.misses.fetch_add(1, AtomicOrdering::Relaxed);
                return None;
            }

            self.metrics.hits.fetch_add(1, AtomicOrdering::Relaxed);

            // Served TTLs count down with the entry's remaining lifetime,
            // so a client re-caching the answer cannot outlive us.
            let remaining = entry.remaining_ttl(now);
            let records = entry
                .records
                .iter()
                .cloned()
                .map(|mut record| {
                    record.ttl = remaining;
                    record
                })
                .collect();
            return Some(records);
        }

        self.metrics.misses.fetch_add(1, AtomicOrdering::Relaxed);
        None
    }

    /// Stores a record set under (domain, type). The effective lifetime is
    /// `ttl_secs` clamped to the configured bounds.
    pub fn insert(
        &self,
        domain: &Arc<str>,
        record_type: RecordType,
        records: Vec<ResourceRecord>,
        ttl_secs: u32,
    ) {
        if self.entries.len() >= self.max_entries {
            self.evict_one();
        }

        let ttl = ttl_secs.clamp(self.min_ttl, self.max_ttl);
        let key = CacheKey::new(Arc::clone(domain), record_type);
        self.entries
            .insert(key, CachedEntry::new(records, ttl, Instant::now()));
        self.metrics
            .insertions
            .fetch_add(1, AtomicOrdering::Relaxed);

        debug!(domain = %domain, record_type = %record_type, ttl, "Inserted record set into cache");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn metrics(&self) -> CacheMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Frees one slot: prefers an expired entry, otherwise drops an
    /// arbitrary one. Keeps insert O(len) worst case but only when full.
    fn evict_one(&self) {
        let now = Instant::now();
        let victim = self
            .entries
            .iter()
            .find(|entry| entry.value().is_expired(now))
            .or_else(|| self.entries.iter().next())
            .map(|entry| entry.key().clone());

        if let Some(key) = victim {
            self.entries.remove(&key);
            self.metrics.evictions.fetch_add(1, AtomicOrdering::Relaxed);
        }
    }
}
