mod entry;
mod key;
mod metrics;
mod storage;

pub use entry::CachedEntry;
pub use key::CacheKey;
pub use metrics::{CacheMetrics, CacheMetricsSnapshot};
pub use storage::{ResponseCache, ResponseCacheConfig};
