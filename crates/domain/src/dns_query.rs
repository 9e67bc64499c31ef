use super::RecordType;
use std::sync::Arc;

/// Lowercase and strip the trailing root dot, so that case and
/// trailing-dot variants of the same name share one cache entry.
pub fn normalize_name(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DnsQuery {
    pub domain: Arc<str>,
    pub record_type: RecordType,
}

impl DnsQuery {
    /// Builds a query with the domain already normalized.
    pub fn new(domain: &str, record_type: RecordType) -> Self {
        Self {
            domain: Arc::from(normalize_name(domain)),
            record_type,
        }
    }

    /// Builds a query from a name that is known to be normalized already,
    /// reusing the allocation.
    pub fn from_normalized(domain: Arc<str>, record_type: RecordType) -> Self {
        Self {
            domain,
            record_type,
        }
    }
}
