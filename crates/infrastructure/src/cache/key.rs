use emberdns_domain::RecordType;
use std::sync::Arc;

/// Cache key over the normalized owner name and the queried type.
/// Entries for different types of the same name never alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub domain: Arc<str>,
    pub record_type: RecordType,
}

impl CacheKey {
    pub fn new(domain: Arc<str>, record_type: RecordType) -> Self {
        Self {
            domain,
            record_type,
        }
    }
}
