use async_trait::async_trait;
use emberdns_application::ports::{DnsResolution, DnsResolver, RateLimiter};
use emberdns_domain::{DnsQuery, DomainError, ResourceRecord};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Resolver returning canned results per (domain, type), counting calls so
/// tests can assert the refused path never reaches it.
pub struct MockDnsResolver {
    results: Mutex<HashMap<(String, String), Result<Vec<ResourceRecord>, DomainError>>>,
    pub calls: AtomicU64,
}

impl MockDnsResolver {
    pub fn new() -> Self {
        Self {
            results: Mutex::new(HashMap::new()),
            calls: AtomicU64::new(0),
        }
    }

    pub fn with_result(
        self,
        query: &DnsQuery,
        result: Result<Vec<ResourceRecord>, DomainError>,
    ) -> Self {
        self.results.lock().unwrap().insert(
            (query.domain.to_string(), query.record_type.to_string()),
            result,
        );
        self
    }

    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsResolver for MockDnsResolver {
    async fn resolve(&self, query: &DnsQuery) -> Result<DnsResolution, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let results = self.results.lock().unwrap();
        match results.get(&(query.domain.to_string(), query.record_type.to_string())) {
            Some(Ok(records)) => Ok(DnsResolution::new(records.clone(), false)),
            Some(Err(e)) => Err(e.clone()),
            None => Err(DomainError::NxDomain),
        }
    }
}

/// Limiter admitting the first `capacity` calls, regardless of client.
pub struct MockRateLimiter {
    capacity: u64,
    seen: AtomicU64,
}

impl MockRateLimiter {
    pub fn admit_all() -> Self {
        Self {
            capacity: u64::MAX,
            seen: AtomicU64::new(0),
        }
    }

    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            capacity,
            seen: AtomicU64::new(0),
        }
    }
}

impl RateLimiter for MockRateLimiter {
    fn admit(&self, _client: IpAddr) -> bool {
        self.seen.fetch_add(1, Ordering::SeqCst) < self.capacity
    }
}
