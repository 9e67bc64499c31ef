use crate::ports::{DnsResolver, RateLimiter};
use emberdns_domain::{DnsQuery, DnsRequest, DomainError, ResourceRecord, ResponseCode};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// What a handled query resolves to, already mapped to the response code
/// the dispatcher puts on the wire.
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    /// NOERROR. `records` may be empty (NODATA).
    Answered {
        records: Vec<ResourceRecord>,
        cache_hit: bool,
    },
    /// Client is over its window quota; no resolution work was done.
    Refused,
    NxDomain,
    ServFail,
}

impl QueryOutcome {
    pub fn rcode(&self) -> ResponseCode {
        match self {
            QueryOutcome::Answered { .. } => ResponseCode::NoError,
            QueryOutcome::Refused => ResponseCode::Refused,
            QueryOutcome::NxDomain => ResponseCode::NxDomain,
            QueryOutcome::ServFail => ResponseCode::ServFail,
        }
    }
}

pub struct HandleDnsQueryUseCase {
    resolver: Arc<dyn DnsResolver>,
    rate_limiter: Arc<dyn RateLimiter>,
}

impl HandleDnsQueryUseCase {
    pub fn new(resolver: Arc<dyn DnsResolver>, rate_limiter: Arc<dyn RateLimiter>) -> Self {
        Self {
            resolver,
            rate_limiter,
        }
    }

    pub async fn execute(&self, request: &DnsRequest) -> QueryOutcome {
        let start = Instant::now();

        // Admission first: a rejected client gets no resolution work at all.
        if !self.rate_limiter.admit(request.client_ip) {
            debug!(client = %request.client_ip, domain = %request.domain, "Query refused by rate limiter");
            return QueryOutcome::Refused;
        }

        let query = DnsQuery::from_normalized(Arc::clone(&request.domain), request.record_type);

        match self.resolver.resolve(&query).await {
            Ok(resolution) => {
                if resolution.is_nodata() {
                    debug!(
                        domain = %request.domain,
                        record_type = %request.record_type,
                        "No records of the requested type"
                    );
                }
                info!(
                    domain = %request.domain,
                    record_type = %request.record_type,
                    client = %request.client_ip,
                    cache_hit = resolution.cache_hit,
                    answers = resolution.records.len(),
                    elapsed_us = start.elapsed().as_micros() as u64,
                    "Query resolved"
                );
                QueryOutcome::Answered {
                    records: resolution.records,
                    cache_hit: resolution.cache_hit,
                }
            }
            Err(DomainError::NxDomain) => {
                info!(
                    domain = %request.domain,
                    record_type = %request.record_type,
                    client = %request.client_ip,
                    elapsed_us = start.elapsed().as_micros() as u64,
                    "Domain not found"
                );
                QueryOutcome::NxDomain
            }
            Err(e) => {
                warn!(
                    domain = %request.domain,
                    record_type = %request.record_type,
                    client = %request.client_ip,
                    error = %e,
                    "Query resolution failed"
                );
                QueryOutcome::ServFail
            }
        }
    }
}
