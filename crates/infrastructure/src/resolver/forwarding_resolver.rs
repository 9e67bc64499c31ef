use crate::cache::{CacheKey, ResponseCache};
use crate::upstream::UdpForwarder;
use async_trait::async_trait;
use dashmap::DashMap;
use emberdns_application::ports::{DnsResolution, DnsResolver};
use emberdns_domain::dns_record::min_ttl;
use emberdns_domain::{normalize_name, DnsQuery, DomainError, ResourceRecord, ResponseCode};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Resolution engine: cache lookup, upstream forwarding, CNAME chasing and
/// cache population, with per-key single-flight so concurrent misses for
/// one (name, type) collapse into a single upstream query.
pub struct ForwardingResolver {
    forwarder: Arc<UdpForwarder>,
    cache: Option<Arc<ResponseCache>>,
    max_cname_chain: usize,
    inflight: DashMap<CacheKey, Arc<Mutex<()>>>,
}

impl ForwardingResolver {
    pub fn new(forwarder: Arc<UdpForwarder>, max_cname_chain: usize) -> Self {
        Self {
            forwarder,
            cache: None,
            max_cname_chain,
            inflight: DashMap::new(),
        }
    }

    pub fn with_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    fn try_cache(&self, query: &DnsQuery) -> Option<Vec<ResourceRecord>> {
        self.cache
            .as_ref()?
            .get(&query.domain, query.record_type)
    }

    /// One upstream round for the query, plus CNAME chasing for address
    /// questions answered only with aliases.
    async fn resolve_upstream(&self, query: &DnsQuery) -> Result<Vec<ResourceRecord>, DomainError> {
        let response = self
            .forwarder
            .query(&query.domain, query.record_type)
            .await?;

        match response.header.rcode {
            ResponseCode::NoError => {}
            ResponseCode::NxDomain => return Err(DomainError::NxDomain),
            other => {
                return Err(DomainError::Upstream(format!(
                    "Upstream returned {}",
                    other
                )))
            }
        }

        let mut records = response.answers;

        if query.record_type.is_address() {
            self.follow_cname_chain(query, &mut records).await?;
        }

        Ok(records)
    }

    /// Re-queries CNAME targets until a terminal record of the requested
    /// type appears, accumulating the aliases and the terminal set.
    /// Bounded so a looping upstream cannot hang a handler.
    async fn follow_cname_chain(
        &self,
        query: &DnsQuery,
        records: &mut Vec<ResourceRecord>,
    ) -> Result<(), DomainError> {
        let mut hops = 0;

        loop {
            if records.iter().any(|r| r.answers(query.record_type)) {
                return Ok(());
            }

            let Some(target) = records.iter().rev().find_map(|r| r.cname_target()) else {
                return Ok(()); // no terminal record and no alias: NODATA
            };

            if hops >= self.max_cname_chain {
                warn!(
                    domain = %query.domain,
                    chain_length = hops,
                    "CNAME chain exceeded maximum length"
                );
                return Err(DomainError::Upstream(
                    "CNAME chain exceeded maximum length".to_string(),
                ));
            }
            hops += 1;

            let target = normalize_name(target);
            debug!(domain = %query.domain, target = %target, hop = hops, "Following CNAME");

            let response = self.forwarder.query(&target, query.record_type).await?;
            match response.header.rcode {
                ResponseCode::NoError => {}
                ResponseCode::NxDomain => return Err(DomainError::NxDomain),
                other => {
                    return Err(DomainError::Upstream(format!(
                        "Upstream returned {} while following CNAME",
                        other
                    )))
                }
            }

            if response.answers.is_empty() {
                return Ok(());
            }
            records.extend(response.answers);
        }
    }

    async fn resolve_uncached(&self, query: &DnsQuery) -> Result<DnsResolution, DomainError> {
        let records = self.resolve_upstream(query).await?;

        // Only positive, non-empty results enter the cache; failure
        // outcomes never displace what other names have cached.
        if !records.is_empty() {
            if let Some(cache) = &self.cache {
                let ttl = min_ttl(&records).unwrap_or(0);
                cache.insert(&query.domain, query.record_type, records.clone(), ttl);
            }
        }

        Ok(DnsResolution::new(records, false))
    }
}

#[async_trait]
impl DnsResolver for ForwardingResolver {
    async fn resolve(&self, query: &DnsQuery) -> Result<DnsResolution, DomainError> {
        if let Some(records) = self.try_cache(query) {
            debug!(domain = %query.domain, record_type = %query.record_type, "Cache hit");
            return Ok(DnsResolution::new(records, true));
        }

        let key = CacheKey::new(Arc::clone(&query.domain), query.record_type);
        let gate = self
            .inflight
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _guard = gate.lock().await;

            // A concurrent holder may have populated the cache while we
            // waited on the gate.
            if let Some(records) = self.try_cache(query) {
                debug!(domain = %query.domain, record_type = %query.record_type, "Cache hit after single-flight wait");
                Ok(DnsResolution::new(records, true))
            } else {
                self.resolve_uncached(query).await
            }
        };

        self.inflight.remove(&key);

        if let Ok(resolution) = &result {
            info!(
                domain = %query.domain,
                record_type = %query.record_type,
                answers = resolution.records.len(),
                cache_hit = resolution.cache_hit,
                "Resolution complete"
            );
        }

        result
    }
}
