use emberdns_application::ports::{DnsResolver, RateLimiter};
use emberdns_application::use_cases::HandleDnsQueryUseCase;
use emberdns_domain::Config;
use emberdns_infrastructure::cache::{ResponseCache, ResponseCacheConfig};
use emberdns_infrastructure::rate_limit::{NoopRateLimiter, SlidingWindowRateLimiter};
use emberdns_infrastructure::resolver::ForwardingResolver;
use emberdns_infrastructure::upstream::UdpForwarder;
use std::sync::Arc;
use tracing::info;

/// Wires cache, limiter, forwarder and resolver into the query use case.
pub struct DnsServices {
    pub handler_use_case: Arc<HandleDnsQueryUseCase>,
    pub cache: Option<Arc<ResponseCache>>,
}

impl DnsServices {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let forwarder = Arc::new(UdpForwarder::new(&config.upstream)?);

        let cache = if config.cache.enabled {
            info!(
                max_entries = config.cache.max_entries,
                min_ttl = config.cache.min_ttl,
                max_ttl = config.cache.max_ttl,
                "Response cache enabled"
            );
            Some(Arc::new(ResponseCache::new(ResponseCacheConfig {
                max_entries: config.cache.max_entries,
                min_ttl: config.cache.min_ttl,
                max_ttl: config.cache.max_ttl,
            })))
        } else {
            None
        };

        let mut resolver =
            ForwardingResolver::new(forwarder, config.resolver.max_cname_chain);
        if let Some(cache) = &cache {
            resolver = resolver.with_cache(Arc::clone(cache));
        }
        let resolver: Arc<dyn DnsResolver> = Arc::new(resolver);

        let rate_limiter: Arc<dyn RateLimiter> = if config.rate_limit.enabled {
            info!(
                max_queries_per_window = config.rate_limit.max_queries_per_window,
                window_seconds = config.rate_limit.window_seconds,
                "Rate limiter enabled"
            );
            Arc::new(SlidingWindowRateLimiter::new(&config.rate_limit))
        } else {
            Arc::new(NoopRateLimiter)
        };

        let handler_use_case = Arc::new(HandleDnsQueryUseCase::new(resolver, rate_limiter));

        Ok(Self {
            handler_use_case,
            cache,
        })
    }
}
