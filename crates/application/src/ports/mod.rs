mod dns_resolver;
mod rate_limiter;

pub use dns_resolver::{DnsResolution, DnsResolver};
pub use rate_limiter::RateLimiter;

// Re-export for convenience
pub use emberdns_domain::DnsQuery;
