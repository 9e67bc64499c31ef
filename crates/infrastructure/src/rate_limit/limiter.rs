use dashmap::DashMap;
use emberdns_application::ports::RateLimiter;
use emberdns_domain::config::RateLimitConfig;
use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Default)]
struct ClientRecord {
    /// Admission timestamps still inside the trailing window.
    admitted: VecDeque<Instant>,
    total_queries: u64,
    rate_limited_queries: u64,
}

/// Per-client sliding-window log. Each client gets its own record,
/// created on first sight and kept for the life of the process; stale
/// timestamps are pruned on the next call, never the record itself.
pub struct SlidingWindowRateLimiter {
    clients: DashMap<IpAddr, ClientRecord>,
    window: Duration,
    max_per_window: usize,
    total_rate_limited: AtomicU64,
}

impl SlidingWindowRateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            clients: DashMap::new(),
            window: Duration::from_secs(config.window_seconds),
            max_per_window: config.max_queries_per_window as usize,
            total_rate_limited: AtomicU64::new(0),
        }
    }

    fn admit_at(&self, client: IpAddr, now: Instant) -> bool {
        let mut record = self.clients.entry(client).or_default();

        // Drop admissions that have slid out of the window. checked_sub
        // because Instant underflows early in process life.
        if let Some(window_start) = now.checked_sub(self.window) {
            while record
                .admitted
                .front()
                .is_some_and(|&t| t < window_start)
            {
                record.admitted.pop_front();
            }
        }

        if record.admitted.len() >= self.max_per_window {
            record.rate_limited_queries += 1;
            self.total_rate_limited.fetch_add(1, Ordering::Relaxed);
            debug!(client = %client, "Rate limit exceeded");
            return false;
        }

        record.admitted.push_back(now);
        record.total_queries += 1;
        true
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn total_rate_limited(&self) -> u64 {
        self.total_rate_limited.load(Ordering::Relaxed)
    }
}

impl RateLimiter for SlidingWindowRateLimiter {
    fn admit(&self, client: IpAddr) -> bool {
        self.admit_at(client, Instant::now())
    }
}

/// Pass-through used when rate limiting is disabled in config.
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {
    fn admit(&self, _client: IpAddr) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn limiter(max: u32, window_seconds: u64) -> SlidingWindowRateLimiter {
        SlidingWindowRateLimiter::new(&RateLimitConfig {
            enabled: true,
            max_queries_per_window: max,
            window_seconds,
        })
    }

    fn client(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[test]
    fn test_burst_splits_into_admitted_and_refused() {
        let limiter = limiter(250, 1);
        let now = Instant::now();

        let mut admitted = 0;
        let mut refused = 0;
        for _ in 0..350 {
            if limiter.admit_at(client(1), now) {
                admitted += 1;
            } else {
                refused += 1;
            }
        }

        assert_eq!(admitted, 250);
        assert_eq!(refused, 100);
        assert_eq!(limiter.total_rate_limited(), 100);
    }

    #[test]
    fn test_window_recovery() {
        let limiter = limiter(5, 1);
        let start = Instant::now();

        for _ in 0..5 {
            assert!(limiter.admit_at(client(1), start));
        }
        assert!(!limiter.admit_at(client(1), start));

        // Just past the window, the whole budget is back.
        let later = start + Duration::from_millis(1200);
        for _ in 0..5 {
            assert!(limiter.admit_at(client(1), later));
        }
    }

    #[test]
    fn test_clients_have_independent_budgets() {
        let limiter = limiter(3, 1);
        let now = Instant::now();

        for _ in 0..3 {
            assert!(limiter.admit_at(client(1), now));
        }
        assert!(!limiter.admit_at(client(1), now));

        // a different source IP is unaffected
        assert!(limiter.admit_at(client(2), now));
        assert_eq!(limiter.client_count(), 2);
    }

    #[test]
    fn test_rejections_do_not_consume_budget() {
        let limiter = limiter(2, 1);
        let start = Instant::now();

        assert!(limiter.admit_at(client(1), start));
        assert!(limiter.admit_at(client(1), start));
        for _ in 0..100 {
            assert!(!limiter.admit_at(client(1), start));
        }

        // only the two admissions needed to expire
        let later = start + Duration::from_millis(1100);
        assert!(limiter.admit_at(client(1), later));
    }

    #[test]
    fn test_partial_slide() {
        let limiter = limiter(2, 1);
        let start = Instant::now();

        assert!(limiter.admit_at(client(1), start));
        let half = start + Duration::from_millis(500);
        assert!(limiter.admit_at(client(1), half));
        assert!(!limiter.admit_at(client(1), half));

        // first admission slides out at +1s, second is still inside
        let after_first = start + Duration::from_millis(1100);
        assert!(limiter.admit_at(client(1), after_first));
        assert!(!limiter.admit_at(client(1), after_first));
    }
}
