mod limiter;

pub use limiter::{NoopRateLimiter, SlidingWindowRateLimiter};
