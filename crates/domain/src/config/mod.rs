mod cache;
mod errors;
mod logging;
mod rate_limit;
mod resolver;
mod root;
mod server;
mod upstream;

pub use cache::CacheConfig;
pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use rate_limit::RateLimitConfig;
pub use resolver::ResolverConfig;
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
pub use upstream::UpstreamConfig;
