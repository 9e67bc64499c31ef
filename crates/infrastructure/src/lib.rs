//! emberdns Infrastructure Layer
//!
//! Wire codec, response cache, rate limiter, upstream forwarder,
//! resolution engine and the UDP server loop.
pub mod cache;
pub mod rate_limit;
pub mod resolver;
pub mod server;
pub mod upstream;
pub mod wire;
