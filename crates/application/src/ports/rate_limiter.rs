use std::net::IpAddr;

/// Admission control keyed by client source IP. Called once per inbound
/// datagram, before any resolution work; must stay cheap on the reject
/// path so an over-limit client cannot amplify server cost.
pub trait RateLimiter: Send + Sync {
    fn admit(&self, client: IpAddr) -> bool;
}
