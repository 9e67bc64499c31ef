use crate::ResponseCode;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Domain not found (NXDOMAIN)")]
    NxDomain,

    #[error("Query timeout")]
    QueryTimeout,

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Malformed DNS message: {0}")]
    Decode(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DomainError {
    /// Response code this failure surfaces as in the client-facing reply.
    pub fn rcode(&self) -> ResponseCode {
        match self {
            DomainError::NxDomain => ResponseCode::NxDomain,
            DomainError::RateLimited => ResponseCode::Refused,
            DomainError::Decode(_) | DomainError::InvalidDomainName(_) => ResponseCode::FormErr,
            DomainError::QueryTimeout
            | DomainError::Upstream(_)
            | DomainError::Io(_)
            | DomainError::ConfigError(_) => ResponseCode::ServFail,
        }
    }
}
