//! emberdns Domain Layer
pub mod config;
pub mod dns_query;
pub mod dns_record;
pub mod dns_request;
pub mod errors;
pub mod rcode;

pub use config::{CliOverrides, Config};
pub use dns_query::{normalize_name, DnsQuery};
pub use dns_record::{RecordData, RecordType, ResourceRecord};
pub use dns_request::DnsRequest;
pub use errors::DomainError;
pub use rcode::ResponseCode;
