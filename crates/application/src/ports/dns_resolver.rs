use async_trait::async_trait;
use emberdns_domain::{DnsQuery, DomainError, ResourceRecord};

/// Outcome of a successful resolution. An empty record set is a valid
/// NODATA answer and is not the same as NXDOMAIN, which surfaces as
/// `DomainError::NxDomain` instead.
#[derive(Debug, Clone)]
pub struct DnsResolution {
    pub records: Vec<ResourceRecord>,
    pub cache_hit: bool,
}

impl DnsResolution {
    pub fn new(records: Vec<ResourceRecord>, cache_hit: bool) -> Self {
        Self { records, cache_hit }
    }

    pub fn is_nodata(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
pub trait DnsResolver: Send + Sync {
    async fn resolve(&self, query: &DnsQuery) -> Result<DnsResolution, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use emberdns_domain::RecordData;
    use std::net::Ipv4Addr;

    #[test]
    fn test_nodata_is_an_empty_record_set() {
        assert!(DnsResolution::new(vec![], false).is_nodata());

        let answered = DnsResolution::new(
            vec![emberdns_domain::ResourceRecord::new(
                "example.com",
                300,
                RecordData::A(Ipv4Addr::new(1, 2, 3, 4)),
            )],
            true,
        );
        assert!(!answered.is_nodata());
    }
}
