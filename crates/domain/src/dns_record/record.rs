use super::RecordType;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

/// Type-specific payload of a resource record. Closed variant so the codec
/// and the resolution engine can match exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Ns(String),
    Cname(String),
    Mx {
        preference: u16,
        exchange: String,
    },
    Txt(String),
    Soa {
        mname: String,
        rname: String,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    },
    /// Raw rdata of a type we do not interpret, carried through verbatim.
    Unknown {
        type_code: u16,
        rdata: Vec<u8>,
    },
}

impl RecordData {
    pub fn type_code(&self) -> u16 {
        match self {
            RecordData::A(_) => 1,
            RecordData::Ns(_) => 2,
            RecordData::Cname(_) => 5,
            RecordData::Soa { .. } => 6,
            RecordData::Mx { .. } => 15,
            RecordData::Txt(_) => 16,
            RecordData::Aaaa(_) => 28,
            RecordData::Unknown { type_code, .. } => *type_code,
        }
    }

    pub fn record_type(&self) -> Option<RecordType> {
        RecordType::from_u16(self.type_code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub name: Arc<str>,
    pub class: u16,
    pub ttl: u32,
    pub data: RecordData,
}

impl ResourceRecord {
    pub fn new(name: impl Into<Arc<str>>, ttl: u32, data: RecordData) -> Self {
        Self {
            name: name.into(),
            class: 1, // IN
            ttl,
            data,
        }
    }

    pub fn is_cname(&self) -> bool {
        matches!(self.data, RecordData::Cname(_))
    }

    pub fn cname_target(&self) -> Option<&str> {
        match &self.data {
            RecordData::Cname(target) => Some(target),
            _ => None,
        }
    }

    /// Whether this record answers a question of `qtype`.
    pub fn answers(&self, qtype: RecordType) -> bool {
        self.data.record_type() == Some(qtype)
    }
}

/// Minimum TTL across a record set, the value a cache entry lives for.
pub fn min_ttl(records: &[ResourceRecord]) -> Option<u32> {
    records.iter().map(|r| r.ttl).min()
}
