mod record;
mod record_type;

pub use record::{min_ttl, RecordData, ResourceRecord};
pub use record_type::RecordType;
