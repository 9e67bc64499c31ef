use super::{PacketBuffer, WireError};
use emberdns_domain::RecordType;

/// Question section entry. `qtype` stays a raw code so a question for a
/// type we do not serve can still be echoed back in a NOTIMP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub name: String,
    pub qtype: u16,
    pub qclass: u16,
}

impl Question {
    pub fn new(name: impl Into<String>, record_type: RecordType) -> Self {
        Self {
            name: name.into(),
            qtype: record_type.to_u16(),
            qclass: 1, // IN
        }
    }

    pub fn record_type(&self) -> Option<RecordType> {
        RecordType::from_u16(self.qtype)
    }

    pub fn read(buffer: &mut PacketBuffer) -> Result<Self, WireError> {
        let name = buffer.read_name()?;
        let qtype = buffer.read_u16()?;
        let qclass = buffer.read_u16()?;
        Ok(Self {
            name,
            qtype,
            qclass,
        })
    }

    pub fn write(&self, buffer: &mut PacketBuffer) -> Result<(), WireError> {
        buffer.write_name(&self.name)?;
        buffer.write_u16(self.qtype)?;
        buffer.write_u16(self.qclass)
    }
}
