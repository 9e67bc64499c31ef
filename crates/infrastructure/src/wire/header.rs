use super::{PacketBuffer, WireError};
use emberdns_domain::ResponseCode;

/// 12-byte DNS message header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub id: u16,

    pub response: bool,
    pub opcode: u8,
    pub authoritative_answer: bool,
    pub truncated: bool,
    pub recursion_desired: bool,

    pub recursion_available: bool,
    pub z: bool,
    pub authed_data: bool,
    pub checking_disabled: bool,
    pub rcode: ResponseCode,

    pub question_count: u16,
    pub answer_count: u16,
    pub authority_count: u16,
    pub additional_count: u16,
}

pub const HEADER_LEN: usize = 12;

// Absolute offsets of the section counts, patched after truncation.
pub const ANSWER_COUNT_OFFSET: usize = 6;
pub const AUTHORITY_COUNT_OFFSET: usize = 8;
pub const ADDITIONAL_COUNT_OFFSET: usize = 10;
pub const FLAGS_OFFSET: usize = 2;

impl Header {
    pub fn read(buffer: &mut PacketBuffer) -> Result<Self, WireError> {
        let id = buffer.read_u16().map_err(|_| WireError::TruncatedHeader)?;
        let flags = buffer.read_u16().map_err(|_| WireError::TruncatedHeader)?;

        let a = (flags >> 8) as u8;
        let b = (flags & 0xFF) as u8;

        let header = Self {
            id,

            response: (a & (1 << 7)) > 0,
            opcode: (a >> 3) & 0x0F,
            authoritative_answer: (a & (1 << 2)) > 0,
            truncated: (a & (1 << 1)) > 0,
            recursion_desired: (a & 1) > 0,

            recursion_available: (b & (1 << 7)) > 0,
            z: (b & (1 << 6)) > 0,
            authed_data: (b & (1 << 5)) > 0,
            checking_disabled: (b & (1 << 4)) > 0,
            rcode: ResponseCode::from_u8(b & 0x0F),

            question_count: buffer.read_u16().map_err(|_| WireError::TruncatedHeader)?,
            answer_count: buffer.read_u16().map_err(|_| WireError::TruncatedHeader)?,
            authority_count: buffer.read_u16().map_err(|_| WireError::TruncatedHeader)?,
            additional_count: buffer.read_u16().map_err(|_| WireError::TruncatedHeader)?,
        };

        Ok(header)
    }

    pub fn write(&self, buffer: &mut PacketBuffer) -> Result<(), WireError> {
        buffer.write_u16(self.id)?;

        buffer.write_u8(
            (u8::from(self.recursion_desired))
                | (u8::from(self.truncated) << 1)
                | (u8::from(self.authoritative_answer) << 2)
                | (self.opcode << 3)
                | (u8::from(self.response) << 7),
        )?;

        buffer.write_u8(
            self.rcode.to_u8()
                | (u8::from(self.checking_disabled) << 4)
                | (u8::from(self.authed_data) << 5)
                | (u8::from(self.z) << 6)
                | (u8::from(self.recursion_available) << 7),
        )?;

        buffer.write_u16(self.question_count)?;
        buffer.write_u16(self.answer_count)?;
        buffer.write_u16(self.authority_count)?;
        buffer.write_u16(self.additional_count)
    }
}
