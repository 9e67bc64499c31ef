use super::WireError;

/// Fixed UDP DNS payload size without EDNS(0).
pub const PACKET_SIZE: usize = 512;

const MAX_LABEL_LEN: usize = 63;
const MAX_NAME_LEN: usize = 255;
const MAX_JUMPS: usize = 5;

/// Cursor over a single DNS packet. All reads are bounds-checked; name
/// reads follow compression pointers with a jump limit so a pointer loop
/// cannot hang decoding.
pub struct PacketBuffer {
    pub buf: [u8; PACKET_SIZE],
    pos: usize,
}

impl Default for PacketBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketBuffer {
    pub fn new() -> Self {
        Self {
            buf: [0; PACKET_SIZE],
            pos: 0,
        }
    }

    /// Copies an inbound datagram into a fresh buffer. Oversized datagrams
    /// are rejected rather than silently truncated.
    pub fn from_bytes(data: &[u8]) -> Result<Self, WireError> {
        if data.len() > PACKET_SIZE {
            return Err(WireError::EndOfBuffer(data.len()));
        }
        let mut buffer = Self::new();
        buffer.buf[..data.len()].copy_from_slice(data);
        Ok(buffer)
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn step(&mut self, steps: usize) -> Result<(), WireError> {
        if self.pos + steps > PACKET_SIZE {
            return Err(WireError::EndOfBuffer(self.pos + steps));
        }
        self.pos += steps;
        Ok(())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.pos]
    }

    fn get(&self, pos: usize) -> Result<u8, WireError> {
        if pos >= PACKET_SIZE {
            return Err(WireError::EndOfBuffer(pos));
        }
        Ok(self.buf[pos])
    }

    fn get_range(&self, start: usize, len: usize) -> Result<&[u8], WireError> {
        if start + len > PACKET_SIZE {
            return Err(WireError::EndOfBuffer(start + len));
        }
        Ok(&self.buf[start..start + len])
    }

    pub fn read_u8(&mut self) -> Result<u8, WireError> {
        let value = self.get(self.pos)?;
        self.pos += 1;
        Ok(value)
    }

    pub fn read_u16(&mut self) -> Result<u16, WireError> {
        let high = self.read_u8()?;
        let low = self.read_u8()?;
        Ok(u16::from_be_bytes([high, low]))
    }

    pub fn read_u32(&mut self) -> Result<u32, WireError> {
        let high = self.read_u16()?;
        let low = self.read_u16()?;
        Ok((u32::from(high) << 16) | u32::from(low))
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, WireError> {
        let bytes = self.get_range(self.pos, len)?.to_vec();
        self.pos += len;
        Ok(bytes)
    }

    /// Reads a possibly-compressed qname into dotted form.
    pub fn read_name(&mut self) -> Result<String, WireError> {
        let mut pos = self.pos;
        let mut jumped = false;
        let mut jumps = 0;

        let mut name = String::new();
        let mut delim = "";

        loop {
            if jumps > MAX_JUMPS {
                return Err(WireError::TooManyJumps);
            }

            let len = self.get(pos)?;

            // Two MSBs set: compression pointer to an earlier offset.
            if (len & 0xC0) == 0xC0 {
                if !jumped {
                    self.seek(pos + 2);
                }

                let next = self.get(pos + 1)?;
                pos = ((usize::from(len) ^ 0xC0) << 8) | usize::from(next);

                jumped = true;
                jumps += 1;
                continue;
            }

            pos += 1;
            if len == 0 {
                break;
            }

            name.push_str(delim);
            let label = self.get_range(pos, usize::from(len))?;
            name.push_str(&String::from_utf8_lossy(label));
            if name.len() > MAX_NAME_LEN {
                return Err(WireError::NameTooLong);
            }

            delim = ".";
            pos += usize::from(len);
        }

        if !jumped {
            self.seek(pos);
        }

        Ok(name)
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), WireError> {
        if self.pos >= PACKET_SIZE {
            return Err(WireError::EndOfBuffer(self.pos));
        }
        self.buf[self.pos] = value;
        self.pos += 1;
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<(), WireError> {
        let [high, low] = value.to_be_bytes();
        self.write_u8(high)?;
        self.write_u8(low)
    }

    pub fn write_u32(&mut self, value: u32) -> Result<(), WireError> {
        self.write_u16((value >> 16) as u16)?;
        self.write_u16((value & 0xFFFF) as u16)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), WireError> {
        for &b in bytes {
            self.write_u8(b)?;
        }
        Ok(())
    }

    /// Writes a qname as uncompressed labels plus the root terminator.
    pub fn write_name(&mut self, name: &str) -> Result<(), WireError> {
        for label in name.split('.').filter(|l| !l.is_empty()) {
            if label.len() > MAX_LABEL_LEN {
                return Err(WireError::LabelTooLong);
            }
            self.write_u8(label.len() as u8)?;
            self.write_bytes(label.as_bytes())?;
        }
        self.write_u8(0)
    }

    /// Patches a u16 at an absolute offset (used for header counts).
    pub fn set_u16(&mut self, pos: usize, value: u16) -> Result<(), WireError> {
        if pos + 1 >= PACKET_SIZE {
            return Err(WireError::EndOfBuffer(pos + 1));
        }
        let [high, low] = value.to_be_bytes();
        self.buf[pos] = high;
        self.buf[pos + 1] = low;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u16_u32_round_trip() {
        let mut buffer = PacketBuffer::new();
        buffer.write_u16(0xBEEF).unwrap();
        buffer.write_u32(0xDEADBEEF).unwrap();

        buffer.seek(0);
        assert_eq!(buffer.read_u16().unwrap(), 0xBEEF);
        assert_eq!(buffer.read_u32().unwrap(), 0xDEADBEEF);
    }

    #[test]
    fn test_name_round_trip() {
        let mut buffer = PacketBuffer::new();
        buffer.write_name("www.example.com").unwrap();

        buffer.seek(0);
        assert_eq!(buffer.read_name().unwrap(), "www.example.com");
    }

    #[test]
    fn test_root_name() {
        let mut buffer = PacketBuffer::new();
        buffer.write_name("").unwrap();
        assert_eq!(buffer.pos(), 1);

        buffer.seek(0);
        assert_eq!(buffer.read_name().unwrap(), "");
    }

    #[test]
    fn test_compressed_name() {
        let mut buffer = PacketBuffer::new();
        buffer.write_name("example.com").unwrap();
        // "www" + pointer back to offset 0
        let ptr_pos = buffer.pos();
        buffer.write_u8(3).unwrap();
        buffer.write_bytes(b"www").unwrap();
        buffer.write_u16(0xC000).unwrap();

        buffer.seek(ptr_pos);
        assert_eq!(buffer.read_name().unwrap(), "www.example.com");
        // cursor lands right after the pointer
        assert_eq!(buffer.pos(), ptr_pos + 6);
    }

    #[test]
    fn test_pointer_loop_is_rejected() {
        let mut buffer = PacketBuffer::new();
        // pointer at offset 0 pointing to itself
        buffer.write_u16(0xC000).unwrap();

        buffer.seek(0);
        assert_eq!(buffer.read_name(), Err(WireError::TooManyJumps));
    }

    #[test]
    fn test_label_longer_than_63_is_rejected() {
        let mut buffer = PacketBuffer::new();
        let long = "a".repeat(64);
        assert_eq!(buffer.write_name(&long), Err(WireError::LabelTooLong));
    }

    #[test]
    fn test_reads_never_cross_packet_end() {
        let mut buffer = PacketBuffer::new();
        buffer.seek(PACKET_SIZE - 1);
        assert!(buffer.read_u16().is_err());

        buffer.seek(PACKET_SIZE);
        assert!(buffer.read_u8().is_err());
    }

    #[test]
    fn test_oversized_datagram_rejected() {
        let data = vec![0u8; PACKET_SIZE + 1];
        assert!(PacketBuffer::from_bytes(&data).is_err());
    }
}
