use super::{PacketBuffer, WireError};
use emberdns_domain::{RecordData, ResourceRecord};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

pub fn read_record(buffer: &mut PacketBuffer) -> Result<ResourceRecord, WireError> {
    let name: Arc<str> = Arc::from(buffer.read_name()?);
    let type_code = buffer.read_u16()?;
    let class = buffer.read_u16()?;
    let ttl = buffer.read_u32()?;
    let rdata_len = usize::from(buffer.read_u16()?);
    let rdata_end = buffer.pos() + rdata_len;

    let data = match type_code {
        1 => {
            let raw = buffer.read_u32()?;
            RecordData::A(Ipv4Addr::from(raw))
        }
        2 => RecordData::Ns(buffer.read_name()?),
        5 => RecordData::Cname(buffer.read_name()?),
        6 => RecordData::Soa {
            mname: buffer.read_name()?,
            rname: buffer.read_name()?,
            serial: buffer.read_u32()?,
            refresh: buffer.read_u32()?,
            retry: buffer.read_u32()?,
            expire: buffer.read_u32()?,
            minimum: buffer.read_u32()?,
        },
        15 => RecordData::Mx {
            preference: buffer.read_u16()?,
            exchange: buffer.read_name()?,
        },
        16 => {
            // TXT rdata is a sequence of <len, bytes> character strings.
            let mut text = String::new();
            while buffer.pos() < rdata_end {
                let len = usize::from(buffer.read_u8()?);
                let chunk = buffer.read_bytes(len)?;
                text.push_str(&String::from_utf8_lossy(&chunk));
            }
            RecordData::Txt(text)
        }
        28 => {
            let mut octets = [0u8; 16];
            for octet in &mut octets {
                *octet = buffer.read_u8()?;
            }
            RecordData::Aaaa(Ipv6Addr::from(octets))
        }
        _ => RecordData::Unknown {
            type_code,
            rdata: buffer.read_bytes(rdata_len)?,
        },
    };

    // A parse that ran past the declared length has consumed bytes of the
    // next record; the message is unusable from here on.
    if buffer.pos() > rdata_end {
        return Err(WireError::RdataOverrun);
    }

    // Skip any rdata a lenient upstream appended beyond what we parsed.
    if buffer.pos() < rdata_end {
        buffer.seek(rdata_end);
    }

    Ok(ResourceRecord {
        name,
        class,
        ttl,
        data,
    })
}

pub fn write_record(buffer: &mut PacketBuffer, record: &ResourceRecord) -> Result<(), WireError> {
    buffer.write_name(&record.name)?;
    buffer.write_u16(record.data.type_code())?;
    buffer.write_u16(record.class)?;
    buffer.write_u32(record.ttl)?;

    // Reserve the rdata length field, patch it once the payload is known.
    let len_pos = buffer.pos();
    buffer.write_u16(0)?;
    let rdata_start = buffer.pos();

    match &record.data {
        RecordData::A(addr) => buffer.write_u32(u32::from(*addr))?,
        RecordData::Aaaa(addr) => buffer.write_bytes(&addr.octets())?,
        RecordData::Ns(host) => buffer.write_name(host)?,
        RecordData::Cname(target) => buffer.write_name(target)?,
        RecordData::Mx {
            preference,
            exchange,
        } => {
            buffer.write_u16(*preference)?;
            buffer.write_name(exchange)?;
        }
        RecordData::Txt(text) => {
            // Split into 255-byte character strings.
            for chunk in text.as_bytes().chunks(255) {
                buffer.write_u8(chunk.len() as u8)?;
                buffer.write_bytes(chunk)?;
            }
            if text.is_empty() {
                buffer.write_u8(0)?;
            }
        }
        RecordData::Soa {
            mname,
            rname,
            serial,
            refresh,
            retry,
            expire,
            minimum,
        } => {
            buffer.write_name(mname)?;
            buffer.write_name(rname)?;
            buffer.write_u32(*serial)?;
            buffer.write_u32(*refresh)?;
            buffer.write_u32(*retry)?;
            buffer.write_u32(*expire)?;
            buffer.write_u32(*minimum)?;
        }
        RecordData::Unknown { rdata, .. } => buffer.write_bytes(rdata)?,
    }

    let rdata_len = buffer.pos() - rdata_start;
    buffer.set_u16(len_pos, rdata_len as u16)
}
