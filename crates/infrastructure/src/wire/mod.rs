//! DNS wire format (RFC 1035 §4)
//!
//! Pure byte-level codec over a fixed 512-byte UDP payload. No I/O;
//! decoding never reads out of bounds, it fails with a typed [`WireError`].
mod buffer;
mod errors;
mod header;
mod message;
mod question;
mod record;

pub use buffer::{PacketBuffer, PACKET_SIZE};
pub use errors::WireError;
pub use header::{Header, HEADER_LEN};
pub use message::Message;
pub use question::Question;
