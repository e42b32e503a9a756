//! Checksum algorithms for the binary and text layers.
//!
//! Both layers use CRC16-CCITT-FALSE (poly 0x1021, init 0xFFFF): the binary
//! layer carries it as a trailing little-endian u16, the UKHAS text layer as
//! four uppercase hex digits after the `*` separator.

use crate::packet::error::DecodeError;

/// Named checksum algorithm carried by a packet format descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumKind {
    Crc16,
}

/// CRC16-CCITT-FALSE over a byte slice.
pub fn crc16_ccitt_false(bytes: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &b in bytes {
        crc ^= (b as u16) << 8;
        for _ in 0..8 {
            if (crc & 0x8000) != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// Verify the trailing binary checksum of a whole packet.
pub fn verify_packet(data: &[u8], kind: ChecksumKind) -> Result<(), DecodeError> {
    match kind {
        ChecksumKind::Crc16 => {
            if data.len() < 2 {
                return Err(DecodeError::Truncated {
                    needed: 2,
                    actual: data.len(),
                });
            }
            let (body, tail) = data.split_at(data.len() - 2);
            let computed = crc16_ccitt_false(body);
            let expected = u16::from_le_bytes([tail[0], tail[1]]);
            if computed != expected {
                return Err(DecodeError::ChecksumFailure { computed, expected });
            }
            Ok(())
        }
    }
}

/// UKHAS sentence digest: four uppercase hex digits over the sentence body
/// (the text between `$$` and `*`).
pub fn sentence_checksum(text: &str) -> String {
    format!("{:04X}", crc16_ccitt_false(text.as_bytes()))
}
