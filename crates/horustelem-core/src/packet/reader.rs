use super::error::DecodeError;
use super::layout::WireType;

/// One raw scalar lifted off the wire, before semantic decoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawScalar<'a> {
    Unsigned(u32),
    Signed(i32),
    Float(f32),
    Bytes(&'a [u8]),
}

impl RawScalar<'_> {
    /// Short kind name used in mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            RawScalar::Unsigned(_) => "unsigned",
            RawScalar::Signed(_) => "signed",
            RawScalar::Float(_) => "float",
            RawScalar::Bytes(_) => "bytes",
        }
    }
}

/// Cursor over one packet's bytes. All reads are little-endian.
pub struct PacketReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PacketReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.pos + len;
        let slice = self
            .data
            .get(self.pos..end)
            .ok_or(DecodeError::Truncated {
                needed: end,
                actual: self.data.len(),
            })?;
        self.pos = end;
        Ok(slice)
    }

    pub fn read(&mut self, wire: WireType) -> Result<RawScalar<'a>, DecodeError> {
        let bytes = self.take(wire.size())?;
        Ok(match wire {
            WireType::U8 => RawScalar::Unsigned(bytes[0] as u32),
            WireType::I8 => RawScalar::Signed(bytes[0] as i8 as i32),
            WireType::U16 => RawScalar::Unsigned(u16::from_le_bytes([bytes[0], bytes[1]]) as u32),
            WireType::I16 => RawScalar::Signed(i16::from_le_bytes([bytes[0], bytes[1]]) as i32),
            WireType::U32 => {
                RawScalar::Unsigned(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            WireType::I32 => {
                RawScalar::Signed(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            WireType::F32 => {
                RawScalar::Float(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            WireType::Bytes(_) => RawScalar::Bytes(bytes),
        })
    }
}

/// Unpack a byte block slot-by-slot into raw scalars.
pub fn unpack<'a>(data: &'a [u8], slots: &[WireType]) -> Result<Vec<RawScalar<'a>>, DecodeError> {
    let mut reader = PacketReader::new(data);
    slots.iter().map(|&slot| reader.read(slot)).collect()
}
