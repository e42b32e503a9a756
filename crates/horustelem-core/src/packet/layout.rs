use crate::checksum::ChecksumKind;
use crate::fields::FieldType;

use super::error::{DecodeError, NotationError};

/// Primitive wire encodings. All multi-byte scalars are little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    Bytes(usize),
}

impl WireType {
    pub const fn size(self) -> usize {
        match self {
            WireType::U8 | WireType::I8 => 1,
            WireType::U16 | WireType::I16 => 2,
            WireType::U32 | WireType::I32 | WireType::F32 => 4,
            WireType::Bytes(n) => n,
        }
    }
}

/// One named field and the semantic interpretation of its wire scalar.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub tag: FieldType,
}

/// Static definition of one binary packet layout. `slots` and `fields` are
/// declared independently and must stay positionally 1:1; `validate` and the
/// decode pipeline check this rather than assuming it.
#[derive(Debug)]
pub struct PacketFormat {
    pub name: &'static str,
    pub length: usize,
    pub slots: &'static [WireType],
    pub checksum: ChecksumKind,
    pub fields: &'static [FieldSpec],
}

impl PacketFormat {
    /// Byte span implied by the slot layout.
    pub fn slot_span(&self) -> usize {
        self.slots.iter().map(|slot| slot.size()).sum()
    }

    /// Structural checks run at decode time: declared length matches the
    /// slot span, and any custom field is preceded by a payload_id field
    /// (custom layouts are keyed by the payload id decoded earlier in the
    /// same packet).
    pub fn validate(&self) -> Result<(), DecodeError> {
        let computed = self.slot_span();
        if computed != self.length {
            return Err(DecodeError::MalformedFormat {
                name: self.name,
                declared: self.length,
                computed,
            });
        }

        let payload_id_at = self
            .fields
            .iter()
            .position(|spec| spec.tag == FieldType::PayloadId);
        for (index, spec) in self.fields.iter().enumerate() {
            if spec.tag == FieldType::Custom && payload_id_at.is_none_or(|at| at >= index) {
                return Err(DecodeError::CustomPrecedesPayloadId { name: self.name });
            }
        }
        Ok(())
    }
}

/// Horus Binary v1, struct notation `<BH3sffHBBbBH`.
pub static HORUS_BINARY_V1: PacketFormat = PacketFormat {
    name: "Horus Binary v1 22 Byte Format",
    length: 22,
    slots: &[
        WireType::U8,
        WireType::U16,
        WireType::Bytes(3),
        WireType::F32,
        WireType::F32,
        WireType::U16,
        WireType::U8,
        WireType::U8,
        WireType::I8,
        WireType::U8,
        WireType::U16,
    ],
    checksum: ChecksumKind::Crc16,
    fields: &[
        FieldSpec { name: "payload_id", tag: FieldType::PayloadId },
        FieldSpec { name: "sequence_number", tag: FieldType::None },
        FieldSpec { name: "time", tag: FieldType::TimeHms },
        FieldSpec { name: "latitude", tag: FieldType::DegreeFloat },
        FieldSpec { name: "longitude", tag: FieldType::DegreeFloat },
        FieldSpec { name: "altitude", tag: FieldType::None },
        FieldSpec { name: "speed", tag: FieldType::None },
        FieldSpec { name: "satellites", tag: FieldType::None },
        FieldSpec { name: "temperature", tag: FieldType::None },
        FieldSpec { name: "battery_voltage", tag: FieldType::Battery5vByte },
        FieldSpec { name: "checksum", tag: FieldType::None },
    ],
};

/// Horus Binary v2 16-byte, struct notation `<BBH3s3sHBBH`.
pub static HORUS_BINARY_V2_16BYTE: PacketFormat = PacketFormat {
    name: "Horus Binary v2 16 Byte Format",
    length: 16,
    slots: &[
        WireType::U8,
        WireType::U8,
        WireType::U16,
        WireType::Bytes(3),
        WireType::Bytes(3),
        WireType::U16,
        WireType::U8,
        WireType::U8,
        WireType::U16,
    ],
    checksum: ChecksumKind::Crc16,
    fields: &[
        FieldSpec { name: "payload_id", tag: FieldType::PayloadId },
        FieldSpec { name: "sequence_number", tag: FieldType::None },
        FieldSpec { name: "time", tag: FieldType::TimeBiseconds },
        FieldSpec { name: "latitude", tag: FieldType::DegreeFixed3 },
        FieldSpec { name: "longitude", tag: FieldType::DegreeFixed3 },
        FieldSpec { name: "altitude", tag: FieldType::None },
        FieldSpec { name: "battery_voltage", tag: FieldType::Battery5vByte },
        FieldSpec { name: "flags", tag: FieldType::None },
        FieldSpec { name: "checksum", tag: FieldType::None },
    ],
};

/// Horus Binary v2 32-byte, struct notation `<HH3sffHBBbB9sH`.
pub static HORUS_BINARY_V2_32BYTE: PacketFormat = PacketFormat {
    name: "Horus Binary v2 32 Byte Format",
    length: 32,
    slots: &[
        WireType::U16,
        WireType::U16,
        WireType::Bytes(3),
        WireType::F32,
        WireType::F32,
        WireType::U16,
        WireType::U8,
        WireType::U8,
        WireType::I8,
        WireType::U8,
        WireType::Bytes(9),
        WireType::U16,
    ],
    checksum: ChecksumKind::Crc16,
    fields: &[
        FieldSpec { name: "payload_id", tag: FieldType::PayloadId },
        FieldSpec { name: "sequence_number", tag: FieldType::None },
        FieldSpec { name: "time", tag: FieldType::TimeHms },
        FieldSpec { name: "latitude", tag: FieldType::DegreeFloat },
        FieldSpec { name: "longitude", tag: FieldType::DegreeFloat },
        FieldSpec { name: "altitude", tag: FieldType::None },
        FieldSpec { name: "speed", tag: FieldType::None },
        FieldSpec { name: "satellites", tag: FieldType::None },
        FieldSpec { name: "temperature", tag: FieldType::None },
        FieldSpec { name: "battery_voltage", tag: FieldType::Battery5vByte },
        FieldSpec { name: "custom", tag: FieldType::Custom },
        FieldSpec { name: "checksum", tag: FieldType::None },
    ],
};

static FORMATS: [&PacketFormat; 3] = [
    &HORUS_BINARY_V1,
    &HORUS_BINARY_V2_16BYTE,
    &HORUS_BINARY_V2_32BYTE,
];

/// Resolve a packet format by exact byte length. The length is the only
/// discriminator between layouts; no match means the input cannot be decoded.
pub fn lookup_by_length(length: usize) -> Option<&'static PacketFormat> {
    FORMATS.iter().copied().find(|format| format.length == length)
}

/// Largest accepted repeat count. No packet comes close; the bound also
/// keeps every layout's slot span far from usize overflow.
const MAX_REPEAT: usize = 4096;

/// Parse Python-struct-style layout notation (`<BbBfH`, `<H9s`) into wire
/// types. The `<` little-endian prefix is required; a repeat count before `s`
/// sizes the byte block, before any other code it repeats the code.
pub fn parse_struct_notation(notation: &str) -> Result<Vec<WireType>, NotationError> {
    let stripped = notation
        .strip_prefix('<')
        .ok_or_else(|| NotationError::MissingEndianPrefix {
            notation: notation.to_string(),
        })?;

    let mut slots = Vec::new();
    let mut count: Option<usize> = None;
    for code in stripped.chars() {
        if let Some(digit) = code.to_digit(10) {
            let next = count
                .unwrap_or(0)
                .checked_mul(10)
                .and_then(|n| n.checked_add(digit as usize))
                .filter(|&n| n <= MAX_REPEAT)
                .ok_or_else(|| NotationError::CountTooLarge {
                    notation: notation.to_string(),
                })?;
            count = Some(next);
            continue;
        }
        let repeat = count.take().unwrap_or(1);
        if code == 's' {
            slots.push(WireType::Bytes(repeat));
            continue;
        }
        let wire = match code {
            'B' => WireType::U8,
            'b' => WireType::I8,
            'H' => WireType::U16,
            'h' => WireType::I16,
            'I' => WireType::U32,
            'i' => WireType::I32,
            'f' => WireType::F32,
            _ => {
                return Err(NotationError::UnknownCode {
                    code,
                    notation: notation.to_string(),
                });
            }
        };
        for _ in 0..repeat {
            slots.push(wire);
        }
    }
    if count.is_some() {
        return Err(NotationError::DanglingCount {
            notation: notation.to_string(),
        });
    }
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_covers_registered_lengths() {
        assert_eq!(lookup_by_length(22).unwrap().name, HORUS_BINARY_V1.name);
        assert_eq!(
            lookup_by_length(16).unwrap().name,
            HORUS_BINARY_V2_16BYTE.name
        );
        assert_eq!(
            lookup_by_length(32).unwrap().name,
            HORUS_BINARY_V2_32BYTE.name
        );
        assert!(lookup_by_length(23).is_none());
        assert!(lookup_by_length(0).is_none());
    }

    #[test]
    fn registered_formats_validate() {
        for format in [
            &HORUS_BINARY_V1,
            &HORUS_BINARY_V2_16BYTE,
            &HORUS_BINARY_V2_32BYTE,
        ] {
            format.validate().expect(format.name);
            assert_eq!(format.slots.len(), format.fields.len());
        }
    }

    #[test]
    fn validate_rejects_length_drift() {
        static BAD: PacketFormat = PacketFormat {
            name: "bad length",
            length: 5,
            slots: &[WireType::U16, WireType::U16],
            checksum: ChecksumKind::Crc16,
            fields: &[
                FieldSpec { name: "a", tag: FieldType::None },
                FieldSpec { name: "b", tag: FieldType::None },
            ],
        };
        let err = BAD.validate().unwrap_err();
        assert!(err.to_string().contains("declared length 5"));
    }

    #[test]
    fn validate_rejects_custom_before_payload_id() {
        static BAD: PacketFormat = PacketFormat {
            name: "custom first",
            length: 4,
            slots: &[WireType::Bytes(2), WireType::U16],
            checksum: ChecksumKind::Crc16,
            fields: &[
                FieldSpec { name: "custom", tag: FieldType::Custom },
                FieldSpec { name: "payload_id", tag: FieldType::PayloadId },
            ],
        };
        let err = BAD.validate().unwrap_err();
        assert!(err.to_string().contains("custom field declared before"));
    }

    #[test]
    fn struct_notation_round_trips_known_layouts() {
        assert_eq!(
            parse_struct_notation("<BH3sffHBBbBH").unwrap(),
            HORUS_BINARY_V1.slots
        );
        assert_eq!(
            parse_struct_notation("<BBH3s3sHBBH").unwrap(),
            HORUS_BINARY_V2_16BYTE.slots
        );
        assert_eq!(
            parse_struct_notation("<HH3sffHBBbB9sH").unwrap(),
            HORUS_BINARY_V2_32BYTE.slots
        );
    }

    #[test]
    fn struct_notation_repeat_counts() {
        assert_eq!(
            parse_struct_notation("<3B").unwrap(),
            vec![WireType::U8, WireType::U8, WireType::U8]
        );
        assert_eq!(parse_struct_notation("<12s").unwrap(), vec![WireType::Bytes(12)]);
    }

    #[test]
    fn struct_notation_errors() {
        assert!(matches!(
            parse_struct_notation("BbB"),
            Err(NotationError::MissingEndianPrefix { .. })
        ));
        assert!(matches!(
            parse_struct_notation("<Bq"),
            Err(NotationError::UnknownCode { code: 'q', .. })
        ));
        assert!(matches!(
            parse_struct_notation("<B3"),
            Err(NotationError::DanglingCount { .. })
        ));
    }

    #[test]
    fn struct_notation_rejects_huge_counts() {
        // Counts that would overflow the accumulator.
        assert!(matches!(
            parse_struct_notation("<99999999999999999999s"),
            Err(NotationError::CountTooLarge { .. })
        ));
        // Counts that fit in usize but exceed the accepted bound.
        assert!(matches!(
            parse_struct_notation("<4097B"),
            Err(NotationError::CountTooLarge { .. })
        ));
        assert_eq!(
            parse_struct_notation("<4096s").unwrap(),
            vec![WireType::Bytes(4096)]
        );
    }
}
