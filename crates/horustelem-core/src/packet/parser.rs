use std::collections::BTreeMap;

use crate::{DecodedPacket, FieldValue, checksum, fields, payloads};

use super::error::DecodeError;
use super::layout::{self, PacketFormat};
use super::reader::{RawScalar, unpack};

/// Decode one packet against the process-wide payload directory snapshot.
/// With no explicit format, the layout is resolved by the input length.
pub fn decode_packet(
    data: &[u8],
    format: Option<&'static PacketFormat>,
) -> Result<DecodedPacket, DecodeError> {
    let directory = payloads::PayloadDirectory::current();
    decode_packet_with(data, format, &directory)
}

/// Decode one packet against an explicit payload directory snapshot.
pub fn decode_packet_with(
    data: &[u8],
    format: Option<&'static PacketFormat>,
    directory: &payloads::PayloadDirectory,
) -> Result<DecodedPacket, DecodeError> {
    let format = match format {
        Some(format) => format,
        None => layout::lookup_by_length(data.len()).ok_or(DecodeError::UnknownFormat {
            length: data.len(),
        })?,
    };

    format.validate()?;

    if data.len() != format.length {
        return Err(DecodeError::LengthMismatch {
            name: format.name,
            expected: format.length,
            actual: data.len(),
        });
    }

    checksum::verify_packet(data, format.checksum)?;

    let scalars = unpack(data, format.slots)?;
    if scalars.len() != format.fields.len() {
        return Err(DecodeError::FieldCountMismatch {
            name: format.name,
            fields: format.fields.len(),
            scalars: scalars.len(),
        });
    }

    let mut payload_id: u32 = 0;
    let mut field_map = BTreeMap::new();
    let mut fragments: Vec<String> = Vec::with_capacity(format.fields.len());

    for (spec, raw) in format.fields.iter().zip(&scalars) {
        if spec.name == "checksum" {
            continue;
        }

        match spec.tag {
            fields::FieldType::Custom => {
                let RawScalar::Bytes(block) = *raw else {
                    return Err(DecodeError::WireMismatch {
                        field: spec.name.to_string(),
                        tag: spec.tag.as_str(),
                        wire: raw.kind(),
                    });
                };
                if let Some((values, text)) =
                    payloads::decode_custom(block, payload_id, directory)?
                {
                    for (name, value) in values {
                        field_map.insert(name, value);
                    }
                    fragments.push(text);
                }
            }
            fields::FieldType::PayloadId => {
                let (value, text) = fields::decode_field(spec.name, spec.tag, raw, directory)?;
                if let FieldValue::Int(id) = value {
                    payload_id = id as u32;
                }
                fragments.push(text);
            }
            _ => {
                let (value, text) = fields::decode_field(spec.name, spec.tag, raw, directory)?;
                field_map.insert(spec.name.to_string(), value);
                fragments.push(text);
            }
        }
    }

    let joined = fragments.join(",");
    let digest = checksum::sentence_checksum(&joined);
    let ukhas_str = format!("$${joined}*{digest}");

    Ok(DecodedPacket {
        packet_format: format.name.to_string(),
        crc_ok: true,
        payload_id,
        fields: field_map,
        ukhas_str,
    })
}
