//! Semantic field decoding.
//!
//! Each field in a packet layout carries a semantic type tag describing how
//! its raw wire scalar becomes a typed value and a canonical text fragment
//! for the UKHAS sentence. Transforms are deterministic; float text comes
//! from f64 arithmetic so the rendered digits are stable.

use std::str::FromStr;

use crate::FieldValue;
use crate::packet::error::DecodeError;
use crate::packet::reader::RawScalar;
use crate::payloads::PayloadDirectory;

/// Closed set of semantic field type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Passthrough: the raw scalar, rendered as-is.
    None,
    /// Integer payload identifier, rendered as the payload's callsign when
    /// the directory knows it.
    PayloadId,
    /// Three packed bytes `[hours, minutes, seconds]`, rendered `HH:MM:SS`
    /// without range validation.
    TimeHms,
    /// Count of 2-second ticks since midnight, rendered `HH:MM:SS`.
    TimeBiseconds,
    /// 32-bit float degrees, rendered with five decimal places.
    DegreeFloat,
    /// Signed 24-bit fixed-point degrees, scale 1/10000.
    DegreeFixed3,
    /// Single byte on a linear 0-5 V scale.
    Battery5vByte,
    /// Payload-specific byte block; decoded by the custom field registry,
    /// never by `decode_field`.
    Custom,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::None => "none",
            FieldType::PayloadId => "payload_id",
            FieldType::TimeHms => "time_hms",
            FieldType::TimeBiseconds => "time_biseconds",
            FieldType::DegreeFloat => "degree_float",
            FieldType::DegreeFixed3 => "degree_fixed3",
            FieldType::Battery5vByte => "battery_5v_byte",
            FieldType::Custom => "custom",
        }
    }
}

impl FromStr for FieldType {
    type Err = DecodeError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Ok(match tag {
            "none" => FieldType::None,
            "payload_id" => FieldType::PayloadId,
            "time_hms" => FieldType::TimeHms,
            "time_biseconds" => FieldType::TimeBiseconds,
            "degree_float" => FieldType::DegreeFloat,
            "degree_fixed3" => FieldType::DegreeFixed3,
            "battery_5v_byte" => FieldType::Battery5vByte,
            "custom" => FieldType::Custom,
            _ => {
                return Err(DecodeError::UnknownFieldType {
                    tag: tag.to_string(),
                });
            }
        })
    }
}

fn mismatch(name: &str, tag: FieldType, raw: &RawScalar<'_>) -> DecodeError {
    DecodeError::WireMismatch {
        field: name.to_string(),
        tag: tag.as_str(),
        wire: raw.kind(),
    }
}

fn hms(seconds: u32) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Decode one raw scalar under a semantic tag into its typed value and
/// canonical text fragment.
pub fn decode_field(
    name: &str,
    tag: FieldType,
    raw: &RawScalar<'_>,
    directory: &PayloadDirectory,
) -> Result<(FieldValue, String), DecodeError> {
    match tag {
        FieldType::None => Ok(match *raw {
            RawScalar::Unsigned(value) => {
                (FieldValue::Int(value as i64), value.to_string())
            }
            RawScalar::Signed(value) => (FieldValue::Int(value as i64), value.to_string()),
            RawScalar::Float(value) => {
                let wide = value as f64;
                (FieldValue::Float(wide), format!("{wide:?}"))
            }
            RawScalar::Bytes(bytes) => {
                let text = hex::encode(bytes);
                (FieldValue::Text(text.clone()), text)
            }
        }),
        FieldType::PayloadId => match *raw {
            RawScalar::Unsigned(id) => {
                let text = match directory.name(id) {
                    Some(callsign) => callsign.to_string(),
                    None => id.to_string(),
                };
                Ok((FieldValue::Int(id as i64), text))
            }
            _ => Err(mismatch(name, tag, raw)),
        },
        FieldType::TimeHms => match *raw {
            RawScalar::Bytes(bytes) if bytes.len() == 3 => {
                let text = format!("{:02}:{:02}:{:02}", bytes[0], bytes[1], bytes[2]);
                Ok((FieldValue::Text(text.clone()), text))
            }
            _ => Err(mismatch(name, tag, raw)),
        },
        FieldType::TimeBiseconds => match *raw {
            RawScalar::Unsigned(ticks) => {
                let text = hms(ticks * 2 % 86_400);
                Ok((FieldValue::Text(text.clone()), text))
            }
            _ => Err(mismatch(name, tag, raw)),
        },
        FieldType::DegreeFloat => match *raw {
            RawScalar::Float(value) => {
                let wide = value as f64;
                Ok((FieldValue::Float(wide), format!("{wide:.5}")))
            }
            _ => Err(mismatch(name, tag, raw)),
        },
        FieldType::DegreeFixed3 => match *raw {
            RawScalar::Bytes(bytes) if bytes.len() == 3 => {
                let raw24 =
                    (bytes[0] as i32) | ((bytes[1] as i32) << 8) | ((bytes[2] as i8 as i32) << 16);
                let degrees = raw24 as f64 * 1e-4;
                Ok((FieldValue::Float(degrees), format!("{degrees:.5}")))
            }
            _ => Err(mismatch(name, tag, raw)),
        },
        FieldType::Battery5vByte => match *raw {
            RawScalar::Unsigned(code) => {
                let volts = 5.0 * code as f64 / 255.0;
                Ok((FieldValue::Float(volts), format!("{volts:.2}")))
            }
            _ => Err(mismatch(name, tag, raw)),
        },
        // Custom blocks go through the custom field registry; reaching here
        // means a layout used the tag for a plain scalar.
        FieldType::Custom => Err(DecodeError::UnknownFieldType {
            tag: FieldType::Custom.as_str().to_string(),
        }),
    }
}
