//! Horus Binary telemetry decoding core.
//!
//! This crate implements the decoding pipeline used by the CLI: a static
//! registry of fixed binary packet layouts, a validation chain (layout
//! selection by length, structural checks, CRC verification), per-field
//! semantic decoding, and payload-specific custom-field extraction. Decoding
//! is byte-oriented and side-effect free; the only shared state is the
//! payload directory, an atomically swappable snapshot of the external
//! payload-name and custom-field tables.
//!
//! Invariants:
//! - A decode call either returns a complete record or a typed error; no
//!   partial output escapes.
//! - Every decode observes exactly one payload-directory snapshot.
//! - The UKHAS sentence is byte-for-byte the conventional ground-station
//!   format: `$$` + comma-joined fields + `*` + CRC16 digest.
//!
//! Version française (résumé):
//! Cette crate fournit le cœur de décodage Horus Binary : registre statique
//! de formats -> validation (longueur, structure, CRC) -> décodage sémantique
//! des champs -> champs personnalisés par charge utile. Le décodage est pur ;
//! l'annuaire des charges utiles est un instantané échangeable atomiquement.
//!
//! # Examples
//! ```
//! use horustelem_core::{decode_packet, hex_to_bytes};
//!
//! let bytes = hex_to_bytes("01120200 02BCEB 214152 1000 FF 00 E17E")?;
//! let packet = decode_packet(&bytes, None)?;
//! assert!(packet.crc_ok);
//! assert!(packet.ukhas_str.starts_with("$$"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

mod checksum;
mod fields;
mod hex;
mod packet;
mod payloads;

pub use checksum::{ChecksumKind, crc16_ccitt_false, sentence_checksum, verify_packet};
pub use fields::{FieldType, decode_field};
pub use self::hex::{HexError, hex_to_bytes};
pub use packet::error::{DecodeError, NotationError};
pub use packet::layout::{
    FieldSpec, PacketFormat, WireType, lookup_by_length, parse_struct_notation,
};
pub use packet::parser::{decode_packet, decode_packet_with};
pub use packet::reader::RawScalar;
pub use payloads::{CustomField, CustomLayout, PayloadDirectory, TableError, decode_custom};

/// One decoded semantic field value.
///
/// Serializes untagged so the JSON record mirrors the flat dictionary the
/// downstream tooling expects: numbers stay numbers, everything textual
/// (times, hex blobs) stays a string.
///
/// # Examples
/// ```
/// use horustelem_core::FieldValue;
///
/// let value = FieldValue::Float(3.02);
/// assert_eq!(serde_json::to_string(&value).unwrap(), "3.02");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Integer wire scalars (sequence numbers, altitude, flags, ...).
    Int(i64),
    /// Floating scalars, widened to f64 (degrees, volts).
    Float(f64),
    /// Textual values (packed times, raw byte blocks as lowercase hex).
    Text(String),
}

/// One fully decoded telemetry packet.
///
/// Constructed fresh per decode call and never mutated after return. The
/// per-field map is flattened into the JSON object, so the serialized record
/// is a single flat dictionary.
///
/// # Examples
/// ```
/// use horustelem_core::{decode_packet, hex_to_bytes};
///
/// let bytes = hex_to_bytes("0112000000230000000000000000000000001C9A9545")?;
/// let packet = decode_packet(&bytes, None)?;
/// assert_eq!(packet.packet_format, "Horus Binary v1 22 Byte Format");
/// assert_eq!(packet.payload_id, 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedPacket {
    /// Display name of the matched packet format.
    pub packet_format: String,
    /// Always true on a returned record; CRC failure aborts the decode.
    pub crc_ok: bool,
    /// Numeric payload identifier; 0 until decoded.
    pub payload_id: u32,
    /// Decoded field values keyed by declared field name.
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
    /// Assembled UKHAS sentence: `$$` + fields + `*` + digest.
    pub ukhas_str: String,
}
