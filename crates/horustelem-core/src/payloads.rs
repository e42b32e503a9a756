//! Payload directory: the refreshable name and custom-field tables.
//!
//! Both external tables live in one immutable `PayloadDirectory` snapshot.
//! The process-wide current snapshot sits behind an `ArcSwap`: decodes load
//! it once per call, refreshes build a replacement directory and store it
//! atomically. An in-flight decode keeps the snapshot it loaded, so a refresh
//! never tears or blocks a decode.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use serde::Deserialize;
use thiserror::Error;

use crate::FieldValue;
use crate::fields::{FieldType, decode_field};
use crate::packet::error::{DecodeError, NotationError};
use crate::packet::layout::{WireType, parse_struct_notation};
use crate::packet::reader::unpack;

/// Errors refreshing the directory from external table data. A failed
/// refresh leaves the previous snapshot in place.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("custom field table is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Notation(#[from] NotationError),
    #[error("layout for {key:?}: {fields} fields but layout has {slots} slots")]
    CountMismatch {
        key: String,
        fields: usize,
        slots: usize,
    },
    #[error("layout for {key:?}: custom fields cannot nest")]
    NestedCustom { key: String },
    #[error("layout for {key:?}: {source}")]
    Field { key: String, source: DecodeError },
}

/// One field of a payload-specific custom layout.
#[derive(Debug, Clone)]
pub struct CustomField {
    pub name: String,
    pub tag: FieldType,
}

/// Payload-specific structure of the embedded custom byte block.
#[derive(Debug, Clone)]
pub struct CustomLayout {
    pub slots: Vec<WireType>,
    pub fields: Vec<CustomField>,
}

impl CustomLayout {
    pub fn slot_span(&self) -> usize {
        self.slots.iter().map(|slot| slot.size()).sum()
    }
}

/// Immutable snapshot of the payload name and custom-field tables.
#[derive(Debug, Clone, Default)]
pub struct PayloadDirectory {
    names: BTreeMap<u32, String>,
    custom: BTreeMap<u32, CustomLayout>,
}

static CURRENT: Lazy<ArcSwap<PayloadDirectory>> =
    Lazy::new(|| ArcSwap::from_pointee(PayloadDirectory::defaults()));

impl PayloadDirectory {
    /// Empty directory: no names, no custom layouts.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in defaults: the stock test payload ids and the standard test
    /// custom layout for the v2 test payloads.
    pub fn defaults() -> Self {
        let mut directory = Self::empty();
        for (id, callsign) in [
            (0u32, "4FSKTEST"),
            (1, "HORUSBINARY"),
            (256, "4FSKTEST-V2"),
            (65535, "HORUSTEST"),
        ] {
            directory.names.insert(id, callsign.to_string());
        }

        let test_layout = CustomLayout {
            slots: parse_struct_notation("<BbBfH").expect("builtin layout"),
            fields: [
                ("cutdown_battery_voltage", FieldType::Battery5vByte),
                ("external_temperature", FieldType::None),
                ("test_counter", FieldType::None),
                ("test_float_field", FieldType::None),
                ("dummy", FieldType::None),
            ]
            .into_iter()
            .map(|(name, tag)| CustomField {
                name: name.to_string(),
                tag,
            })
            .collect(),
        };
        directory.custom.insert(256, test_layout.clone());
        directory.custom.insert(65535, test_layout);
        directory
    }

    /// Callsign for a payload id, when known.
    pub fn name(&self, id: u32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Custom layout for a payload id, when known.
    pub fn custom_layout(&self, id: u32) -> Option<&CustomLayout> {
        self.custom.get(&id)
    }

    fn id_for_callsign(&self, callsign: &str) -> Option<u32> {
        self.names
            .iter()
            .find(|(_, name)| name.as_str() == callsign)
            .map(|(&id, _)| id)
    }

    /// Load the payload name table from its text form: one `id,callsign`
    /// pair per line, `#` comments and blank lines ignored. Malformed lines
    /// are skipped; the skip count is returned.
    pub fn load_names(&mut self, text: &str) -> usize {
        let mut skipped = 0;
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let parsed = line.split_once(',').and_then(|(id, callsign)| {
                let callsign = callsign.trim();
                // A comma in a callsign would desync the sentence's
                // comma-separated fields downstream.
                if callsign.is_empty() || callsign.contains(',') {
                    return None;
                }
                Some((id.trim().parse::<u32>().ok()?, callsign.to_string()))
            });
            match parsed {
                Some((id, callsign)) => {
                    self.names.insert(id, callsign);
                }
                None => skipped += 1,
            }
        }
        skipped
    }

    /// Load the custom field table from its JSON form: an object keyed by
    /// payload id or callsign, each entry `{"struct": "<...", "fields":
    /// [[name, tag], ...]}`. Keys that resolve to no known payload are
    /// skipped (count returned); a malformed layout fails the whole refresh.
    pub fn load_custom(&mut self, json: &str) -> Result<usize, TableError> {
        #[derive(Deserialize)]
        struct RawEntry {
            #[serde(rename = "struct")]
            notation: String,
            fields: Vec<(String, String)>,
        }

        let table: BTreeMap<String, RawEntry> = serde_json::from_str(json)?;
        let mut skipped = 0;
        for (key, entry) in table {
            let id = match key.parse::<u32>() {
                Ok(id) => id,
                Err(_) => match self.id_for_callsign(&key) {
                    Some(id) => id,
                    None => {
                        skipped += 1;
                        continue;
                    }
                },
            };

            let slots = parse_struct_notation(&entry.notation)?;
            if entry.fields.len() != slots.len() {
                return Err(TableError::CountMismatch {
                    key,
                    fields: entry.fields.len(),
                    slots: slots.len(),
                });
            }

            let mut fields = Vec::with_capacity(entry.fields.len());
            for (name, tag) in entry.fields {
                let tag = FieldType::from_str(&tag).map_err(|source| TableError::Field {
                    key: key.clone(),
                    source,
                })?;
                if tag == FieldType::Custom {
                    return Err(TableError::NestedCustom { key });
                }
                fields.push(CustomField { name, tag });
            }

            self.custom.insert(id, CustomLayout { slots, fields });
        }
        Ok(skipped)
    }

    /// Publish this directory as the process-wide current snapshot.
    pub fn install(self) {
        CURRENT.store(Arc::new(self));
    }

    /// The current process-wide snapshot.
    pub fn current() -> Arc<PayloadDirectory> {
        CURRENT.load_full()
    }
}

/// Decode the embedded custom byte block against the payload's layout.
/// `Ok(None)` means the payload id has no registered layout; the caller
/// omits the custom contribution entirely.
pub fn decode_custom(
    block: &[u8],
    payload_id: u32,
    directory: &PayloadDirectory,
) -> Result<Option<(Vec<(String, FieldValue)>, String)>, DecodeError> {
    let Some(layout) = directory.custom_layout(payload_id) else {
        return Ok(None);
    };

    let span = layout.slot_span();
    if block.len() != span {
        return Err(DecodeError::CustomBlockMismatch {
            payload_id,
            expected: span,
            actual: block.len(),
        });
    }

    let scalars = unpack(block, &layout.slots)?;
    let mut values = Vec::with_capacity(layout.fields.len());
    let mut fragments = Vec::with_capacity(layout.fields.len());
    for (field, raw) in layout.fields.iter().zip(&scalars) {
        let (value, text) = decode_field(&field.name, field.tag, raw, directory)?;
        values.push((field.name.clone(), value));
        fragments.push(text);
    }
    Ok(Some((values, fragments.join(","))))
}
