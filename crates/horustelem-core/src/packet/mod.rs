//! Packet format registry and decoding pipeline.
//!
//! Layered structure:
//! - `layout`: wire types, field specs, the static format table (source of
//!   truth)
//! - `reader`: safe byte access, slot-by-slot unpacking
//! - `parser`: domain-level decoding (no direct byte indexing)
//! - `error`: explicit, actionable errors
//!
//! Parsers are pure and contain no I/O; the payload directory consumed for
//! custom fields is passed in as an immutable snapshot.
//!
//! Version française (résumé):
//! Le module décode les paquets Horus Binary avec validations strictes
//! (longueur, structure du format, CRC, nombre de champs). Les types de fil
//! sont dans `layout`, l'accès aux octets dans `reader`.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
