use thiserror::Error;

/// Errors aborting a single decode call. All are fatal: the packet is
/// discarded and no partial record is returned.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("no packet format registered for length {length}")]
    UnknownFormat { length: usize },
    #[error("format {name:?}: declared length {declared} does not match slot layout ({computed})")]
    MalformedFormat {
        name: &'static str,
        declared: usize,
        computed: usize,
    },
    #[error("format {name:?}: custom field declared before payload_id")]
    CustomPrecedesPayloadId { name: &'static str },
    #[error("format {name:?}: input has length {actual}, should be length {expected}")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("checksum failure: computed {computed:#06X}, packet carries {expected:#06X}")]
    ChecksumFailure { computed: u16, expected: u16 },
    #[error("format {name:?}: defines {fields} fields, got {scalars} scalars from layout")]
    FieldCountMismatch {
        name: &'static str,
        fields: usize,
        scalars: usize,
    },
    #[error("unknown field type: {tag}")]
    UnknownFieldType { tag: String },
    #[error("field {field}: {tag} cannot decode a {wire} scalar")]
    WireMismatch {
        field: String,
        tag: &'static str,
        wire: &'static str,
    },
    #[error("custom block for payload {payload_id}: layout spans {expected} bytes, block has {actual}")]
    CustomBlockMismatch {
        payload_id: u32,
        expected: usize,
        actual: usize,
    },
    #[error("packet too short: need {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },
}

/// Errors from struct-notation parsing (external custom field tables).
#[derive(Debug, Error)]
pub enum NotationError {
    #[error("struct notation must start with '<' (little-endian): {notation:?}")]
    MissingEndianPrefix { notation: String },
    #[error("unknown struct code {code:?} in {notation:?}")]
    UnknownCode { code: char, notation: String },
    #[error("repeat count without a code in {notation:?}")]
    DanglingCount { notation: String },
    #[error("repeat count too large in {notation:?}")]
    CountTooLarge { notation: String },
}
