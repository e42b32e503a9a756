use horustelem_core::{
    DecodeError, DecodedPacket, FieldValue, PayloadDirectory, crc16_ccitt_false, decode_packet,
    decode_packet_with, hex_to_bytes, sentence_checksum,
};

const V1_HEX: &str = "0112000000230000000000000000000000001C9A9545";
const V1_SENTENCE: &str = "$$HORUSBINARY,18,00:00:35,0.00000,0.00000,0,0,0,28,3.02*27B1";

const V2_16_HEX: &str = "0112020002BCEB2141521000FF00E17E";
const V2_16_SENTENCE: &str = "$$HORUSBINARY,18,00:00:04,-132.81260,539.06250,16,5.00,0*2C55";

const V2_32_HEX: &str = "FFFF12000000230000000000000000000100000000000000000000000000E882";
const V2_32_SENTENCE: &str =
    "$$HORUSTEST,18,00:00:35,0.00000,0.00000,256,0,0,0,0.00,0.00,0,0,0.0,0*80AE";

fn decode_fixture(hex: &str) -> DecodedPacket {
    let bytes = hex_to_bytes(hex).expect("fixture hex");
    decode_packet_with(&bytes, None, &PayloadDirectory::defaults()).expect("fixture decodes")
}

fn reseal(mut body: Vec<u8>) -> Vec<u8> {
    let split = body.len() - 2;
    let crc = crc16_ccitt_false(&body[..split]);
    body[split..].copy_from_slice(&crc.to_le_bytes());
    body
}

#[test]
fn v1_fixture_decodes() {
    let decoded = decode_fixture(V1_HEX);
    assert!(decoded.crc_ok);
    assert_eq!(decoded.packet_format, "Horus Binary v1 22 Byte Format");
    assert_eq!(decoded.payload_id, 1);
    assert_eq!(decoded.ukhas_str, V1_SENTENCE);
    assert_eq!(decoded.fields["sequence_number"], FieldValue::Int(18));
    assert_eq!(
        decoded.fields["time"],
        FieldValue::Text("00:00:35".to_string())
    );
    assert_eq!(decoded.fields["altitude"], FieldValue::Int(0));
    assert_eq!(decoded.fields["temperature"], FieldValue::Int(28));
    match decoded.fields["battery_voltage"] {
        FieldValue::Float(volts) => assert!((volts - 3.0196).abs() < 1e-3),
        ref other => panic!("battery_voltage: {other:?}"),
    }
    assert!(!decoded.fields.contains_key("checksum"));
}

#[test]
fn v1_fixture_with_flipped_payload_byte_fails_crc() {
    let mut bytes = hex_to_bytes(V1_HEX).unwrap();
    bytes[13] = 0x01;
    let err = decode_packet_with(&bytes, None, &PayloadDirectory::defaults()).unwrap_err();
    assert!(matches!(err, DecodeError::ChecksumFailure { .. }));
}

#[test]
fn every_single_bit_flip_fails_crc() {
    let bytes = hex_to_bytes(V1_HEX).unwrap();
    let directory = PayloadDirectory::defaults();
    for byte in 0..bytes.len() - 2 {
        for bit in 0..8 {
            let mut corrupted = bytes.clone();
            corrupted[byte] ^= 1 << bit;
            let err = decode_packet_with(&corrupted, None, &directory).unwrap_err();
            assert!(
                matches!(err, DecodeError::ChecksumFailure { .. }),
                "byte {byte} bit {bit}: {err}"
            );
        }
    }
}

#[test]
fn v2_16_fixture_decodes() {
    let decoded = decode_fixture(V2_16_HEX);
    assert_eq!(decoded.packet_format, "Horus Binary v2 16 Byte Format");
    assert_eq!(decoded.ukhas_str, V2_16_SENTENCE);
    assert_eq!(decoded.fields["latitude"], FieldValue::Float(-132.8126));
    assert_eq!(decoded.fields["longitude"], FieldValue::Float(539.0625));
    assert_eq!(decoded.fields["altitude"], FieldValue::Int(16));
    assert_eq!(
        decoded.fields["time"],
        FieldValue::Text("00:00:04".to_string())
    );
}

#[test]
fn v2_32_fixture_decodes_with_custom_fields() {
    let decoded = decode_fixture(V2_32_HEX);
    assert_eq!(decoded.packet_format, "Horus Binary v2 32 Byte Format");
    assert_eq!(decoded.payload_id, 65535);
    assert_eq!(decoded.ukhas_str, V2_32_SENTENCE);
    assert_eq!(decoded.fields["altitude"], FieldValue::Int(256));
    assert_eq!(decoded.fields["test_counter"], FieldValue::Int(0));
    assert_eq!(decoded.fields["external_temperature"], FieldValue::Int(0));
    assert_eq!(
        decoded.fields["cutdown_battery_voltage"],
        FieldValue::Float(0.0)
    );
    assert!(!decoded.fields.contains_key("custom"));
}

#[test]
fn unknown_payload_id_omits_custom_contribution() {
    let mut bytes = hex_to_bytes(V2_32_HEX).unwrap();
    bytes[0] = 0x05;
    bytes[1] = 0x00;
    let bytes = reseal(bytes);

    let decoded = decode_packet_with(&bytes, None, &PayloadDirectory::defaults()).unwrap();
    assert_eq!(decoded.payload_id, 5);
    assert!(!decoded.fields.contains_key("test_counter"));
    assert!(decoded.ukhas_str.starts_with("$$5,18,"));

    let body = decoded
        .ukhas_str
        .trim_start_matches("$$")
        .split('*')
        .next()
        .unwrap()
        .to_string();
    // payload_id through battery_voltage only; no custom fragment.
    assert_eq!(body.split(',').count(), 10);
}

#[test]
fn lengths_outside_registry_are_unknown_format() {
    let directory = PayloadDirectory::defaults();
    for length in [0usize, 1, 15, 17, 21, 23, 31, 33, 64] {
        let err = decode_packet_with(&vec![0u8; length], None, &directory).unwrap_err();
        assert!(
            matches!(err, DecodeError::UnknownFormat { length: got } if got == length),
            "length {length}: {err}"
        );
    }
}

#[test]
fn decoding_is_deterministic() {
    for hex in [V1_HEX, V2_16_HEX, V2_32_HEX] {
        let first = decode_fixture(hex);
        let second = decode_fixture(hex);
        assert_eq!(first, second);
    }
}

#[test]
fn sentence_shape_and_digest() {
    for hex in [V1_HEX, V2_16_HEX, V2_32_HEX] {
        let decoded = decode_fixture(hex);
        let sentence = &decoded.ukhas_str;
        assert!(sentence.starts_with("$$"), "{sentence}");
        assert_eq!(sentence.matches('*').count(), 1, "{sentence}");
        let (body, digest) = sentence[2..].split_once('*').unwrap();
        assert_eq!(digest, sentence_checksum(body), "{sentence}");
    }
}

#[test]
fn record_serializes_as_flat_json() {
    let decoded = decode_fixture(V2_32_HEX);
    let value = serde_json::to_value(&decoded).unwrap();
    assert_eq!(value["packet_format"], "Horus Binary v2 32 Byte Format");
    assert_eq!(value["payload_id"], 65535);
    assert_eq!(value["test_counter"], 0);
    assert_eq!(value["time"], "00:00:35");
    assert!(value.get("fields").is_none());
}

#[test]
fn decode_uses_the_snapshot_it_is_given() {
    let bytes = hex_to_bytes(V1_HEX).unwrap();

    let decoded = decode_packet_with(&bytes, None, &PayloadDirectory::empty()).unwrap();
    assert!(decoded.ukhas_str.starts_with("$$1,18,"));

    let mut renamed = PayloadDirectory::defaults();
    renamed.load_names("1,RENAMED\n");
    let decoded = decode_packet_with(&bytes, None, &renamed).unwrap();
    assert!(decoded.ukhas_str.starts_with("$$RENAMED,18,"));

    // Previously built snapshots are unaffected by later loads.
    let decoded = decode_packet_with(&bytes, None, &PayloadDirectory::defaults()).unwrap();
    assert_eq!(decoded.ukhas_str, V1_SENTENCE);
}

#[test]
fn refreshed_custom_layout_changes_custom_decoding() {
    let bytes = hex_to_bytes(V2_32_HEX).unwrap();

    let mut directory = PayloadDirectory::defaults();
    directory
        .load_custom(r#"{"HORUSTEST": {"struct": "<9s", "fields": [["blob", "none"]]}}"#)
        .unwrap();
    let decoded = decode_packet_with(&bytes, None, &directory).unwrap();
    assert_eq!(
        decoded.fields["blob"],
        FieldValue::Text("000000000000000000".to_string())
    );
    assert!(!decoded.fields.contains_key("test_counter"));

    // A layout whose span disagrees with the embedded block is fatal.
    let mut directory = PayloadDirectory::defaults();
    directory
        .load_custom(r#"{"HORUSTEST": {"struct": "<H", "fields": [["counter", "none"]]}}"#)
        .unwrap();
    let err = decode_packet_with(&bytes, None, &directory).unwrap_err();
    assert!(matches!(err, DecodeError::CustomBlockMismatch { .. }));
}

#[test]
fn installed_snapshot_is_visible_to_implicit_decodes() {
    // Only extends the defaults with an id no other test decodes, so
    // concurrently running tests see unchanged behavior.
    let mut directory = PayloadDirectory::defaults();
    directory.load_names("5000,SNAPTEST\n");
    directory.install();

    assert_eq!(PayloadDirectory::current().name(5000), Some("SNAPTEST"));

    let bytes = hex_to_bytes(V1_HEX).unwrap();
    let decoded = decode_packet(&bytes, None).unwrap();
    assert_eq!(decoded.ukhas_str, V1_SENTENCE);
}
