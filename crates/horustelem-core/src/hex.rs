use thiserror::Error;

/// Errors from the hexadecimal transcoding boundary.
#[derive(Debug, Error)]
pub enum HexError {
    #[error("invalid hexadecimal input: {0}")]
    Invalid(#[from] hex::FromHexError),
}

/// Decode a hexadecimal string into raw packet bytes. Whitespace is
/// tolerated anywhere; digits are case-insensitive.
pub fn hex_to_bytes(input: &str) -> Result<Vec<u8>, HexError> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(hex::decode(compact)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_mixed_case_with_whitespace() {
        assert_eq!(
            hex_to_bytes("01 ff\tAb\n").unwrap(),
            vec![0x01, 0xFF, 0xAB]
        );
    }

    #[test]
    fn rejects_non_hex_and_odd_length() {
        assert!(hex_to_bytes("zz").is_err());
        assert!(hex_to_bytes("abc").is_err());
    }

    #[test]
    fn empty_input_is_empty_bytes() {
        assert!(hex_to_bytes("").unwrap().is_empty());
    }
}
