//! Text decoding for container parts.
//!
//! Every part of a pbix container is stored as UTF-16 little-endian text,
//! not the UTF-8 most tooling assumes. Decoding goes through `encoding_rs`
//! so that a leading BOM is removed and malformed input (unpaired
//! surrogates, a dangling odd byte) is detected instead of silently
//! replaced.

use encoding_rs::UTF_16LE;
use thiserror::Error;

/// UTF-16 little-endian BOM bytes.
pub const UTF16_LE_BOM: [u8; 2] = [0xFF, 0xFE];

/// Malformed UTF-16LE input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The byte sequence does not consist of whole 16-bit code units
    #[error("odd byte length {0} for UTF-16 text")]
    OddLength(usize),

    /// The code units do not form valid UTF-16 (e.g. unpaired surrogates)
    #[error("malformed UTF-16LE sequence")]
    Malformed,
}

/// Decode UTF-16 LE bytes to a String.
///
/// A leading UTF-16LE BOM is stripped. Unlike a lossy decode, any malformed
/// sequence is reported as an error.
///
/// # Examples
/// ```
/// use pbix::common::encoding::decode_utf16le;
///
/// let bytes = b"H\x00e\x00l\x00l\x00o\x00";
/// assert_eq!(decode_utf16le(bytes).unwrap(), "Hello");
/// ```
pub fn decode_utf16le(bytes: &[u8]) -> Result<String, DecodeError> {
    if bytes.is_empty() {
        return Ok(String::new());
    }
    if bytes.len() % 2 != 0 {
        return Err(DecodeError::OddLength(bytes.len()));
    }

    let (text, had_errors) = UTF_16LE.decode_with_bom_removal(bytes);
    if had_errors {
        return Err(DecodeError::Malformed);
    }
    Ok(text.into_owned())
}

/// Encode a string as UTF-16 LE bytes without a BOM.
///
/// `encoding_rs` only encodes to UTF-8 for the UTF-16 family, so the code
/// units are produced directly. Only fixtures need this direction.
#[cfg(test)]
pub(crate) fn encode_utf16le(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain() {
        let bytes = encode_utf16le("{\"id\":1}");
        assert_eq!(decode_utf16le(&bytes).unwrap(), "{\"id\":1}");
    }

    #[test]
    fn test_decode_strips_bom() {
        let mut bytes = UTF16_LE_BOM.to_vec();
        bytes.extend(encode_utf16le("1.28"));
        assert_eq!(decode_utf16le(&bytes).unwrap(), "1.28");
    }

    #[test]
    fn test_decode_non_ascii() {
        let bytes = encode_utf16le("Überblick 📊");
        assert_eq!(decode_utf16le(&bytes).unwrap(), "Überblick 📊");
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode_utf16le(&[]).unwrap(), "");
    }

    #[test]
    fn test_odd_length_is_error() {
        assert_eq!(
            decode_utf16le(b"a\x00b"),
            Err(DecodeError::OddLength(3))
        );
    }

    #[test]
    fn test_unpaired_surrogate_is_error() {
        // lone high surrogate followed by 'a'
        let bytes = [0x00, 0xD8, b'a', 0x00];
        assert_eq!(decode_utf16le(&bytes), Err(DecodeError::Malformed));
    }
}
