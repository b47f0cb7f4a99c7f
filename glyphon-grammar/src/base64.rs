//! Base64 encode/decode, a utility service the grammar/runtime core
//! treats as an external collaborator (spec's out-of-scope list names
//! "encoding conversion utilities (UTF-8/16/32), hex parsing, base64"
//! in the same breath) but which the testable-property scenarios still
//! exercise end to end. Grounded on
//! `original_source/tests/base64_tests.cpp`'s exact vectors: standard
//! alphabet, `=` padding on encode, padding optional on decode, and
//! any byte outside the alphabet (including bare padding with no data)
//! rejected rather than silently dropped.

use base64::engine::general_purpose::GeneralPurposeConfig;
use base64::engine::{DecodePaddingMode, GeneralPurpose};
use base64::{alphabet, Engine};

fn engine() -> GeneralPurpose {
    GeneralPurpose::new(
        &alphabet::STANDARD,
        GeneralPurposeConfig::new().with_encode_padding(true).with_decode_padding_mode(DecodePaddingMode::Indifferent),
    )
}

/// `decode_base64(encode_base64(x)) == x` for every byte string `x`.
pub fn encode_base64(bytes: impl AsRef<[u8]>) -> String {
    engine().encode(bytes)
}

/// `None` for anything not valid base64 (wrong alphabet, malformed
/// padding), `Some` otherwise — padding is accepted but not required.
pub fn decode_base64(input: impl AsRef<[u8]>) -> Option<Vec<u8>> {
    engine().decode(input).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_wikipedia_vectors() {
        assert_eq!(encode_base64(""), "");
        assert_eq!(encode_base64("0123456789"), "MDEyMzQ1Njc4OQ==");
        assert_eq!(encode_base64("light work."), "bGlnaHQgd29yay4=");
        assert_eq!(encode_base64("light work"), "bGlnaHQgd29yaw==");
    }

    #[test]
    fn encodes_binary_data_not_just_text() {
        let data: [u8; 13] = [0x14, 0xa3, 0x00, 0x04, 0x67, 0x3b, 0xc6, 0xff, 0xe1, 0xbf, 0x91, 0xaa, 0x28];
        assert_eq!(encode_base64(data), "FKMABGc7xv/hv5GqKA==");
    }

    #[test]
    fn decodes_with_and_without_padding() {
        assert_eq!(decode_base64("bGlnaHQgd29yay4="), Some(b"light work.".to_vec()));
        assert_eq!(decode_base64("bGlnaHQgd29yay4"), Some(b"light work.".to_vec()));
        assert_eq!(decode_base64("bGlnaHQgd29yaw=="), Some(b"light work".to_vec()));
        assert_eq!(decode_base64("bGlnaHQgd29yaw"), Some(b"light work".to_vec()));
    }

    #[test]
    fn round_trips_every_byte_string_in_a_sample() {
        let samples: [&[u8]; 5] = [b"", b"light work.", b"light work", b"Many hands make light work.", &[0x14, 0xa3, 0x00, 0x04, 0x67, 0x3b, 0xc6, 0xff, 0xe1, 0xbf, 0x91, 0xaa, 0x28]];
        for sample in samples {
            assert_eq!(decode_base64(encode_base64(sample)).as_deref(), Some(sample));
        }
    }

    #[test]
    fn rejects_invalid_base64() {
        assert_eq!(decode_base64("@#$"), None);
        assert_eq!(decode_base64("*)("), None);
        assert_eq!(decode_base64("~`"), None);
        assert_eq!(decode_base64("\r\t\n"), None);
        assert_eq!(decode_base64("===="), None);
    }
}
