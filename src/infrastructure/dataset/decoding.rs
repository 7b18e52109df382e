// ============================================================
// TEXT DECODING
// ============================================================
// Turn uploaded bytes into text without ever failing

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use tracing::warn;

/// Decoded document text plus the encoding that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static str,
}

/// Decode with, in order: the declared label, a byte-order mark, strict
/// UTF-8, and finally Windows-1252 (which accepts any byte sequence).
pub fn decode_document(bytes: &[u8], declared: Option<&str>) -> DecodedText {
    if let Some(label) = declared {
        match Encoding::for_label(label.trim().as_bytes()) {
            Some(encoding) => {
                let (text, used, had_errors) = encoding.decode(bytes);
                if had_errors {
                    warn!(encoding = used.name(), "Declared encoding produced replacement characters");
                }
                return DecodedText {
                    text: text.into_owned(),
                    encoding: used.name(),
                };
            }
            None => warn!(label, "Unknown declared encoding, sniffing instead"),
        }
    }

    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return DecodedText {
            text: text.into_owned(),
            encoding: encoding.name(),
        };
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return DecodedText {
            text: text.to_string(),
            encoding: UTF_8.name(),
        };
    }

    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    DecodedText {
        text: text.into_owned(),
        encoding: WINDOWS_1252.name(),
    }
}
