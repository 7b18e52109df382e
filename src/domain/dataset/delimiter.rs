// ============================================================
// DELIMITER CANDIDATES
// ============================================================
// The fixed set of column separators the detector can choose from

use serde::{Deserialize, Serialize};

/// Column delimiter recognised in delimited-text documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    Comma,
    Semicolon,
    Tab,
    Space,
}

impl Delimiter {
    /// Textual delimiters in tie-break order. Space is deliberately absent.
    pub const TEXTUAL: [Delimiter; 3] = [Delimiter::Comma, Delimiter::Semicolon, Delimiter::Tab];

    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Semicolon => b';',
            Delimiter::Tab => b'\t',
            Delimiter::Space => b' ',
        }
    }

    pub fn as_char(self) -> char {
        self.as_byte() as char
    }
}

impl Default for Delimiter {
    fn default() -> Self {
        Delimiter::Comma
    }
}

impl std::fmt::Display for Delimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Delimiter::Comma => write!(f, "comma"),
            Delimiter::Semicolon => write!(f, "semicolon"),
            Delimiter::Tab => write!(f, "tab"),
            Delimiter::Space => write!(f, "space"),
        }
    }
}
