// ============================================================
// RAW DOCUMENT
// ============================================================
// An uploaded file before any parsing

use crate::domain::error::AppError;

/// How a document enters the pipeline, decided from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `.csv`, `.tsv`, `.txt`: goes through detection and normalization
    DelimitedText,
    /// `.xlsx`: read as a grid, skips straight to type inference
    Spreadsheet,
}

impl FileKind {
    pub fn from_filename(filename: &str) -> Result<Self, AppError> {
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.trim().to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" | "tsv" | "txt" => Ok(FileKind::DelimitedText),
            "xlsx" => Ok(FileKind::Spreadsheet),
            _ => Err(AppError::UnsupportedFileType(filename.to_string())),
        }
    }
}

/// Immutable uploaded bytes plus an optional declared encoding label
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub declared_encoding: Option<String>,
}

impl RawDocument {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
            declared_encoding: None,
        }
    }

    pub fn with_encoding(mut self, label: impl Into<String>) -> Self {
        self.declared_encoding = Some(label.into());
        self
    }

    pub fn kind(&self) -> Result<FileKind, AppError> {
        FileKind::from_filename(&self.filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_from_extension() {
        assert_eq!(FileKind::from_filename("a.CSV").unwrap(), FileKind::DelimitedText);
        assert_eq!(FileKind::from_filename("a.tsv").unwrap(), FileKind::DelimitedText);
        assert_eq!(FileKind::from_filename("b.txt").unwrap(), FileKind::DelimitedText);
        assert_eq!(FileKind::from_filename("c.xlsx").unwrap(), FileKind::Spreadsheet);
    }

    #[test]
    fn test_unsupported_extension() {
        assert_eq!(
            FileKind::from_filename("notes.pdf"),
            Err(AppError::UnsupportedFileType("notes.pdf".to_string()))
        );
        assert!(FileKind::from_filename("no_extension").is_err());
    }
}
