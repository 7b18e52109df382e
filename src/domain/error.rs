use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppError {
    /// The document parsed, but no data rows survived.
    EmptyDataset,
    /// No row structure could be identified in the document.
    MalformedInput(String),
    /// The file extension is not one the pipeline accepts.
    UnsupportedFileType(String),
    ColumnNotFound(String),
    ValidationError(String),
    Config(String),
    NotFound(String),
    IoError(String),
    Internal(String),
}

impl AppError {
    /// Stable machine-readable tag, used as the `error` field of HTTP bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::EmptyDataset => "EmptyDataset",
            AppError::MalformedInput(_) => "MalformedInput",
            AppError::UnsupportedFileType(_) => "UnsupportedFileType",
            AppError::ColumnNotFound(_) => "ColumnNotFound",
            AppError::ValidationError(_) => "ValidationError",
            AppError::Config(_) => "Config",
            AppError::NotFound(_) => "NotFound",
            AppError::IoError(_) => "IoError",
            AppError::Internal(_) => "Internal",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::EmptyDataset => {
                write!(f, "Empty dataset: no data rows found, check the file and its separator")
            }
            AppError::MalformedInput(msg) => write!(f, "Malformed input: {}", msg),
            AppError::UnsupportedFileType(name) => write!(
                f,
                "Unsupported file type: {} (expected .csv, .tsv, .txt or .xlsx)",
                name
            ),
            AppError::ColumnNotFound(name) => write!(f, "Column not found: {}", name),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::MalformedInput(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
