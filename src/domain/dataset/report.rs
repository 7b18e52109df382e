use serde::Serialize;

use super::{CoordinatePair, DecimalSeparator, Delimiter, RowLengthMismatch, Table};

/// Result of ingesting one document
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    /// Original filename as uploaded
    pub filename: String,

    /// Encoding the text was decoded with (`None` for spreadsheets)
    pub encoding: Option<String>,

    /// Detected column delimiter (`None` for spreadsheets)
    pub delimiter: Option<Delimiter>,

    /// Decimal mark used for numeric inference
    pub decimal_separator: DecimalSeparator,

    /// The typed table
    pub table: Table,

    /// Rows whose field count differed from the header
    pub diagnostics: Vec<RowLengthMismatch>,

    /// Latitude/longitude columns, if the names suggest any
    pub coordinates: Option<CoordinatePair>,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}
