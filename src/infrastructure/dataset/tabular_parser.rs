// ============================================================
// TABULAR PARSER
// ============================================================
// Split normalized text into a header and equal-length rows

use csv::{ReaderBuilder, Trim};
use std::collections::HashSet;
use tracing::warn;

use super::NormalizedText;
use crate::domain::dataset::{Delimiter, RawGrid, RowLengthMismatch};
use crate::domain::error::AppError;

/// Grid parser for delimited text
pub struct TabularParser {
    /// Column delimiter
    delimiter: Delimiter,

    /// Drop rows with a field count different from the header's instead of
    /// padding or truncating them
    strict: bool,
}

impl Default for TabularParser {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::Comma,
            strict: false,
        }
    }
}

impl TabularParser {
    pub fn new(delimiter: Delimiter) -> Self {
        Self {
            delimiter,
            ..Self::default()
        }
    }

    /// Set strict row-length handling
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Parse normalized text. The first non-blank record is the header.
    pub fn parse(&self, text: &NormalizedText) -> Result<RawGrid, AppError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter.as_byte())
            .has_headers(false)
            .trim(Trim::All)
            .flexible(true) // Row lengths are checked below, with diagnostics
            .from_reader(text.as_str().as_bytes());

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| {
                AppError::MalformedInput(format!("Failed to parse row {}: {}", records.len() + 1, e))
            })?;

            let row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
            let all_empty = row.iter().all(|s| s.is_empty());
            // A blank line is one empty field. A line of bare delimiters
            // after the header is a row of missing cells.
            if all_empty && (row.len() == 1 || records.is_empty()) {
                continue;
            }
            records.push(row);
        }

        self.build_grid(records)
    }

    /// Turn records (header first) into a rectangular grid. Shared with the
    /// spreadsheet path, which arrives here already split into cells.
    pub fn build_grid(&self, records: Vec<Vec<String>>) -> Result<RawGrid, AppError> {
        let mut records = records.into_iter();

        let header = records
            .next()
            .ok_or_else(|| AppError::MalformedInput("no header row found".to_string()))?;
        let headers = unique_headers(header);
        let expected = headers.len();

        let mut rows = Vec::new();
        let mut mismatches = Vec::new();

        for (row, mut cells) in records.enumerate() {
            let actual = cells.len();
            if actual != expected {
                warn!(row, expected, actual, strict = self.strict, "Row length differs from header");
                mismatches.push(RowLengthMismatch {
                    row,
                    expected,
                    actual,
                });
                if self.strict {
                    continue;
                }
                cells.resize(expected, String::new());
            }
            rows.push(cells);
        }

        if rows.is_empty() {
            return Err(AppError::EmptyDataset);
        }

        Ok(RawGrid {
            headers,
            rows,
            mismatches,
        })
    }
}

/// Blank names become `column_{n}`; repeats get `_1`, `_2`, ... suffixes
/// that skip names already taken.
fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut taken = HashSet::new();
    let mut headers = Vec::with_capacity(raw.len());

    for (idx, name) in raw.into_iter().enumerate() {
        let base = match name.trim() {
            "" => format!("column_{}", idx + 1),
            trimmed => trimmed.to_string(),
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while taken.contains(&candidate) {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }

        taken.insert(candidate.clone());
        headers.push(candidate);
    }

    headers
}
