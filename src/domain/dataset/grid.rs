// ============================================================
// RAW GRID
// ============================================================
// Header plus string cells, before type inference

use serde::{Deserialize, Serialize};

use super::{Column, Table};
use crate::domain::error::AppError;

/// A data row whose field count differed from the header's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowLengthMismatch {
    /// 0-based data row index (the header is not counted)
    pub row: usize,
    pub expected: usize,
    pub actual: usize,
}

/// Rectangular string grid produced by the tabular parser or the
/// spreadsheet reader. Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct RawGrid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub mismatches: Vec<RowLengthMismatch>,
}

impl RawGrid {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Iterate over every cell, row-major
    pub fn cells(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flat_map(|row| row.iter().map(String::as_str))
    }

    /// Transpose into (header, values) pairs, one per column
    pub fn into_columns(self) -> Vec<(String, Vec<String>)> {
        let mut columns: Vec<(String, Vec<String>)> = self
            .headers
            .into_iter()
            .map(|h| (h, Vec::with_capacity(self.rows.len())))
            .collect();

        for row in self.rows {
            for (slot, cell) in columns.iter_mut().zip(row) {
                slot.1.push(cell);
            }
        }

        columns
    }

    /// Untyped view: every column as Text, empty cells as missing
    pub fn into_text_table(self) -> Result<Table, AppError> {
        let columns = self
            .into_columns()
            .into_iter()
            .map(|(name, values)| {
                let values = values
                    .into_iter()
                    .map(|v| if v.trim().is_empty() { None } else { Some(v) })
                    .collect();
                Column::text(name, values)
            })
            .collect();
        Table::new(columns)
    }
}
