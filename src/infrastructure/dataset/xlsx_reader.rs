// ============================================================
// XLSX READER
// ============================================================
// First worksheet of a workbook as string records

use calamine::{Data, DataType, Reader, Xlsx};
use std::io::Cursor;

use crate::domain::error::AppError;

/// Spreadsheet dates are rendered in the layout type inference recognises
const SPREADSHEET_DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Read the first worksheet into records, header row first
pub fn read_first_sheet(bytes: &[u8]) -> Result<Vec<Vec<String>>, AppError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| AppError::MalformedInput(format!("Failed to open Excel file: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::MalformedInput("No worksheet found".to_string()))?
        .map_err(|e| AppError::MalformedInput(format!("Failed to read Excel range: {}", e)))?;

    let records = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .collect();

    Ok(records)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(|dt| dt.format(SPREADSHEET_DATE_FORMAT).to_string())
            .unwrap_or_else(|| cell.to_string()),
        _ => cell.to_string(),
    }
}
