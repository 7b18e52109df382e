// ============================================================
// TYPED TABLE
// ============================================================
// Ordered named columns, one resolved kind per column

use chrono::NaiveDateTime;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;

use crate::domain::error::AppError;

/// Canonical display format for timestamp cells
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Date string layouts recognised by type inference, in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePattern {
    /// `YYYYMMDD`
    Compact,
    /// `YYYY-MM-DD`
    IsoDate,
    /// `DD/MM/YYYY HH:MM:SS`
    DayMonthYearTime,
}

impl DatePattern {
    pub const ALL: [DatePattern; 3] = [
        DatePattern::Compact,
        DatePattern::IsoDate,
        DatePattern::DayMonthYearTime,
    ];

    /// chrono format string for this layout
    pub fn format(self) -> &'static str {
        match self {
            DatePattern::Compact => "%Y%m%d",
            DatePattern::IsoDate => "%Y-%m-%d",
            DatePattern::DayMonthYearTime => "%d/%m/%Y %H:%M:%S",
        }
    }

    /// Whether the layout carries a time of day
    pub fn has_time(self) -> bool {
        matches!(self, DatePattern::DayMonthYearTime)
    }
}

impl std::fmt::Display for DatePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatePattern::Compact => write!(f, "YYYYMMDD"),
            DatePattern::IsoDate => write!(f, "YYYY-MM-DD"),
            DatePattern::DayMonthYearTime => write!(f, "DD/MM/YYYY HH:MM:SS"),
        }
    }
}

/// Where a timestamp column's values came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampSource {
    EpochSeconds,
    EpochMillis,
    Pattern(DatePattern),
}

/// Resolved semantic type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
    Timestamp(TimestampSource),
}

impl ColumnKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnKind::Integer => write!(f, "Integer"),
            ColumnKind::Float => write!(f, "Float"),
            ColumnKind::Text => write!(f, "Text"),
            ColumnKind::Timestamp(TimestampSource::EpochSeconds) => {
                write!(f, "Timestamp(seconds)")
            }
            ColumnKind::Timestamp(TimestampSource::EpochMillis) => {
                write!(f, "Timestamp(milliseconds)")
            }
            ColumnKind::Timestamp(TimestampSource::Pattern(p)) => write!(f, "Timestamp({})", p),
        }
    }
}

/// Typed column storage. The variant *is* the column kind, so a column can
/// never hold cells of two different types.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Integer(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
    Timestamp {
        source: TimestampSource,
        values: Vec<Option<NaiveDateTime>>,
    },
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Integer(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Text(v) => v.len(),
            ColumnData::Timestamp { values, .. } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single cell, used for reads and copy-on-write edits
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Missing,
    Integer(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

/// A named, typed column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn integer(name: impl Into<String>, values: Vec<Option<i64>>) -> Self {
        Self::new(name, ColumnData::Integer(values))
    }

    pub fn float(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self::new(name, ColumnData::Float(values))
    }

    pub fn text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self::new(name, ColumnData::Text(values))
    }

    pub fn timestamp(
        name: impl Into<String>,
        source: TimestampSource,
        values: Vec<Option<NaiveDateTime>>,
    ) -> Self {
        Self::new(name, ColumnData::Timestamp { source, values })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn kind(&self) -> ColumnKind {
        match &self.data {
            ColumnData::Integer(_) => ColumnKind::Integer,
            ColumnData::Float(_) => ColumnKind::Float,
            ColumnData::Text(_) => ColumnKind::Text,
            ColumnData::Timestamp { source, .. } => ColumnKind::Timestamp(*source),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of non-missing cells
    pub fn present_count(&self) -> usize {
        match &self.data {
            ColumnData::Integer(v) => v.iter().flatten().count(),
            ColumnData::Float(v) => v.iter().flatten().count(),
            ColumnData::Text(v) => v.iter().flatten().count(),
            ColumnData::Timestamp { values, .. } => values.iter().flatten().count(),
        }
    }

    /// Cell at `row`, or `None` when the row is out of range
    pub fn value(&self, row: usize) -> Option<CellValue> {
        if row >= self.len() {
            return None;
        }
        let cell = match &self.data {
            ColumnData::Integer(v) => v[row].map(CellValue::Integer),
            ColumnData::Float(v) => v[row].map(CellValue::Float),
            ColumnData::Text(v) => v[row].clone().map(CellValue::Text),
            ColumnData::Timestamp { values, .. } => values[row].map(CellValue::Timestamp),
        };
        Some(cell.unwrap_or(CellValue::Missing))
    }

    /// Human-readable rendering of a cell; timestamps use the canonical format
    pub fn display(&self, row: usize) -> Option<String> {
        match self.value(row)? {
            CellValue::Missing => Some(String::new()),
            CellValue::Integer(v) => Some(v.to_string()),
            CellValue::Float(v) => Some(v.to_string()),
            CellValue::Text(v) => Some(v),
            CellValue::Timestamp(v) => Some(v.format(DISPLAY_TIMESTAMP_FORMAT).to_string()),
        }
    }

    /// Numeric view of the column; `None` unless the column is Integer or Float
    pub fn numeric_values(&self) -> Option<Vec<Option<f64>>> {
        match &self.data {
            ColumnData::Integer(v) => Some(v.iter().map(|x| x.map(|n| n as f64)).collect()),
            ColumnData::Float(v) => Some(v.clone()),
            _ => None,
        }
    }

    pub fn timestamp_values(&self) -> Option<&[Option<NaiveDateTime>]> {
        match &self.data {
            ColumnData::Timestamp { values, .. } => Some(values),
            _ => None,
        }
    }

    /// Parse user-entered text into a cell of this column's kind. Numbers
    /// are read with the `.` convention and must be finite.
    pub fn parse_cell(&self, text: Option<&str>) -> Result<CellValue, AppError> {
        let raw = match text.map(str::trim) {
            None | Some("") => return Ok(CellValue::Missing),
            Some(raw) => raw,
        };
        let invalid = || {
            AppError::ValidationError(format!(
                "'{}' is not a valid {} value for column '{}'",
                raw,
                self.kind(),
                self.name
            ))
        };

        match &self.data {
            ColumnData::Integer(_) => raw.parse::<i64>().map(CellValue::Integer).map_err(|_| invalid()),
            ColumnData::Float(_) => raw
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(CellValue::Float)
                .ok_or_else(invalid),
            ColumnData::Text(_) => Ok(CellValue::Text(raw.to_string())),
            ColumnData::Timestamp { source, .. } => {
                let mut formats = vec![DISPLAY_TIMESTAMP_FORMAT, "%Y-%m-%dT%H:%M:%S%.f"];
                if let TimestampSource::Pattern(p) = source {
                    formats.push(p.format());
                }
                formats
                    .into_iter()
                    .find_map(|fmt| parse_timestamp(raw, fmt))
                    .map(CellValue::Timestamp)
                    .ok_or_else(invalid)
            }
        }
    }

    fn set(&mut self, row: usize, value: CellValue) -> Result<(), AppError> {
        let kind = self.kind();
        let mismatch = |value: &CellValue| {
            AppError::ValidationError(format!(
                "cannot store {:?} in {} column '{}'",
                value, kind, self.name
            ))
        };

        match (&mut self.data, value) {
            (ColumnData::Integer(v), CellValue::Missing) => v[row] = None,
            (ColumnData::Float(v), CellValue::Missing) => v[row] = None,
            (ColumnData::Text(v), CellValue::Missing) => v[row] = None,
            (ColumnData::Timestamp { values, .. }, CellValue::Missing) => values[row] = None,
            (ColumnData::Integer(v), CellValue::Integer(n)) => v[row] = Some(n),
            (ColumnData::Float(v), CellValue::Integer(n)) => v[row] = Some(n as f64),
            (ColumnData::Float(v), CellValue::Float(n)) => v[row] = Some(n),
            (ColumnData::Text(v), CellValue::Text(s)) => v[row] = Some(s),
            (ColumnData::Timestamp { values, .. }, CellValue::Timestamp(t)) => values[row] = Some(t),
            (_, other) => return Err(mismatch(&other)),
        }
        Ok(())
    }
}

fn parse_timestamp(raw: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, format).ok().or_else(|| {
        chrono::NaiveDate::parse_from_str(raw, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    })
}

impl Serialize for Column {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Column", 3)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("kind", &self.kind())?;
        match &self.data {
            ColumnData::Integer(v) => state.serialize_field("values", v)?,
            ColumnData::Float(v) => state.serialize_field("values", v)?,
            ColumnData::Text(v) => state.serialize_field("values", v)?,
            ColumnData::Timestamp { values, .. } => state.serialize_field("values", values)?,
        }
        state.end()
    }
}

/// Ordered sequence of uniquely named, equal-length columns.
/// Immutable once built; edits go through [`Table::with_cell`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    row_count: usize,
    columns: Vec<Column>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self, AppError> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);

        if let Some(col) = columns.iter().find(|c| c.len() != row_count) {
            return Err(AppError::ValidationError(format!(
                "column '{}' has {} rows, expected {}",
                col.name(),
                col.len(),
                row_count
            )));
        }

        let mut seen = HashSet::new();
        if let Some(col) = columns.iter().find(|c| !seen.insert(c.name())) {
            return Err(AppError::ValidationError(format!(
                "duplicate column name '{}'",
                col.name()
            )));
        }

        Ok(Self { row_count, columns })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Validated lookup by exact name
    pub fn column(&self, name: &str) -> Result<&Column, AppError> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| AppError::ColumnNotFound(name.to_string()))
    }

    /// Copy-on-write edit: returns a new table with one cell replaced
    pub fn with_cell(&self, column: &str, row: usize, value: CellValue) -> Result<Table, AppError> {
        let index = self
            .columns
            .iter()
            .position(|c| c.name() == column)
            .ok_or_else(|| AppError::ColumnNotFound(column.to_string()))?;

        if row >= self.row_count {
            return Err(AppError::ValidationError(format!(
                "row {} is out of range (table has {} rows)",
                row, self.row_count
            )));
        }

        let mut edited = self.clone();
        edited.columns[index].set(row, value)?;
        Ok(edited)
    }
}
