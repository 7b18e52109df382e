// ============================================================
// DATASET DOMAIN LAYER
// ============================================================
// Core types for ingesting uploaded tabular files
// No I/O, no async

mod coordinates;
mod delimiter;
mod document;
mod grid;
mod ingest_config;
mod report;
mod table;
mod view;

pub use coordinates::CoordinatePair;
pub use delimiter::Delimiter;
pub use document::{FileKind, RawDocument};
pub use grid::{RawGrid, RowLengthMismatch};
pub use ingest_config::{DecimalHint, DecimalSeparator, IngestConfig};
pub use report::IngestReport;
pub use table::{
    CellValue, Column, ColumnData, ColumnKind, DatePattern, Table, TimestampSource,
    DISPLAY_TIMESTAMP_FORMAT,
};
pub use view::DashboardView;
