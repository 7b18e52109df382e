// ============================================================
// INGESTION USE CASE
// ============================================================
// Orchestrate decoding, detection, normalization, parsing and type
// inference for one uploaded document, or many in parallel

use std::time::Instant;
use tracing::{info, warn};

use super::coordinate_resolver::resolve_coordinates;
use crate::domain::dataset::{
    DecimalSeparator, Delimiter, FileKind, IngestConfig, IngestReport, RawDocument, RawGrid,
};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::dataset::{
    decode_document, detect_decimal_separator, normalize, read_first_sheet, SeparatorDetector,
    TabularParser, TypeInferenceEngine,
};

/// Dataset ingestion use case
#[derive(Debug, Clone)]
pub struct IngestionUseCase {
    config: IngestConfig,
}

impl IngestionUseCase {
    /// Create a new ingestion use case
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    /// Create with default configuration
    pub fn default_config() -> Self {
        Self::new(IngestConfig::default())
    }

    /// Run the full pipeline over one document
    pub fn ingest(&self, document: &RawDocument) -> Result<IngestReport> {
        let start = Instant::now();

        self.config.validate()?;

        // Rejected before any parsing is attempted
        let kind = document.kind()?;

        match kind {
            FileKind::DelimitedText => {
                let decoded =
                    decode_document(&document.bytes, document.declared_encoding.as_deref());
                self.ingest_text_with_encoding(
                    &document.filename,
                    &decoded.text,
                    Some(decoded.encoding.to_string()),
                    start,
                )
            }
            FileKind::Spreadsheet => {
                let records = read_first_sheet(&document.bytes)?;
                let grid = TabularParser::default()
                    .with_strict(self.config.strict_row_length)
                    .build_grid(records)?;
                // Workbook numbers arrive typed and are rendered with `.`,
                // so the decimal hint never applies to them
                self.finish(&document.filename, None, None, DecimalSeparator::Dot, grid, start)
            }
        }
    }

    /// Ingest already-decoded delimited text (for testing or in-memory data)
    pub fn ingest_text(&self, filename: &str, text: &str) -> Result<IngestReport> {
        self.config.validate()?;
        self.ingest_text_with_encoding(filename, text, None, Instant::now())
    }

    /// Run `ingest` on a blocking worker so async callers are not stalled
    pub async fn ingest_blocking(&self, document: RawDocument) -> Result<IngestReport> {
        let use_case = self.clone();
        tokio::task::spawn_blocking(move || use_case.ingest(&document))
            .await
            .map_err(|e| AppError::Internal(format!("Ingestion worker failed: {}", e)))?
    }

    /// Ingest several documents concurrently. Results come back in input
    /// order and one failing file never affects another.
    pub async fn ingest_batch(&self, documents: Vec<RawDocument>) -> Vec<Result<IngestReport>> {
        let handles: Vec<_> = documents
            .into_iter()
            .map(|document| {
                let use_case = self.clone();
                tokio::task::spawn_blocking(move || use_case.ingest(&document))
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            let result = handle
                .await
                .map_err(|e| AppError::Internal(format!("Ingestion worker failed: {}", e)))
                .and_then(|r| r);
            results.push(result);
        }
        results
    }

    fn ingest_text_with_encoding(
        &self,
        filename: &str,
        text: &str,
        encoding: Option<String>,
        start: Instant,
    ) -> Result<IngestReport> {
        let detector = SeparatorDetector::new(self.config.sample_lines_for_detection);
        let delimiter = detector.detect(text);

        let normalized = normalize(text, delimiter);
        let grid = TabularParser::new(delimiter)
            .with_strict(self.config.strict_row_length)
            .parse(&normalized)?;

        let decimal_separator = self.resolve_decimal(&grid);
        self.finish(filename, encoding, Some(delimiter), decimal_separator, grid, start)
    }

    fn finish(
        &self,
        filename: &str,
        encoding: Option<String>,
        delimiter: Option<Delimiter>,
        decimal_separator: DecimalSeparator,
        grid: RawGrid,
        start: Instant,
    ) -> Result<IngestReport> {
        let diagnostics = grid.mismatches.clone();

        if !diagnostics.is_empty() {
            warn!(
                file = filename,
                rows = diagnostics.len(),
                strict = self.config.strict_row_length,
                "Rows with a different field count than the header"
            );
        }

        let table = TypeInferenceEngine::new(decimal_separator).infer_table(grid)?;
        let coordinates = resolve_coordinates(&table.column_names());

        info!(
            file = filename,
            delimiter = ?delimiter,
            decimal = %decimal_separator.as_char(),
            rows = table.row_count(),
            columns = table.columns().len(),
            "Dataset ingested"
        );

        Ok(IngestReport {
            filename: filename.to_string(),
            encoding,
            delimiter,
            decimal_separator,
            table,
            diagnostics,
            coordinates,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn resolve_decimal(&self, grid: &RawGrid) -> DecimalSeparator {
        match self.config.decimal_separator.explicit() {
            Some(explicit) => explicit,
            None => detect_decimal_separator(grid.cells(), self.config.max_inference_sample),
        }
    }
}

impl Default for IngestionUseCase {
    fn default() -> Self {
        Self::default_config()
    }
}
