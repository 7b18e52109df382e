// ============================================================
// INGESTION CONFIGURATION
// ============================================================
// Knobs recognised by the ingestion pipeline

use serde::{Deserialize, Serialize};

use crate::domain::error::AppError;

/// Resolved decimal mark used when parsing numeric cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecimalSeparator {
    #[serde(rename = ".", alias = "dot")]
    Dot,
    #[serde(rename = ",", alias = "comma")]
    Comma,
}

impl DecimalSeparator {
    pub fn as_char(self) -> char {
        match self {
            DecimalSeparator::Dot => '.',
            DecimalSeparator::Comma => ',',
        }
    }

    /// The digit-grouping mark that pairs with this decimal mark
    pub fn group_char(self) -> char {
        match self {
            DecimalSeparator::Dot => ',',
            DecimalSeparator::Comma => '.',
        }
    }
}

/// Caller-supplied decimal convention. `Auto` asks the inference engine to
/// take a majority vote over sampled cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecimalHint {
    #[serde(rename = ".", alias = "dot")]
    Dot,
    #[serde(rename = ",", alias = "comma")]
    Comma,
    #[serde(rename = "auto")]
    Auto,
}

impl DecimalHint {
    /// Explicit separator, or `None` when autodetection should run
    pub fn explicit(self) -> Option<DecimalSeparator> {
        match self {
            DecimalHint::Dot => Some(DecimalSeparator::Dot),
            DecimalHint::Comma => Some(DecimalSeparator::Comma),
            DecimalHint::Auto => None,
        }
    }
}

impl Default for DecimalHint {
    fn default() -> Self {
        DecimalHint::Dot
    }
}

impl std::str::FromStr for DecimalHint {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "." | "dot" => Ok(DecimalHint::Dot),
            "," | "comma" => Ok(DecimalHint::Comma),
            "auto" => Ok(DecimalHint::Auto),
            other => Err(AppError::ValidationError(format!(
                "decimal_separator must be '.', ',' or 'auto', got '{}'",
                other
            ))),
        }
    }
}

/// Configuration for the ingestion pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Decimal mark for numeric cells (default: '.')
    pub decimal_separator: DecimalHint,

    /// Drop rows whose field count differs from the header instead of
    /// padding/truncating them (default: false)
    pub strict_row_length: bool,

    /// Number of non-empty lines inspected by the separator detector (default: 5)
    pub sample_lines_for_detection: usize,

    /// Maximum number of cells sampled for decimal autodetection (default: 1000)
    pub max_inference_sample: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            decimal_separator: DecimalHint::Dot,
            strict_row_length: false,
            sample_lines_for_detection: 5,
            max_inference_sample: 1000,
        }
    }
}

impl IngestConfig {
    pub fn with_decimal_separator(mut self, hint: DecimalHint) -> Self {
        self.decimal_separator = hint;
        self
    }

    pub fn with_strict_row_length(mut self, strict: bool) -> Self {
        self.strict_row_length = strict;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), AppError> {
        if self.sample_lines_for_detection == 0 {
            return Err(AppError::ValidationError(
                "sample_lines_for_detection must be > 0".to_string(),
            ));
        }
        if self.max_inference_sample == 0 {
            return Err(AppError::ValidationError(
                "max_inference_sample must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IngestConfig::default();
        assert_eq!(config.decimal_separator, DecimalHint::Dot);
        assert!(!config.strict_row_length);
        assert_eq!(config.sample_lines_for_detection, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_hint_parsing() {
        assert_eq!(",".parse::<DecimalHint>().unwrap(), DecimalHint::Comma);
        assert_eq!("Dot".parse::<DecimalHint>().unwrap(), DecimalHint::Dot);
        assert_eq!("auto".parse::<DecimalHint>().unwrap(), DecimalHint::Auto);
        assert!("x".parse::<DecimalHint>().is_err());
    }

    #[test]
    fn test_rejects_zero_sample() {
        let config = IngestConfig {
            sample_lines_for_detection: 0,
            ..IngestConfig::default()
        };
        assert!(matches!(config.validate(), Err(AppError::ValidationError(_))));
    }
}
