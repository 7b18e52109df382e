// ============================================================
// DATASET INFRASTRUCTURE LAYER
// ============================================================
// Decoding, delimiter detection, normalization, parsing and type
// inference for uploaded tabular files

mod decoding;
mod normalizer;
mod numeric;
mod separator_detector;
mod tabular_parser;
mod type_inference;
mod xlsx_reader;

pub use decoding::{decode_document, DecodedText};
pub use normalizer::{normalize, strip_thousands_separators, NormalizedText};
pub use numeric::{detect_decimal_separator, parse_integer, parse_number};
pub use separator_detector::SeparatorDetector;
pub use tabular_parser::TabularParser;
pub use type_inference::{InferenceOutcome, TypeInferenceEngine};
pub use xlsx_reader::read_first_sheet;
