// ============================================================
// TYPE INFERENCE ENGINE
// ============================================================
// Resolve one kind per column: all present values must fit, or the
// column stays Text

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::numeric::{parse_integer, parse_number};
use crate::domain::dataset::{
    Column, ColumnKind, DatePattern, DecimalSeparator, RawGrid, Table, TimestampSource,
};
use crate::domain::error::AppError;

const EPOCH_SECONDS: std::ops::Range<f64> = 1e9..2e9;
const EPOCH_MILLIS: std::ops::Range<f64> = 1e12..2e12;

static COMPACT_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{8}$").unwrap());

static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

static DAY_MONTH_YEAR_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{4} \d{1,2}:\d{2}:\d{2}$").unwrap());

/// Why a column fell back to Text. Logged, never surfaced as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceOutcome {
    Resolved(ColumnKind),
    /// No values present at all
    Empty,
    /// Values present, but no specific kind fits every one of them
    Ambiguous,
}

/// Column-wise type inference under one decimal convention
pub struct TypeInferenceEngine {
    decimal: DecimalSeparator,
}

impl Default for TypeInferenceEngine {
    fn default() -> Self {
        Self::new(DecimalSeparator::Dot)
    }
}

impl TypeInferenceEngine {
    pub fn new(decimal: DecimalSeparator) -> Self {
        Self { decimal }
    }

    /// Type every column of a grid
    pub fn infer_table(&self, grid: RawGrid) -> Result<Table, AppError> {
        let columns = grid
            .into_columns()
            .into_iter()
            .map(|(name, values)| self.infer_column(name, &values).0)
            .collect();
        Table::new(columns)
    }

    /// Type a single column. Candidates are tried in a fixed order and the
    /// first one that accepts every present value wins:
    /// epoch seconds, epoch milliseconds, date patterns, integer, float, text.
    pub fn infer_column(&self, name: String, values: &[String]) -> (Column, InferenceOutcome) {
        let present: Vec<(usize, &str)> = values
            .iter()
            .enumerate()
            .map(|(idx, v)| (idx, v.trim()))
            .filter(|(_, v)| !v.is_empty())
            .collect();
        let len = values.len();

        if present.is_empty() {
            debug!(column = %name, "Column has no values, keeping Text");
            return (Column::text(name, vec![None; len]), InferenceOutcome::Empty);
        }

        let numbers: Option<Vec<f64>> = present
            .iter()
            .map(|(_, v)| parse_number(v, self.decimal))
            .collect();

        if let Some(numbers) = &numbers {
            for (range, source) in [
                (EPOCH_SECONDS, TimestampSource::EpochSeconds),
                (EPOCH_MILLIS, TimestampSource::EpochMillis),
            ] {
                if !numbers.iter().all(|n| range.contains(n)) {
                    continue;
                }
                let converted: Option<Vec<NaiveDateTime>> = numbers
                    .iter()
                    .map(|&n| match source {
                        TimestampSource::EpochMillis => from_epoch_seconds(n / 1000.0),
                        _ => from_epoch_seconds(n),
                    })
                    .collect();
                if let Some(converted) = converted {
                    let column = Column::timestamp(name, source, scatter(len, &present, converted));
                    return self.resolved(column);
                }
            }
        }

        for pattern in DatePattern::ALL {
            let parsed: Option<Vec<NaiveDateTime>> = present
                .iter()
                .map(|(_, v)| parse_date(v, pattern))
                .collect();
            if let Some(parsed) = parsed {
                let source = TimestampSource::Pattern(pattern);
                let column = Column::timestamp(name, source, scatter(len, &present, parsed));
                return self.resolved(column);
            }
        }

        let integers: Option<Vec<i64>> = present
            .iter()
            .map(|(_, v)| parse_integer(v, self.decimal))
            .collect();
        if let Some(integers) = integers {
            return self.resolved(Column::integer(name, scatter(len, &present, integers)));
        }

        if let Some(numbers) = numbers {
            return self.resolved(Column::float(name, scatter(len, &present, numbers)));
        }

        debug!(column = %name, "Column inference ambiguous, keeping Text");
        let text = values
            .iter()
            .map(|v| if v.trim().is_empty() { None } else { Some(v.clone()) })
            .collect();
        (Column::text(name, text), InferenceOutcome::Ambiguous)
    }

    fn resolved(&self, column: Column) -> (Column, InferenceOutcome) {
        let kind = column.kind();
        debug!(column = column.name(), %kind, "Column kind resolved");
        (column, InferenceOutcome::Resolved(kind))
    }
}

/// Put converted values back at their original row positions
fn scatter<T>(len: usize, present: &[(usize, &str)], values: Vec<T>) -> Vec<Option<T>> {
    let mut out: Vec<Option<T>> = std::iter::repeat_with(|| None).take(len).collect();
    for ((idx, _), value) in present.iter().zip(values) {
        out[*idx] = Some(value);
    }
    out
}

fn from_epoch_seconds(seconds: f64) -> Option<NaiveDateTime> {
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos).map(|dt| dt.naive_utc())
}

fn parse_date(value: &str, pattern: DatePattern) -> Option<NaiveDateTime> {
    let shape = match pattern {
        DatePattern::Compact => &COMPACT_DATE,
        DatePattern::IsoDate => &ISO_DATE,
        DatePattern::DayMonthYearTime => &DAY_MONTH_YEAR_TIME,
    };
    if !shape.is_match(value) {
        return None;
    }

    if pattern.has_time() {
        NaiveDateTime::parse_from_str(value, pattern.format()).ok()
    } else {
        NaiveDate::parse_from_str(value, pattern.format())
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }
}
