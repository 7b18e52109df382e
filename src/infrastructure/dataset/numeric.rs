// ============================================================
// NUMERIC CELL PARSING
// ============================================================
// Decimal-convention aware number parsing and decimal-mark voting

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::dataset::DecimalSeparator;

static DOT_PLAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").unwrap());

static DOT_GROUPED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d{1,3}(,\d{3})+(\.\d+)?$").unwrap());

static COMMA_PLAIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?(\d+,?\d*|,\d+)$").unwrap());

static COMMA_GROUPED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d{1,3}(\.\d{3})+(,\d+)?$").unwrap());

// A single mark followed by exactly three digits reads either way
static AMBIGUOUS_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d{1,3}[.,]\d{3}$").unwrap());

static COMMA_DECIMAL_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+,\d+|\d{1,3}(\.\d{3})+,\d+)$").unwrap());

static DOT_DECIMAL_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+\.\d+|\d{1,3}(,\d{3})+\.\d+)$").unwrap());

/// Parse a cell as a number under the given decimal convention.
/// Digit-group marks of the opposite kind are accepted in the classic
/// three-digit layout only.
pub fn parse_number(raw: &str, decimal: DecimalSeparator) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let canonical = match decimal {
        DecimalSeparator::Dot => {
            if DOT_PLAIN.is_match(s) {
                s.to_string()
            } else if DOT_GROUPED.is_match(s) {
                s.replace(',', "")
            } else {
                return None;
            }
        }
        DecimalSeparator::Comma => {
            if COMMA_PLAIN.is_match(s) {
                s.replace(',', ".")
            } else if COMMA_GROUPED.is_match(s) {
                s.replace('.', "").replace(',', ".")
            } else {
                return None;
            }
        }
    };

    canonical.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a cell as an integer: a number with no fractional part that fits i64
pub fn parse_integer(raw: &str, decimal: DecimalSeparator) -> Option<i64> {
    let s = raw.trim();
    let digits: String = s.chars().filter(|&c| c != decimal.group_char()).collect();
    if let Ok(n) = digits.parse::<i64>() {
        // Only accept the stripped form if the original was a valid number
        return parse_number(s, decimal).map(|_| n);
    }

    let n = parse_number(s, decimal)?;
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        Some(n as i64)
    } else {
        None
    }
}

/// Majority vote over cells that only make sense under one convention.
/// Ties and an absence of evidence resolve to `.`.
pub fn detect_decimal_separator<'a>(
    cells: impl Iterator<Item = &'a str>,
    limit: usize,
) -> DecimalSeparator {
    let mut comma_votes = 0usize;
    let mut dot_votes = 0usize;

    for cell in cells.map(str::trim).filter(|c| !c.is_empty()).take(limit) {
        if AMBIGUOUS_GROUP.is_match(cell) {
            continue;
        }
        if COMMA_DECIMAL_ONLY.is_match(cell) {
            comma_votes += 1;
        } else if DOT_DECIMAL_ONLY.is_match(cell) {
            dot_votes += 1;
        }
    }

    if comma_votes > dot_votes {
        DecimalSeparator::Comma
    } else {
        DecimalSeparator::Dot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_convention() {
        let dot = DecimalSeparator::Dot;
        assert_eq!(parse_number("3.14", dot), Some(3.14));
        assert_eq!(parse_number("-2", dot), Some(-2.0));
        assert_eq!(parse_number("1,234.5", dot), Some(1234.5));
        assert_eq!(parse_number("1e3", dot), Some(1000.0));
        assert_eq!(parse_number("3,14", dot), None);
        assert_eq!(parse_number("N/A", dot), None);
        assert_eq!(parse_number("inf", dot), None);
    }

    #[test]
    fn test_comma_convention() {
        let comma = DecimalSeparator::Comma;
        assert_eq!(parse_number("3,14", comma), Some(3.14));
        assert_eq!(parse_number("1.234,5", comma), Some(1234.5));
        assert_eq!(parse_number("1.234", comma), Some(1234.0));
        assert_eq!(parse_number("3.14", comma), None);
    }

    #[test]
    fn test_integers() {
        let dot = DecimalSeparator::Dot;
        assert_eq!(parse_integer("42", dot), Some(42));
        assert_eq!(parse_integer("1,234", dot), Some(1234));
        assert_eq!(parse_integer("7.0", dot), Some(7));
        assert_eq!(parse_integer("7.5", dot), None);
        assert_eq!(parse_integer("1,2,3", dot), None);
        assert_eq!(parse_integer("9223372036854775807", dot), Some(i64::MAX));
        assert_eq!(parse_integer("1.234", DecimalSeparator::Comma), Some(1234));
    }

    #[test]
    fn test_decimal_vote() {
        let cells = ["12,5", "3,25", "7", "1.234", "name"];
        assert_eq!(
            detect_decimal_separator(cells.iter().copied(), 100),
            DecimalSeparator::Comma
        );

        let cells = ["12.5", "3,25", "0.75"];
        assert_eq!(
            detect_decimal_separator(cells.iter().copied(), 100),
            DecimalSeparator::Dot
        );

        // Only ambiguous groups: no evidence either way
        let cells = ["1,234", "5.678"];
        assert_eq!(
            detect_decimal_separator(cells.iter().copied(), 100),
            DecimalSeparator::Dot
        );
    }
}
