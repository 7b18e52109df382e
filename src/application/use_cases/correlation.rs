// ============================================================
// LAGGED CORRELATION
// ============================================================
// Autocorrelation and cross-correlation of numeric columns

use serde::Serialize;

use crate::domain::dataset::Table;
use crate::domain::error::{AppError, Result};

pub const DEFAULT_MAX_LAG: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LagCorrelation {
    pub lag: usize,
    /// `None` when fewer than two pairs are present or a side is constant
    pub value: Option<f64>,
}

/// Correlation of a column with itself shifted by 1, 2, ... lags
pub fn autocorrelation(table: &Table, column: &str, max_lag: usize) -> Result<Vec<LagCorrelation>> {
    let series = numeric_column(table, column)?;
    Ok(lagged(&series, &series, max_lag))
}

/// Correlation of `a[t]` with `b[t - lag]`
pub fn cross_correlation(
    table: &Table,
    a: &str,
    b: &str,
    max_lag: usize,
) -> Result<Vec<LagCorrelation>> {
    let left = numeric_column(table, a)?;
    let right = numeric_column(table, b)?;
    Ok(lagged(&left, &right, max_lag))
}

fn numeric_column(table: &Table, name: &str) -> Result<Vec<Option<f64>>> {
    let column = table.column(name)?;
    column.numeric_values().ok_or_else(|| {
        AppError::ValidationError(format!(
            "column '{}' is {}, a numeric column is required",
            name,
            column.kind()
        ))
    })
}

// Lags run over 1..min(len, max_lag)
fn lagged(a: &[Option<f64>], b: &[Option<f64>], max_lag: usize) -> Vec<LagCorrelation> {
    let upper = a.len().min(max_lag);
    (1..upper)
        .map(|lag| {
            let pairs: Vec<(f64, f64)> = (lag..a.len())
                .filter_map(|t| Some((a[t]?, b[t - lag]?)))
                .collect();
            LagCorrelation {
                lag,
                value: pearson(&pairs),
            }
        })
        .collect()
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        None
    } else {
        Some(cov / denom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::Column;

    fn close(actual: Option<f64>, expected: f64) -> bool {
        actual.map_or(false, |v| (v - expected).abs() < 1e-9)
    }

    #[test]
    fn test_autocorrelation_of_a_line() {
        let table = Table::new(vec![Column::integer(
            "v",
            (1..=6).map(Some).collect(),
        )])
        .unwrap();

        let lags = autocorrelation(&table, "v", 4).unwrap();
        assert_eq!(lags.iter().map(|l| l.lag).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(lags.iter().all(|l| close(l.value, 1.0)));
    }

    #[test]
    fn test_lag_count_bounded_by_rows() {
        let table = Table::new(vec![Column::float("v", vec![Some(1.0), Some(2.0), Some(4.0)])])
            .unwrap();
        let lags = autocorrelation(&table, "v", DEFAULT_MAX_LAG).unwrap();
        assert_eq!(lags.len(), 2);
        // Two pairs at lag 1, one pair at lag 2
        assert!(close(lags[0].value, 1.0));
        assert_eq!(lags[1].value, None);
    }

    #[test]
    fn test_cross_correlation_inverse_series() {
        let table = Table::new(vec![
            Column::integer("a", vec![Some(1), Some(2), Some(3), Some(4)]),
            Column::integer("b", vec![Some(8), Some(6), Some(4), Some(2)]),
        ])
        .unwrap();

        let lags = cross_correlation(&table, "a", "b", 10).unwrap();
        assert_eq!(lags.len(), 3);
        assert!(close(lags[0].value, -1.0));
    }

    #[test]
    fn test_missing_values_skip_pairs() {
        let table = Table::new(vec![Column::float(
            "v",
            vec![Some(1.0), None, Some(3.0), Some(5.0), Some(7.0)],
        )])
        .unwrap();
        let lags = autocorrelation(&table, "v", 3).unwrap();
        assert!(close(lags[0].value, 1.0));
    }

    #[test]
    fn test_requires_numeric_column() {
        let table = Table::new(vec![Column::text("t", vec![Some("a".to_string())])]).unwrap();
        assert!(matches!(
            autocorrelation(&table, "t", 5),
            Err(AppError::ValidationError(_))
        ));
        assert_eq!(
            autocorrelation(&table, "missing", 5),
            Err(AppError::ColumnNotFound("missing".to_string()))
        );
    }
}
