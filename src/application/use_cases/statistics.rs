// ============================================================
// COLUMN STATISTICS
// ============================================================

use serde::Serialize;

use crate::domain::dataset::{ColumnKind, Table};

/// Summary of one column. Numeric fields are only filled for Integer and
/// Float columns with at least one present value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub kind: ColumnKind,
    /// Present (non-missing) cells
    pub count: usize,
    pub sum: Option<f64>,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub median: Option<f64>,
}

/// Describe every column of a table, in column order
pub fn describe(table: &Table) -> Vec<ColumnSummary> {
    table
        .columns()
        .iter()
        .map(|column| {
            let mut summary = ColumnSummary {
                name: column.name().to_string(),
                kind: column.kind(),
                count: column.present_count(),
                sum: None,
                mean: None,
                min: None,
                max: None,
                median: None,
            };

            let mut values: Vec<f64> = match column.numeric_values() {
                Some(values) => values.into_iter().flatten().collect(),
                None => return summary,
            };
            if values.is_empty() {
                return summary;
            }

            values.sort_by(|a, b| a.total_cmp(b));
            let sum: f64 = values.iter().sum();
            let n = values.len();

            summary.sum = Some(sum);
            summary.mean = Some(sum / n as f64);
            summary.min = values.first().copied();
            summary.max = values.last().copied();
            summary.median = Some(if n % 2 == 0 {
                (values[n / 2 - 1] + values[n / 2]) / 2.0
            } else {
                values[n / 2]
            });
            summary
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::Column;

    #[test]
    fn test_numeric_summary() {
        let table = Table::new(vec![
            Column::integer("n", vec![Some(4), None, Some(1), Some(3), Some(2)]),
            Column::float("f", vec![Some(1.5), Some(0.5), None, None, Some(4.0)]),
        ])
        .unwrap();

        let summaries = describe(&table);
        let n = &summaries[0];
        assert_eq!(n.count, 4);
        assert_eq!(n.sum, Some(10.0));
        assert_eq!(n.mean, Some(2.5));
        assert_eq!(n.min, Some(1.0));
        assert_eq!(n.max, Some(4.0));
        assert_eq!(n.median, Some(2.5));

        let f = &summaries[1];
        assert_eq!(f.kind, ColumnKind::Float);
        assert_eq!(f.median, Some(1.5));
    }

    #[test]
    fn test_text_and_empty_columns_only_count() {
        let table = Table::new(vec![
            Column::text("t", vec![Some("a".to_string()), None]),
            Column::integer("e", vec![None, None]),
        ])
        .unwrap();

        let summaries = describe(&table);
        assert_eq!(summaries[0].count, 1);
        assert_eq!(summaries[0].mean, None);
        assert_eq!(summaries[1].count, 0);
        assert_eq!(summaries[1].sum, None);
    }
}
