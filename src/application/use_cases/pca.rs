// ============================================================
// PRINCIPAL COMPONENT ANALYSIS
// ============================================================
// Standardize the numeric columns, eigen-decompose their covariance
// and project each complete row onto the leading components

use serde::Serialize;
use tracing::debug;

use crate::domain::dataset::Table;
use crate::domain::error::{AppError, Result};

pub const DEFAULT_COMPONENTS: usize = 2;

const MAX_SWEEPS: usize = 100;
const OFF_DIAGONAL_EPS: f64 = 1e-20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PcaResult {
    /// Numeric columns that entered the analysis, in table order
    pub columns: Vec<String>,
    /// Table rows with a value in every analysed column
    pub rows: Vec<usize>,
    /// Share of total variance per component, largest first
    pub explained_variance_ratio: Vec<f64>,
    /// One weight per analysed column for each component
    pub loadings: Vec<Vec<f64>>,
    /// Projection of each row in `rows` onto the components
    pub scores: Vec<Vec<f64>>,
}

/// Run PCA over every Integer and Float column of the table
pub fn principal_components(table: &Table, components: usize) -> Result<PcaResult> {
    let numeric: Vec<(String, Vec<Option<f64>>)> = table
        .columns()
        .iter()
        .filter_map(|c| c.numeric_values().map(|v| (c.name().to_string(), v)))
        .collect();

    if numeric.len() < 2 {
        return Err(AppError::ValidationError(
            "PCA requires at least two numeric columns".to_string(),
        ));
    }
    let width = numeric.len();
    if components == 0 || components > width {
        return Err(AppError::ValidationError(format!(
            "components must be between 1 and {}, got {}",
            width, components
        )));
    }

    let rows: Vec<usize> = (0..table.row_count())
        .filter(|&row| numeric.iter().all(|(_, values)| values[row].is_some()))
        .collect();
    if rows.len() < 2 {
        return Err(AppError::ValidationError(
            "PCA requires at least two rows with every numeric value present".to_string(),
        ));
    }

    let standardized: Vec<Vec<f64>> = numeric
        .iter()
        .map(|(_, values)| standardize(rows.iter().filter_map(|&r| values[r]).collect()))
        .collect();

    let n = rows.len() as f64;
    let mut covariance = vec![vec![0.0; width]; width];
    for i in 0..width {
        for j in i..width {
            let c = standardized[i]
                .iter()
                .zip(&standardized[j])
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / (n - 1.0);
            covariance[i][j] = c;
            covariance[j][i] = c;
        }
    }

    let (eigenvalues, eigenvectors) = jacobi_eigen(covariance);

    let mut order: Vec<usize> = (0..width).collect();
    order.sort_by(|&a, &b| eigenvalues[b].total_cmp(&eigenvalues[a]));

    // Rounding can leave tiny negative eigenvalues on rank-deficient input
    let total: f64 = eigenvalues.iter().map(|v| v.max(0.0)).sum();

    let mut explained_variance_ratio = Vec::with_capacity(components);
    let mut loadings = Vec::with_capacity(components);
    for &k in order.iter().take(components) {
        let mut vector: Vec<f64> = (0..width).map(|i| eigenvectors[i][k]).collect();
        orient(&mut vector);
        loadings.push(vector);
        explained_variance_ratio.push(if total > 0.0 {
            eigenvalues[k].max(0.0) / total
        } else {
            0.0
        });
    }

    let scores = (0..rows.len())
        .map(|r| {
            loadings
                .iter()
                .map(|vector| (0..width).map(|i| standardized[i][r] * vector[i]).sum())
                .collect()
        })
        .collect();

    debug!(
        columns = width,
        rows = rows.len(),
        components,
        "Principal components computed"
    );

    Ok(PcaResult {
        columns: numeric.into_iter().map(|(name, _)| name).collect(),
        rows,
        explained_variance_ratio,
        loadings,
        scores,
    })
}

/// Zero mean and unit population variance; a constant column maps to zeros
fn standardize(values: Vec<f64>) -> Vec<f64> {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();

    if std == 0.0 {
        return vec![0.0; values.len()];
    }
    values.into_iter().map(|v| (v - mean) / std).collect()
}

/// Flip the vector so its largest-magnitude weight is positive
fn orient(vector: &mut [f64]) {
    let pivot = vector
        .iter()
        .copied()
        .fold(0.0_f64, |best, v| if v.abs() > best.abs() { v } else { best });
    if pivot < 0.0 {
        vector.iter_mut().for_each(|v| *v = -*v);
    }
}

/// Cyclic Jacobi rotations on a symmetric matrix. Returns the eigenvalues
/// and a matrix whose columns are the matching unit eigenvectors.
fn jacobi_eigen(mut a: Vec<Vec<f64>>) -> (Vec<f64>, Vec<Vec<f64>>) {
    let n = a.len();
    let mut v: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    for _ in 0..MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .map(|(i, j)| a[i][j] * a[i][j])
            .sum();
        if off < OFF_DIAGONAL_EPS {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                if a[p][q] == 0.0 {
                    continue;
                }
                let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
                let sign = if theta >= 0.0 { 1.0 } else { -1.0 };
                let t = sign / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let (akp, akq) = (a[k][p], a[k][q]);
                    a[k][p] = c * akp - s * akq;
                    a[k][q] = s * akp + c * akq;
                }
                for k in 0..n {
                    let (apk, aqk) = (a[p][k], a[q][k]);
                    a[p][k] = c * apk - s * aqk;
                    a[q][k] = s * apk + c * aqk;
                }
                for row in v.iter_mut() {
                    let (vkp, vkq) = (row[p], row[q]);
                    row[p] = c * vkp - s * vkq;
                    row[q] = s * vkp + c * vkq;
                }
            }
        }
    }

    ((0..n).map(|i| a[i][i]).collect(), v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::Column;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_perfectly_correlated_columns_load_on_one_component() {
        let table = Table::new(vec![
            Column::integer("x", vec![Some(1), Some(2), None, Some(3)]),
            Column::text("label", vec![Some("a".into()), None, None, None]),
            Column::float("y", vec![Some(2.0), Some(4.0), Some(5.0), Some(6.0)]),
        ])
        .unwrap();

        let pca = principal_components(&table, 2).unwrap();

        assert_eq!(pca.columns, vec!["x", "y"]);
        assert_eq!(pca.rows, vec![0, 1, 3]);
        assert!(approx(pca.explained_variance_ratio[0], 1.0));
        assert!(approx(pca.explained_variance_ratio[1], 0.0));

        let w = std::f64::consts::FRAC_1_SQRT_2;
        assert!(approx(pca.loadings[0][0], w) && approx(pca.loadings[0][1], w));

        // Each standardized value is ±sqrt(3/2); PC1 sums them over sqrt(2)
        let edge = 3.0_f64.sqrt();
        let first: Vec<f64> = pca.scores.iter().map(|s| s[0]).collect();
        assert!(approx(first[0], -edge) && approx(first[1], 0.0) && approx(first[2], edge));
    }

    #[test]
    fn test_ratios_are_sorted_and_sum_to_one() {
        let table = Table::new(vec![
            Column::float("a", vec![Some(2.5), Some(0.5), Some(2.2), Some(1.9), Some(3.1), Some(2.3)]),
            Column::float("b", vec![Some(2.4), Some(0.7), Some(2.9), Some(2.2), Some(3.0), Some(2.7)]),
            Column::integer("c", vec![Some(1), Some(-1), Some(4), Some(0), Some(2), Some(7)]),
        ])
        .unwrap();

        let pca = principal_components(&table, 3).unwrap();
        let ratios = &pca.explained_variance_ratio;

        assert!(approx(ratios.iter().sum::<f64>(), 1.0));
        assert!(ratios.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(pca.scores.len(), 6);
        for vector in &pca.loadings {
            assert!(approx(vector.iter().map(|v| v * v).sum::<f64>(), 1.0));
        }
    }

    #[test]
    fn test_constant_column_gets_no_variance() {
        let table = Table::new(vec![
            Column::integer("flat", vec![Some(5), Some(5), Some(5)]),
            Column::integer("rise", vec![Some(1), Some(2), Some(3)]),
        ])
        .unwrap();

        let pca = principal_components(&table, 2).unwrap();
        assert!(approx(pca.explained_variance_ratio[0], 1.0));
        assert!(approx(pca.loadings[0][1], 1.0));
    }

    #[test]
    fn test_rejects_insufficient_input() {
        let one_numeric = Table::new(vec![
            Column::integer("x", vec![Some(1), Some(2)]),
            Column::text("t", vec![Some("a".into()), Some("b".into())]),
        ])
        .unwrap();
        assert!(matches!(
            principal_components(&one_numeric, 1),
            Err(AppError::ValidationError(_))
        ));

        let sparse = Table::new(vec![
            Column::integer("x", vec![Some(1), None]),
            Column::integer("y", vec![Some(1), Some(2)]),
        ])
        .unwrap();
        assert!(matches!(
            principal_components(&sparse, 1),
            Err(AppError::ValidationError(_))
        ));

        let table = Table::new(vec![
            Column::integer("x", vec![Some(1), Some(2)]),
            Column::integer("y", vec![Some(3), Some(1)]),
        ])
        .unwrap();
        assert!(principal_components(&table, 0).is_err());
        assert!(principal_components(&table, 3).is_err());
    }
}
