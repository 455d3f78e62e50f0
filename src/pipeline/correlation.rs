//! Correlation-based feature reduction
//!
//! Removes duplicate and collinear feature columns. Pairs are visited in
//! index order and the lower-index column of a collinear pair is always the
//! one kept, so the result depends on column order.

use faer::Mat;
use log::debug;
use rayon::prelude::*;
use serde::Serialize;

use super::error::{PipelineError, Result};
use super::frame::{ColumnMask, TableView};

/// Default absolute correlation at or above which a pair is collinear.
pub const DEFAULT_CORRELATION_THRESHOLD: f64 = 0.9;

/// Represents a correlated pair of features
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelatedPair {
    /// Lower-index feature, retained
    pub feature1: String,
    /// Higher-index feature, removed
    pub feature2: String,
    /// Pearson correlation (1.0 for exact duplicates)
    pub correlation: f64,
}

/// Outcome of one reduction pass.
#[derive(Debug, Clone)]
pub struct FeatureReduction {
    /// Retained columns, over the table's original column count
    pub mask: ColumnMask,
    /// Pairs that caused a removal, in the order they were found
    pub dropped: Vec<CorrelatedPair>,
}

impl FeatureReduction {
    /// Names of the removed features.
    pub fn dropped_features(&self) -> Vec<String> {
        self.dropped.iter().map(|p| p.feature2.clone()).collect()
    }

    /// Project a view (train, label or test) onto the retained columns.
    pub fn apply<'a>(&self, view: &TableView<'a>) -> TableView<'a> {
        view.project(&self.mask)
    }
}

/// Mark collinear feature columns for removal.
///
/// For every pair `(i, j)` with `i < j` in view column order, column `j` is
/// removed when `|corr(i, j)| >= threshold` (or the two columns are
/// identical) and `j` is not already removed. Column `i` wins even if it was
/// removed by an earlier pair. Undefined correlations (a constant column)
/// never count as collinear.
///
/// Only `x` is inspected; apply the returned mask to test data.
pub fn reduce_features(x: &TableView<'_>, threshold: f64) -> Result<FeatureReduction> {
    if !(0.0..=1.0).contains(&threshold) || threshold.is_nan() {
        return Err(PipelineError::InvalidConfig(format!(
            "correlation threshold must be between 0.0 and 1.0, got {}",
            threshold
        )));
    }

    let mut mask = ColumnMask::from_view(x);
    let num_cols = x.n_cols();
    if num_cols < 2 {
        return Ok(FeatureReduction {
            mask,
            dropped: Vec::new(),
        });
    }

    let columns: Vec<Vec<f64>> = (0..num_cols).map(|c| x.column_values(c)).collect();
    let corr = correlation_matrix(x);

    let mut removed = vec![false; num_cols];
    let mut dropped = Vec::new();

    for i in 0..num_cols {
        for j in (i + 1)..num_cols {
            if removed[j] {
                continue;
            }

            let c = corr[(i, j)];
            let collinear = if columns[i] == columns[j] {
                true
            } else if c.is_nan() {
                debug!(
                    "Correlation of '{}' and '{}' is undefined; keeping both",
                    x.column_name(i),
                    x.column_name(j)
                );
                false
            } else {
                c.abs() >= threshold
            };

            if collinear {
                removed[j] = true;
                mask.drop_column(x.col_ids()[j]);
                dropped.push(CorrelatedPair {
                    feature1: x.column_name(i).to_string(),
                    feature2: x.column_name(j).to_string(),
                    correlation: if c.is_nan() { 1.0 } else { c },
                });
            }
        }
    }

    debug!(
        "Correlation reduction kept {} of {} features",
        mask.retained(),
        num_cols
    );

    Ok(FeatureReduction { mask, dropped })
}

/// Compute the Pearson correlation matrix of a view's columns using matrix
/// operations.
///
/// Algorithm:
/// 1. Standardize every column: Z = (X - mean) / (std * sqrt(n))
/// 2. Compute correlation matrix: R = Z^T * Z
///
/// Entries involving a constant column are NaN.
pub fn correlation_matrix(x: &TableView<'_>) -> Mat<f64> {
    let n_rows = x.n_rows();
    let n_cols = x.n_cols();

    let standardized_cols: Vec<Option<Vec<f64>>> = (0..n_cols)
        .into_par_iter()
        .map(|c| standardize(&x.column_values(c)))
        .collect();

    let mut z = Mat::<f64>::zeros(n_rows, n_cols);
    for (col_idx, col) in standardized_cols.iter().enumerate() {
        if let Some(values) = col {
            for (row_idx, &val) in values.iter().enumerate() {
                z[(row_idx, col_idx)] = val;
            }
        }
    }

    let mut corr = z.transpose() * &z;

    for i in 0..n_cols {
        for j in 0..n_cols {
            if standardized_cols[i].is_none() || standardized_cols[j].is_none() {
                corr[(i, j)] = f64::NAN;
            } else {
                corr[(i, j)] = corr[(i, j)].clamp(-1.0, 1.0);
            }
        }
    }

    corr
}

/// Pearson correlation of two equal-length series using a single-pass
/// Welford update. `None` when either series is constant or the lengths
/// differ.
pub fn pearson_correlation(a: &[f64], b: &[f64]) -> Option<f64> {
    let n = a.len();
    if n == 0 || n != b.len() {
        return None;
    }

    let mut count = 0.0;
    let mut mean_x = 0.0;
    let mut mean_y = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    let mut cov_xy = 0.0;

    for (&x, &y) in a.iter().zip(b) {
        count += 1.0;
        let dx = x - mean_x;
        let dy = y - mean_y;
        mean_x += dx / count;
        mean_y += dy / count;
        var_x += dx * (x - mean_x);
        var_y += dy * (y - mean_y);
        cov_xy += dx * (y - mean_y);
    }

    if var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }

    Some((cov_xy / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Scale a column so that the dot product of two scaled columns is their
/// correlation.
fn standardize(values: &[f64]) -> Option<Vec<f64>> {
    let n = values.len();
    if n == 0 {
        return None;
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let sum_sq_dev: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    if sum_sq_dev <= 0.0 || values.iter().all(|&v| v == values[0]) {
        return None; // Constant column - correlation undefined
    }

    let norm = sum_sq_dev.sqrt();
    Some(values.iter().map(|v| (v - mean) / norm).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pearson_perfect_positive() {
        let r = pearson_correlation(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0]).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_constant_is_none() {
        assert!(pearson_correlation(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]).is_none());
    }

    #[test]
    fn test_standardize_constant_is_none() {
        assert!(standardize(&[3.0, 3.0, 3.0]).is_none());
        assert!(standardize(&[]).is_none());
    }
}
