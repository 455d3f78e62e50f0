//! Prediction quality metrics
//!
//! Fold-level metrics compare the flattened prediction matrix with the
//! flattened ground truth. Row-level diagnostics compare one subject's
//! predicted vector with its true vector.

use serde::Serialize;

use crate::pipeline::correlation::pearson_correlation;
use crate::pipeline::{Table, TableView};

/// Mean squared error of two equal-length series (NaN when empty).
pub fn mean_squared_error(predicted: &[f64], actual: &[f64]) -> f64 {
    debug_assert_eq!(predicted.len(), actual.len());
    if predicted.is_empty() {
        return f64::NAN;
    }
    predicted
        .iter()
        .zip(actual)
        .map(|(p, a)| (p - a) * (p - a))
        .sum::<f64>()
        / predicted.len() as f64
}

/// Mean absolute error of two equal-length series (NaN when empty).
pub fn mean_absolute_error(predicted: &[f64], actual: &[f64]) -> f64 {
    debug_assert_eq!(predicted.len(), actual.len());
    if predicted.is_empty() {
        return f64::NAN;
    }
    predicted
        .iter()
        .zip(actual)
        .map(|(p, a)| (p - a).abs())
        .sum::<f64>()
        / predicted.len() as f64
}

/// Pearson correlation; NaN when either series is constant.
pub fn pearson_r(predicted: &[f64], actual: &[f64]) -> f64 {
    pearson_correlation(predicted, actual).unwrap_or(f64::NAN)
}

/// Mean and population standard deviation of a metric across folds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aggregate {
    pub mean: f64,
    pub std: f64,
}

impl Aggregate {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                mean: f64::NAN,
                std: f64::NAN,
            };
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        Self {
            mean,
            std: variance.sqrt(),
        }
    }
}

/// Per-subject diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowMetrics {
    /// Original table row id of the subject
    pub row_id: usize,
    pub mae: f64,
    pub pearson_r: f64,
}

impl RowMetrics {
    /// MAE and Pearson r of every predicted row against its true row.
    pub fn per_row(predicted: &Table, actual: &TableView<'_>) -> Vec<RowMetrics> {
        let predicted = predicted.view();
        (0..actual.n_rows())
            .map(|r| {
                let p = predicted.row_values(r);
                let a = actual.row_values(r);
                RowMetrics {
                    row_id: actual.row_ids()[r],
                    mae: mean_absolute_error(&p, &a),
                    pearson_r: pearson_r(&p, &a),
                }
            })
            .collect()
    }
}

/// Metrics of one cross-validation fold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoldMetrics {
    pub fold: usize,
    /// Training rows after outlier rejection
    pub train_size: usize,
    pub test_size: usize,
    /// Features retained by preprocessing
    pub n_features: usize,
    pub n_outliers: usize,
    pub mse: f64,
    pub mae: f64,
    pub pearson_r: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<RowMetrics>,
}

impl FoldMetrics {
    /// Score a fold's predictions against the held-out labels.
    pub fn score(fold: usize, predicted: &Table, actual: &TableView<'_>) -> Self {
        let p = predicted.row_major_values();
        let a = actual.row_major_values();
        Self {
            fold,
            train_size: 0,
            test_size: actual.n_rows(),
            n_features: 0,
            n_outliers: 0,
            mse: mean_squared_error(&p, &a),
            mae: mean_absolute_error(&p, &a),
            pearson_r: pearson_r(&p, &a),
            rows: RowMetrics::per_row(predicted, actual),
        }
    }
}

/// Per-fold metrics and their aggregates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub folds: Vec<FoldMetrics>,
    pub mse: Aggregate,
    pub mae: Aggregate,
    pub pearson_r: Aggregate,
}

impl MetricsReport {
    pub fn from_folds(folds: Vec<FoldMetrics>) -> Self {
        let collect = |f: fn(&FoldMetrics) -> f64| -> Vec<f64> { folds.iter().map(f).collect() };
        let mse = Aggregate::from_values(&collect(|f| f.mse));
        let mae = Aggregate::from_values(&collect(|f| f.mae));
        let pearson_r = Aggregate::from_values(&collect(|f| f.pearson_r));
        Self {
            folds,
            mse,
            mae,
            pearson_r,
        }
    }
}
