//! Significance-based feature elimination
//!
//! Each retained feature is tested with its own regression: the paired label
//! column (same feature at the next timepoint) is regressed on the feature
//! column alone, through the origin. Features whose coefficient is not
//! significant are dropped. This is one pass over the features, one
//! regression per feature; it is not a joint multivariate backward
//! elimination.

use log::debug;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

use super::error::{PipelineError, Result};
use super::frame::{ColumnMask, TableView};

/// Default p-value above which a feature is removed.
pub const DEFAULT_P_VALUE_THRESHOLD: f64 = 0.05;

/// Single-regressor OLS fit of one label column on one feature column.
#[derive(Debug, Clone, Serialize)]
pub struct UnivariateTest {
    pub feature: String,
    pub coefficient: f64,
    pub std_error: f64,
    pub t_statistic: f64,
    /// Two-sided p-value; NaN when there are no residual degrees of freedom
    pub p_value: f64,
    pub removed: bool,
}

/// Outcome of one elimination pass.
#[derive(Debug, Clone)]
pub struct Elimination {
    /// Retained columns, over the feature table's original column count
    pub mask: ColumnMask,
    /// One test per feature examined, in column order
    pub tests: Vec<UnivariateTest>,
}

impl Elimination {
    /// Names of the removed features.
    pub fn removed_features(&self) -> Vec<String> {
        self.tests
            .iter()
            .filter(|t| t.removed)
            .map(|t| t.feature.clone())
            .collect()
    }

    /// Project a view onto the retained columns.
    pub fn apply<'a>(&self, view: &TableView<'a>) -> TableView<'a> {
        view.project(&self.mask)
    }
}

/// Drop features whose paired univariate regression is not significant.
///
/// `y` must hold, at each view column position, the label column paired with
/// the feature at the same position in `x`. For every feature index, in
/// order, the fitted regression's largest p-value is compared with
/// `p_threshold`; when it is larger, the feature achieving it is removed.
/// A regression through the origin has a single p-value, so that is always
/// the feature under test.
///
/// Fails with [`PipelineError::SingularMatrix`] on an all-zero feature column.
pub fn eliminate_features(
    x: &TableView<'_>,
    y: &TableView<'_>,
    p_threshold: f64,
) -> Result<Elimination> {
    if !(0.0..=1.0).contains(&p_threshold) || p_threshold.is_nan() {
        return Err(PipelineError::InvalidConfig(format!(
            "p-value threshold must be between 0.0 and 1.0, got {}",
            p_threshold
        )));
    }
    if x.n_cols() != y.n_cols() {
        return Err(PipelineError::Schema(format!(
            "{} features paired with {} label columns",
            x.n_cols(),
            y.n_cols()
        )));
    }
    if x.n_rows() != y.n_rows() {
        return Err(PipelineError::Schema(format!(
            "{} feature rows paired with {} label rows",
            x.n_rows(),
            y.n_rows()
        )));
    }

    let mut mask = ColumnMask::from_view(x);
    let mut tests = Vec::with_capacity(x.n_cols());

    for i in 0..x.n_cols() {
        let mut test = univariate_ols(x.column_name(i), &x.column_values(i), &y.column_values(i))?;

        // NaN (no residual degrees of freedom) never exceeds the threshold
        if test.p_value > p_threshold {
            debug!(
                "Removing '{}' (p = {:.4} > {})",
                test.feature, test.p_value, p_threshold
            );
            mask.drop_column(x.col_ids()[i]);
            test.removed = true;
        }
        tests.push(test);
    }

    Ok(Elimination { mask, tests })
}

/// Fit `y = b * x` by ordinary least squares and test `b = 0`.
///
/// The fit has no intercept, so the degenerate case is `sum(x^2) == 0`
/// (an all-zero column) rather than zero variance. A constant non-zero
/// column still has a well-defined slope and is tested normally.
pub fn univariate_ols(feature: &str, x: &[f64], y: &[f64]) -> Result<UnivariateTest> {
    if x.len() != y.len() || x.is_empty() {
        return Err(PipelineError::Fit(format!(
            "regression for '{}' needs equal, non-empty columns ({} vs {})",
            feature,
            x.len(),
            y.len()
        )));
    }

    let sxx: f64 = x.iter().map(|v| v * v).sum();
    if sxx <= 0.0 {
        return Err(PipelineError::SingularMatrix {
            feature: feature.to_string(),
        });
    }

    let sxy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    let coefficient = sxy / sxx;

    let n = x.len();
    if n < 2 {
        return Ok(UnivariateTest {
            feature: feature.to_string(),
            coefficient,
            std_error: f64::NAN,
            t_statistic: f64::NAN,
            p_value: f64::NAN,
            removed: false,
        });
    }

    let dof = (n - 1) as f64;
    let ssr: f64 = x
        .iter()
        .zip(y)
        .map(|(a, b)| {
            let r = b - coefficient * a;
            r * r
        })
        .sum();
    let std_error = (ssr / dof / sxx).sqrt();
    let t_statistic = coefficient / std_error;

    let p_value = if t_statistic.is_nan() {
        f64::NAN
    } else if t_statistic.is_infinite() {
        0.0
    } else {
        let dist = StudentsT::new(0.0, 1.0, dof).map_err(|e| {
            PipelineError::Fit(format!("t distribution for '{}': {}", feature, e))
        })?;
        (2.0 * dist.sf(t_statistic.abs())).min(1.0)
    };

    Ok(UnivariateTest {
        feature: feature.to_string(),
        coefficient,
        std_error,
        t_statistic,
        p_value,
        removed: false,
    })
}
