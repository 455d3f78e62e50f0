//! Ridge regression with a leave-one-out chosen penalty

use faer::Mat;
use log::debug;
use rayon::prelude::*;

use crate::pipeline::{PipelineError, Result, Table, TableView};

use super::linalg::{center, rescale, Design, Spectrum};
use super::{check_fit_input, check_predict_input, Predictor, Regressor};

/// `0.5 * 10^linspace(10, -2, 100)`, largest penalty first.
pub fn default_alphas() -> Vec<f64> {
    let steps = 100;
    (0..steps)
        .map(|i| {
            let exponent = 10.0 - 12.0 * i as f64 / (steps - 1) as f64;
            0.5 * 10f64.powf(exponent)
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct RidgeCvConfig {
    /// Candidate penalties; the first one with the lowest error wins
    pub alphas: Vec<f64>,
    /// Scale centered features to unit L2 norm before fitting
    pub normalize: bool,
}

impl Default for RidgeCvConfig {
    fn default() -> Self {
        Self {
            alphas: default_alphas(),
            normalize: true,
        }
    }
}

/// Multi-output ridge regression whose penalty is picked by efficient
/// leave-one-out error over all targets jointly.
#[derive(Debug, Clone, Default)]
pub struct RidgeCv {
    config: RidgeCvConfig,
}

impl RidgeCv {
    pub fn new(config: RidgeCvConfig) -> Self {
        Self { config }
    }
}

/// Fitted ridge coefficients for every target.
#[derive(Debug, Clone)]
pub struct RidgeModel {
    design_means: Vec<f64>,
    design_scales: Vec<f64>,
    /// p x m coefficients in the scaled design space
    coefficients: Mat<f64>,
    intercepts: Vec<f64>,
    names: Vec<String>,
    alpha: f64,
}

impl RidgeModel {
    /// The selected penalty.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Regressor for RidgeCv {
    type Model = RidgeModel;

    fn name(&self) -> &'static str {
        "ridge-cv"
    }

    fn fit(&self, x: &TableView<'_>, y: &TableView<'_>) -> Result<RidgeModel> {
        check_fit_input(x, y)?;
        if self.config.alphas.is_empty() || self.config.alphas.iter().any(|&a| !(a > 0.0)) {
            return Err(PipelineError::InvalidConfig(
                "ridge penalties must be a non-empty list of positive values".to_string(),
            ));
        }

        let n = x.n_rows();
        let m = y.n_cols();
        let design = Design::from_view(x, self.config.normalize);
        let spectrum = Spectrum::of_rows(&design.x);

        let mut intercepts = Vec::with_capacity(m);
        let mut centered = Mat::<f64>::zeros(n, m);
        for t in 0..m {
            let (mean, values) = center(&y.column_values(t));
            intercepts.push(mean);
            for (i, v) in values.into_iter().enumerate() {
                centered[(i, t)] = v;
            }
        }
        // Targets in the eigenbasis: Z = Q^T Yc
        let z = spectrum.vectors.transpose() * &centered;

        let alpha = if n < 2 {
            self.config.alphas[0]
        } else {
            let errors: Vec<f64> = self
                .config
                .alphas
                .par_iter()
                .map(|&alpha| loo_error(&spectrum, &z, alpha))
                .collect();
            let mut best = 0;
            for (i, &err) in errors.iter().enumerate() {
                if err < errors[best] {
                    best = i;
                }
            }
            debug!(
                "ridge: alpha {:.3e} (leave-one-out mse {:.6})",
                self.config.alphas[best], errors[best]
            );
            self.config.alphas[best]
        };

        // W = X^T Q diag(1 / (lambda + alpha)) Z
        let shrunk = Mat::from_fn(n, m, |k, t| z[(k, t)] / (spectrum.values[k] + alpha));
        let dual = &spectrum.vectors * &shrunk;
        let coefficients = design.x.transpose() * &dual;

        Ok(RidgeModel {
            design_means: design.means,
            design_scales: design.scales,
            coefficients,
            intercepts,
            names: y.column_names(),
            alpha,
        })
    }
}

/// Mean squared leave-one-out residual for one penalty.
///
/// With the intercept fitted, the hat matrix is `1/n + Q diag(lambda /
/// (lambda + alpha)) Q^T` and the centered residuals are
/// `Q diag(alpha / (lambda + alpha)) Z`.
fn loo_error(spectrum: &Spectrum, z: &Mat<f64>, alpha: f64) -> f64 {
    let n = spectrum.len();
    let m = z.ncols();
    let q = &spectrum.vectors;

    let leverage: Vec<f64> = (0..n)
        .map(|i| {
            let h: f64 = (0..n)
                .map(|k| {
                    let l = spectrum.values[k];
                    q[(i, k)] * q[(i, k)] * l / (l + alpha)
                })
                .sum();
            h + 1.0 / n as f64
        })
        .collect();

    let damped = Mat::from_fn(n, m, |k, t| {
        z[(k, t)] * alpha / (spectrum.values[k] + alpha)
    });
    let residuals = q * &damped;

    let mut total = 0.0;
    for (i, h) in leverage.iter().enumerate() {
        let denom = (1.0 - h).max(1e-12);
        for t in 0..m {
            let r = residuals[(i, t)] / denom;
            total += r * r;
        }
    }
    total / (n * m) as f64
}

impl Predictor for RidgeModel {
    fn predict(&self, x: &TableView<'_>) -> Result<Table> {
        check_predict_input(x, self.design_means.len())?;
        let scaled = rescale(x, &self.design_means, &self.design_scales);
        let mut fitted = &scaled * &self.coefficients;
        for t in 0..fitted.ncols() {
            for i in 0..fitted.nrows() {
                fitted[(i, t)] += self.intercepts[t];
            }
        }
        Table::from_mat(self.names.clone(), &fitted)
    }
}
