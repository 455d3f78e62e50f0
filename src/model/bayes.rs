//! Bayesian ridge regression
//!
//! Evidence maximisation with gamma priors on the noise precision (`alpha`)
//! and the weight precision (`lambda`), one independent fit per target.
//! Every target shares the same design, so the eigendecomposition of the
//! Gram matrix is computed once and each iteration is cheap.

use faer::Mat;
use rayon::prelude::*;

use crate::pipeline::{Result, Table, TableView};

use super::linalg::{center, rescale, transpose_times, Design, Spectrum};
use super::{check_fit_input, check_predict_input, Predictor, Regressor};

#[derive(Debug, Clone, Copy)]
pub struct BayesianRidgeConfig {
    pub max_iter: usize,
    /// Convergence threshold on the summed absolute coefficient change
    pub tol: f64,
    pub alpha_1: f64,
    pub alpha_2: f64,
    pub lambda_1: f64,
    pub lambda_2: f64,
}

impl Default for BayesianRidgeConfig {
    fn default() -> Self {
        Self {
            max_iter: 300,
            tol: 1e-3,
            alpha_1: 1e-6,
            alpha_2: 1e-6,
            lambda_1: 1e-6,
            lambda_2: 1e-6,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BayesianRidge {
    config: BayesianRidgeConfig,
}

impl BayesianRidge {
    pub fn new(config: BayesianRidgeConfig) -> Self {
        Self { config }
    }
}

/// Posterior-mean coefficients per target.
#[derive(Debug, Clone)]
pub struct BayesianRidgeModel {
    means: Vec<f64>,
    /// p x m
    coefficients: Mat<f64>,
    intercepts: Vec<f64>,
    names: Vec<String>,
}

/// Converged state of one target.
struct TargetFit {
    coef: Vec<f64>,
    intercept: f64,
}

impl Regressor for BayesianRidge {
    type Model = BayesianRidgeModel;

    fn name(&self) -> &'static str {
        "bayesian-ridge"
    }

    fn fit(&self, x: &TableView<'_>, y: &TableView<'_>) -> Result<BayesianRidgeModel> {
        check_fit_input(x, y)?;
        let design = Design::from_view(x, false);
        let spectrum = Spectrum::of_rows(&design.x);

        let fits: Vec<TargetFit> = (0..y.n_cols())
            .into_par_iter()
            .map(|t| self.fit_target(&design, &spectrum, &y.column_values(t)))
            .collect();

        let p = x.n_cols();
        let coefficients = Mat::from_fn(p, fits.len(), |j, t| fits[t].coef[j]);
        Ok(BayesianRidgeModel {
            means: design.means,
            coefficients,
            intercepts: fits.iter().map(|f| f.intercept).collect(),
            names: y.column_names(),
        })
    }
}

impl BayesianRidge {
    fn fit_target(&self, design: &Design, spectrum: &Spectrum, target: &[f64]) -> TargetFit {
        let cfg = &self.config;
        let n = target.len() as f64;
        let (intercept, centered) = center(target);
        let z = spectrum.project(&centered);

        let variance = centered.iter().map(|v| v * v).sum::<f64>() / n;
        let mut alpha = 1.0 / (variance + f64::EPSILON);
        let mut lambda = 1.0;

        let coef_for = |alpha: f64, lambda: f64| -> (Vec<f64>, f64) {
            let ratio = lambda / alpha;
            let dual: Vec<f64> = z
                .iter()
                .zip(&spectrum.values)
                .map(|(zk, l)| zk / (l + ratio))
                .collect();
            let coef = transpose_times(&design.x, &spectrum.combine(&dual));
            let rss = z
                .iter()
                .zip(&spectrum.values)
                .map(|(zk, l)| {
                    let r = zk * ratio / (l + ratio);
                    r * r
                })
                .sum::<f64>();
            (coef, rss)
        };

        let mut previous: Option<Vec<f64>> = None;
        for _ in 0..cfg.max_iter {
            let (coef, rss) = coef_for(alpha, lambda);

            let gamma: f64 = spectrum
                .values
                .iter()
                .map(|l| alpha * l / (lambda + alpha * l))
                .sum();
            let coef_norm: f64 = coef.iter().map(|c| c * c).sum();
            lambda = (gamma + 2.0 * cfg.lambda_1) / (coef_norm + 2.0 * cfg.lambda_2);
            alpha = (n - gamma + 2.0 * cfg.alpha_1) / (rss + 2.0 * cfg.alpha_2);

            if let Some(prev) = &previous {
                let change: f64 = prev.iter().zip(&coef).map(|(a, b)| (a - b).abs()).sum();
                if change < cfg.tol {
                    break;
                }
            }
            previous = Some(coef);
        }

        let (coef, _) = coef_for(alpha, lambda);
        TargetFit { coef, intercept }
    }
}

impl Predictor for BayesianRidgeModel {
    fn predict(&self, x: &TableView<'_>) -> Result<Table> {
        check_predict_input(x, self.means.len())?;
        let unit = vec![1.0; self.means.len()];
        let centered = rescale(x, &self.means, &unit);
        let mut fitted = &centered * &self.coefficients;
        for t in 0..fitted.ncols() {
            for i in 0..fitted.nrows() {
                fitted[(i, t)] += self.intercepts[t];
            }
        }
        Table::from_mat(self.names.clone(), &fitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits_noiseless_line() {
        let rows: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64 * 0.1]).collect();
        let targets: Vec<Vec<f64>> = rows.iter().map(|r| vec![3.0 * r[0] + 1.0]).collect();
        let x = Table::from_rows(vec!["x".into()], &rows).unwrap();
        let y = Table::from_rows(vec!["y".into()], &targets).unwrap();

        let model = BayesianRidge::default().fit(&x.view(), &y.view()).unwrap();
        let pred = model.predict(&x.view()).unwrap();
        for (p, t) in pred.column(0).iter().zip(&targets) {
            assert!((p - t[0]).abs() < 1e-3);
        }
    }

    #[test]
    fn test_constant_target_predicts_constant() {
        let x = Table::from_rows(
            vec!["a".into(), "b".into()],
            &[vec![0.0, 1.0], vec![1.0, 0.5], vec![2.0, 0.0]],
        )
        .unwrap();
        let y = Table::from_rows(vec!["y".into()], &[vec![4.0], vec![4.0], vec![4.0]]).unwrap();
        let model = BayesianRidge::default().fit(&x.view(), &y.view()).unwrap();
        let pred = model.predict(&x.view()).unwrap();
        for p in pred.column(0) {
            assert!((p - 4.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_one_column_per_target() {
        let x = Table::from_rows(vec!["a".into()], &[vec![0.0], vec![1.0], vec![2.0]]).unwrap();
        let y = Table::from_rows(
            vec!["u".into(), "v".into()],
            &[vec![0.0, 1.0], vec![1.0, 0.0], vec![2.0, 1.0]],
        )
        .unwrap();
        let model = BayesianRidge::default().fit(&x.view(), &y.view()).unwrap();
        let pred = model.predict(&x.view()).unwrap();
        assert_eq!(pred.names(), &["u".to_string(), "v".to_string()]);
        assert_eq!(pred.n_rows(), 3);
    }
}
