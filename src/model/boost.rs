//! AdaBoost.R2 over shallow regression trees
//!
//! Each boosting round draws a weighted bootstrap of the training rows,
//! fits a tree on it, and reweights the rows by their relative error. The
//! ensemble predicts the weighted median of its trees. Targets are boosted
//! independently and in parallel; each target's draws come from its own
//! generator seeded with the configured seed, so results do not depend on
//! scheduling.

use log::debug;
use rand::distributions::{Distribution, WeightedIndex};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::pipeline::{PipelineError, Result, Table, TableView};

use super::tree::{RegressionTree, SortedFeatures};
use super::{check_fit_input, check_predict_input, Predictor, Regressor};

/// Per-row loss used to reweight samples between rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostLoss {
    Linear,
    Square,
    Exponential,
}

impl BoostLoss {
    /// Map an error already scaled into [0, 1].
    fn apply(self, scaled: f64) -> f64 {
        match self {
            BoostLoss::Linear => scaled,
            BoostLoss::Square => scaled * scaled,
            BoostLoss::Exponential => 1.0 - (-scaled).exp(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AdaBoostConfig {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub loss: BoostLoss,
    pub max_depth: usize,
    pub seed: u64,
}

impl Default for AdaBoostConfig {
    fn default() -> Self {
        Self {
            n_estimators: 50,
            learning_rate: 0.1,
            loss: BoostLoss::Exponential,
            max_depth: 3,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AdaBoostRegressor {
    config: AdaBoostConfig,
}

impl AdaBoostRegressor {
    pub fn new(config: AdaBoostConfig) -> Self {
        Self { config }
    }
}

/// Boosted trees for one target.
#[derive(Debug, Clone)]
struct Ensemble {
    trees: Vec<RegressionTree>,
    weights: Vec<f64>,
}

impl Ensemble {
    fn predict_row(&self, row: &[f64]) -> f64 {
        let predictions: Vec<f64> = self.trees.iter().map(|t| t.predict_row(row)).collect();
        weighted_median(&predictions, &self.weights)
    }
}

/// One boosted ensemble per target.
#[derive(Debug, Clone)]
pub struct AdaBoostModel {
    n_features: usize,
    ensembles: Vec<Ensemble>,
    names: Vec<String>,
}

impl AdaBoostModel {
    /// Trees kept for each target after early stopping.
    pub fn estimator_counts(&self) -> Vec<usize> {
        self.ensembles.iter().map(|e| e.trees.len()).collect()
    }
}

impl Regressor for AdaBoostRegressor {
    type Model = AdaBoostModel;

    fn name(&self) -> &'static str {
        "ada-boost"
    }

    fn fit(&self, x: &TableView<'_>, y: &TableView<'_>) -> Result<AdaBoostModel> {
        check_fit_input(x, y)?;
        if self.config.n_estimators == 0 || !(self.config.learning_rate > 0.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "boosting needs at least one estimator and a positive learning rate (got {}, {})",
                self.config.n_estimators, self.config.learning_rate
            )));
        }

        let data = SortedFeatures::new((0..x.n_cols()).map(|c| x.column_values(c)).collect());
        let ensembles = (0..y.n_cols())
            .into_par_iter()
            .map(|t| self.boost(&data, &y.column_values(t)))
            .collect::<Result<Vec<_>>>()?;

        Ok(AdaBoostModel {
            n_features: x.n_cols(),
            ensembles,
            names: y.column_names(),
        })
    }
}

impl AdaBoostRegressor {
    fn boost(&self, data: &SortedFeatures, y: &[f64]) -> Result<Ensemble> {
        let cfg = &self.config;
        let n = y.len();
        let mut rng = ChaCha8Rng::seed_from_u64(cfg.seed);
        let mut sample_weights = vec![1.0 / n as f64; n];
        let mut trees = Vec::new();
        let mut weights = Vec::new();

        for round in 0..cfg.n_estimators {
            let sampler = WeightedIndex::new(&sample_weights)
                .map_err(|e| PipelineError::Fit(format!("bootstrap weights: {}", e)))?;
            let mut counts = vec![0.0; n];
            for _ in 0..n {
                counts[sampler.sample(&mut rng)] += 1.0;
            }

            let tree = RegressionTree::fit(data, y, &counts, cfg.max_depth);
            let mut errors: Vec<f64> = (0..n)
                .map(|i| (tree.predict_by(|f| data.value(i, f)) - y[i]).abs())
                .collect();
            let max_error = errors.iter().copied().fold(0.0, f64::max);
            if max_error > 0.0 {
                errors.iter_mut().for_each(|e| *e /= max_error);
            }
            errors.iter_mut().for_each(|e| *e = cfg.loss.apply(*e));

            let estimator_error: f64 = sample_weights.iter().zip(&errors).map(|(w, e)| w * e).sum();

            if estimator_error <= 0.0 {
                // Perfect fit: keep it and stop
                trees.push(tree);
                weights.push(1.0);
                break;
            }
            if estimator_error >= 0.5 {
                if trees.is_empty() {
                    trees.push(tree);
                    weights.push(1.0);
                }
                debug!(
                    "boosting stopped at round {} (error {:.4})",
                    round, estimator_error
                );
                break;
            }

            let beta = estimator_error / (1.0 - estimator_error);
            trees.push(tree);
            weights.push(cfg.learning_rate * (1.0 / beta).ln());

            if round + 1 < cfg.n_estimators {
                for (w, e) in sample_weights.iter_mut().zip(&errors) {
                    *w *= beta.powf((1.0 - e) * cfg.learning_rate);
                }
                let total: f64 = sample_weights.iter().sum();
                if !(total > 0.0) {
                    break;
                }
                sample_weights.iter_mut().for_each(|w| *w /= total);
            }
        }

        Ok(Ensemble { trees, weights })
    }
}

impl Predictor for AdaBoostModel {
    fn predict(&self, x: &TableView<'_>) -> Result<Table> {
        check_predict_input(x, self.n_features)?;
        let rows = x.to_rows();
        let columns = self
            .ensembles
            .par_iter()
            .map(|e| rows.iter().map(|r| e.predict_row(r)).collect())
            .collect();
        Table::new(self.names.clone(), columns)
    }
}

/// Smallest prediction whose cumulative weight reaches half the total.
fn weighted_median(values: &[f64], weights: &[f64]) -> f64 {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]).then(a.cmp(&b)));
    let total: f64 = weights.iter().sum();
    let mut cumulative = 0.0;
    for &i in &order {
        cumulative += weights[i];
        if cumulative >= 0.5 * total {
            return values[i];
        }
    }
    order.last().map_or(f64::NAN, |&i| values[i])
}
