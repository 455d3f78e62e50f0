//! k-nearest-neighbours regression

use rayon::prelude::*;

use crate::pipeline::{PipelineError, Result, Table, TableView};

use super::{check_fit_input, check_predict_input, Predictor, Regressor};

/// How neighbour labels are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightScheme {
    Uniform,
    /// Inverse distance; neighbours at distance zero take all the weight
    Distance,
}

#[derive(Debug, Clone, Copy)]
pub struct KnnConfig {
    pub n_neighbors: usize,
    /// Minkowski exponent (1 = Manhattan, 2 = Euclidean)
    pub p: f64,
    pub weights: WeightScheme,
}

impl Default for KnnConfig {
    fn default() -> Self {
        Self {
            n_neighbors: 25,
            p: 1.0,
            weights: WeightScheme::Distance,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KnnRegressor {
    config: KnnConfig,
}

impl KnnRegressor {
    pub fn new(config: KnnConfig) -> Self {
        Self { config }
    }
}

/// The training set itself.
#[derive(Debug, Clone)]
pub struct KnnModel {
    config: KnnConfig,
    features: Vec<Vec<f64>>,
    labels: Vec<Vec<f64>>,
    names: Vec<String>,
}

impl Regressor for KnnRegressor {
    type Model = KnnModel;

    fn name(&self) -> &'static str {
        "knn"
    }

    fn fit(&self, x: &TableView<'_>, y: &TableView<'_>) -> Result<KnnModel> {
        check_fit_input(x, y)?;
        if self.config.n_neighbors == 0 {
            return Err(PipelineError::InvalidConfig(
                "n_neighbors must be at least 1".to_string(),
            ));
        }
        if !(self.config.p >= 1.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "Minkowski exponent must be >= 1, got {}",
                self.config.p
            )));
        }
        Ok(KnnModel {
            config: self.config,
            features: x.to_rows(),
            labels: y.to_rows(),
            names: y.column_names(),
        })
    }
}

impl KnnModel {
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        let p = self.config.p;
        if p == 1.0 {
            a.iter().zip(b).map(|(u, v)| (u - v).abs()).sum()
        } else if p == 2.0 {
            a.iter().zip(b).map(|(u, v)| (u - v) * (u - v)).sum::<f64>().sqrt()
        } else {
            a.iter()
                .zip(b)
                .map(|(u, v)| (u - v).abs().powf(p))
                .sum::<f64>()
                .powf(1.0 / p)
        }
    }

    fn predict_row(&self, row: &[f64]) -> Vec<f64> {
        let k = self.config.n_neighbors.min(self.features.len());

        let mut neighbours: Vec<(f64, usize)> = self
            .features
            .iter()
            .enumerate()
            .map(|(i, f)| (self.distance(row, f), i))
            .collect();
        // Stable on index so equidistant neighbours resolve deterministically
        neighbours.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        neighbours.truncate(k);

        let weights: Vec<f64> = match self.config.weights {
            WeightScheme::Uniform => vec![1.0; k],
            WeightScheme::Distance => {
                if neighbours.iter().any(|(d, _)| *d == 0.0) {
                    neighbours
                        .iter()
                        .map(|(d, _)| if *d == 0.0 { 1.0 } else { 0.0 })
                        .collect()
                } else {
                    neighbours.iter().map(|(d, _)| 1.0 / d).collect()
                }
            }
        };
        let total: f64 = weights.iter().sum();

        let width = self.names.len();
        let mut out = vec![0.0; width];
        for ((_, idx), w) in neighbours.iter().zip(&weights) {
            for (o, label) in out.iter_mut().zip(&self.labels[*idx]) {
                *o += w * label;
            }
        }
        out.iter_mut().for_each(|o| *o /= total);
        out
    }
}

impl Predictor for KnnModel {
    fn predict(&self, x: &TableView<'_>) -> Result<Table> {
        let n_features = self.features.first().map_or(0, Vec::len);
        check_predict_input(x, n_features)?;
        let rows: Vec<Vec<f64>> = (0..x.n_rows())
            .into_par_iter()
            .map(|r| self.predict_row(&x.row_values(r)))
            .collect();
        Table::from_rows(self.names.clone(), &rows)
    }
}
