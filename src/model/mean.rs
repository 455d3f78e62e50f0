//! Per-target mean baseline

use crate::pipeline::{Result, Table, TableView};

use super::{check_fit_input, check_predict_input, Predictor, Regressor};

/// Predicts the training mean of every label column, ignoring the features.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanRegressor;

/// Fitted per-target means.
#[derive(Debug, Clone)]
pub struct MeanModel {
    n_features: usize,
    names: Vec<String>,
    means: Vec<f64>,
}

impl Regressor for MeanRegressor {
    type Model = MeanModel;

    fn name(&self) -> &'static str {
        "mean"
    }

    fn fit(&self, x: &TableView<'_>, y: &TableView<'_>) -> Result<MeanModel> {
        check_fit_input(x, y)?;
        let n = y.n_rows() as f64;
        let means = (0..y.n_cols())
            .map(|c| y.column_values(c).iter().sum::<f64>() / n)
            .collect();
        Ok(MeanModel {
            n_features: x.n_cols(),
            names: y.column_names(),
            means,
        })
    }
}

impl Predictor for MeanModel {
    fn predict(&self, x: &TableView<'_>) -> Result<Table> {
        check_predict_input(x, self.n_features)?;
        let columns = self.means.iter().map(|&m| vec![m; x.n_rows()]).collect();
        Table::new(self.names.clone(), columns)
    }
}
