//! Model adapters - a uniform fit/predict contract over regressors
//!
//! The pipeline never names a concrete estimator. Anything implementing
//! [`Regressor`] can be cross-validated, used by the outlier filter or
//! trained for the final predictions. All regressors here are multi-output:
//! they predict every label column at once.

mod bayes;
mod boost;
mod knn;
mod linalg;
mod mean;
mod ridge;
mod tree;
mod voting;

use crate::pipeline::{PipelineError, Result, Table, TableView};

pub use bayes::{BayesianRidge, BayesianRidgeConfig, BayesianRidgeModel};
pub use boost::{AdaBoostConfig, AdaBoostModel, AdaBoostRegressor, BoostLoss};
pub use knn::{KnnConfig, KnnModel, KnnRegressor, WeightScheme};
pub use mean::{MeanModel, MeanRegressor};
pub use ridge::{default_alphas, RidgeCv, RidgeCvConfig, RidgeModel};
pub use voting::{VotingEnsemble, VotingModel};

/// An estimator that can be fitted on a feature/label pair.
///
/// `fit` must not depend on earlier calls: every call returns a fresh,
/// independent model.
pub trait Regressor: Sync {
    type Model: Predictor;

    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    fn fit(&self, x: &TableView<'_>, y: &TableView<'_>) -> Result<Self::Model>;
}

/// A fitted model.
pub trait Predictor: Send + Sync {
    /// Predict one row per row of `x`, one column per label column seen at
    /// fit time (named after them).
    fn predict(&self, x: &TableView<'_>) -> Result<Table>;
}

/// Validate a feature/label pair before any numeric work.
pub fn check_fit_input(x: &TableView<'_>, y: &TableView<'_>) -> Result<()> {
    if x.n_rows() == 0 || y.n_rows() == 0 {
        return Err(PipelineError::Fit(format!(
            "empty training input ({} feature rows, {} label rows)",
            x.n_rows(),
            y.n_rows()
        )));
    }
    if x.n_rows() != y.n_rows() {
        return Err(PipelineError::Fit(format!(
            "{} feature rows but {} label rows",
            x.n_rows(),
            y.n_rows()
        )));
    }
    if x.n_cols() == 0 || y.n_cols() == 0 {
        return Err(PipelineError::Fit(format!(
            "training input needs columns ({} features, {} labels)",
            x.n_cols(),
            y.n_cols()
        )));
    }
    Ok(())
}

/// Validate prediction input against the feature count seen at fit time.
pub fn check_predict_input(x: &TableView<'_>, n_features: usize) -> Result<()> {
    if x.n_cols() != n_features {
        return Err(PipelineError::Fit(format!(
            "model was fitted on {} features but got {}",
            n_features,
            x.n_cols()
        )));
    }
    Ok(())
}
