//! Unweighted averaging ensemble

use crate::pipeline::{Result, Table, TableView};

use super::{
    check_fit_input, AdaBoostModel, AdaBoostRegressor, BayesianRidge, BayesianRidgeModel,
    KnnModel, KnnRegressor, Predictor, Regressor,
};

/// Averages k-nearest-neighbours, AdaBoost and Bayesian ridge predictions.
#[derive(Debug, Clone, Copy, Default)]
pub struct VotingEnsemble {
    pub knn: KnnRegressor,
    pub boost: AdaBoostRegressor,
    pub bayes: BayesianRidge,
}

#[derive(Debug, Clone)]
pub struct VotingModel {
    knn: KnnModel,
    boost: AdaBoostModel,
    bayes: BayesianRidgeModel,
}

impl Regressor for VotingEnsemble {
    type Model = VotingModel;

    fn name(&self) -> &'static str {
        "ensemble"
    }

    fn fit(&self, x: &TableView<'_>, y: &TableView<'_>) -> Result<VotingModel> {
        check_fit_input(x, y)?;
        Ok(VotingModel {
            knn: self.knn.fit(x, y)?,
            boost: self.boost.fit(x, y)?,
            bayes: self.bayes.fit(x, y)?,
        })
    }
}

impl Predictor for VotingModel {
    fn predict(&self, x: &TableView<'_>) -> Result<Table> {
        let members = [
            self.knn.predict(x)?,
            self.boost.predict(x)?,
            self.bayes.predict(x)?,
        ];
        let first = &members[0];
        let columns = (0..first.n_cols())
            .map(|c| {
                (0..first.n_rows())
                    .map(|r| members.iter().map(|m| m.value(r, c)).sum::<f64>() / members.len() as f64)
                    .collect()
            })
            .collect();
        Table::new(first.names().to_vec(), columns)
    }
}
