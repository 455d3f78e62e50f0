//! k-fold and leave-one-out cross-validation
//!
//! Each fold runs the whole training-side pipeline on its train partition:
//! preprocessing decisions and the model are refit per fold, then the
//! held-out rows are projected through that fold's column mask and scored.

use indicatif::ProgressBar;
use log::info;

use crate::model::{Predictor, Regressor};
use crate::report::metrics::{FoldMetrics, MetricsReport};

use super::error::{PipelineError, Result};
use super::frame::TableView;
use super::preprocess::Preprocessor;
use super::random::RandomSource;

/// How samples are split into folds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CvStrategy {
    /// `k` folds of sizes differing by at most one
    KFold { k: usize, shuffle: bool },
    /// One fold per sample
    LeaveOneOut,
}

impl Default for CvStrategy {
    fn default() -> Self {
        CvStrategy::KFold {
            k: 5,
            shuffle: true,
        }
    }
}

/// Train and test positions of one fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldSplit {
    pub fold: usize,
    /// Train and test both hold ascending view positions
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

pub struct CrossValidator {
    strategy: CvStrategy,
    progress: ProgressBar,
}

impl CrossValidator {
    pub fn new(strategy: CvStrategy) -> Self {
        Self {
            strategy,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report fold completion on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn strategy(&self) -> CvStrategy {
        self.strategy
    }

    /// Number of folds for `n` samples.
    pub fn n_folds(&self, n: usize) -> usize {
        match self.strategy {
            CvStrategy::KFold { k, .. } => k,
            CvStrategy::LeaveOneOut => n,
        }
    }

    /// Partition `0..n` into folds.
    ///
    /// The first `n % k` folds take one extra sample. Shuffling draws from
    /// `rng`; without it the folds are contiguous.
    pub fn split(&self, n: usize, rng: &mut RandomSource) -> Result<Vec<FoldSplit>> {
        let (k, shuffle) = match self.strategy {
            CvStrategy::KFold { k, shuffle } => (k, shuffle),
            CvStrategy::LeaveOneOut => (n, false),
        };
        if k < 2 || k > n {
            return Err(PipelineError::InvalidConfig(format!(
                "cannot split {} samples into {} folds",
                n, k
            )));
        }

        let mut indices: Vec<usize> = (0..n).collect();
        if shuffle {
            rng.shuffle(&mut indices);
        }

        let base = n / k;
        let extra = n % k;
        let mut start = 0;
        let mut folds = Vec::with_capacity(k);
        for fold in 0..k {
            let size = base + usize::from(fold < extra);
            let mut test = indices[start..start + size].to_vec();
            test.sort_unstable();
            let mut in_test = vec![false; n];
            for &i in &test {
                in_test[i] = true;
            }
            let train = (0..n).filter(|&i| !in_test[i]).collect();
            folds.push(FoldSplit { fold, train, test });
            start += size;
        }
        Ok(folds)
    }

    /// Cross-validate `regressor` with per-fold preprocessing.
    ///
    /// Folds run in order; the first failing fold aborts with
    /// [`PipelineError::Fold`].
    pub fn evaluate<R: Regressor>(
        &self,
        regressor: &R,
        preprocessor: &Preprocessor,
        x: &TableView<'_>,
        y: &TableView<'_>,
        rng: &mut RandomSource,
    ) -> Result<MetricsReport> {
        if x.n_rows() != y.n_rows() {
            return Err(PipelineError::Schema(format!(
                "{} feature rows paired with {} label rows",
                x.n_rows(),
                y.n_rows()
            )));
        }

        let splits = self.split(x.n_rows(), rng)?;
        self.progress.set_length(splits.len() as u64);

        let mut folds = Vec::with_capacity(splits.len());
        for split in &splits {
            let metrics = self
                .run_fold(regressor, preprocessor, x, y, split)
                .map_err(|e| PipelineError::in_fold(split.fold, e))?;
            info!(
                "Fold {}: mse {:.6}, mae {:.6}, r {:.4}",
                split.fold, metrics.mse, metrics.mae, metrics.pearson_r
            );
            folds.push(metrics);
            self.progress.inc(1);
        }

        Ok(MetricsReport::from_folds(folds))
    }

    fn run_fold<R: Regressor>(
        &self,
        regressor: &R,
        preprocessor: &Preprocessor,
        x: &TableView<'_>,
        y: &TableView<'_>,
        split: &FoldSplit,
    ) -> Result<FoldMetrics> {
        let train_x = x.select_rows(&split.train);
        let train_y = y.select_rows(&split.train);
        let prepared = preprocessor.fit(regressor, &train_x, &train_y)?;

        let model = regressor.fit(&prepared.x, &prepared.y)?;
        let test_x = prepared.project(&x.select_rows(&split.test));
        let test_y = y.select_rows(&split.test);
        let predicted = model.predict(&test_x)?;

        let mut metrics = FoldMetrics::score(split.fold, &predicted, &test_y);
        metrics.train_size = prepared.x.n_rows();
        metrics.n_features = prepared.x.n_cols();
        metrics.n_outliers = prepared.outlier_row_ids().len();
        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_sizes_differ_by_at_most_one() {
        let cv = CrossValidator::new(CvStrategy::KFold {
            k: 3,
            shuffle: false,
        });
        let folds = cv.split(8, &mut RandomSource::new(0)).unwrap();
        let sizes: Vec<usize> = folds.iter().map(|f| f.test.len()).collect();
        assert_eq!(sizes, vec![3, 3, 2]);
        assert_eq!(folds[0].test, vec![0, 1, 2]);
        assert_eq!(folds[2].train, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_shuffled_positions_are_sorted() {
        let cv = CrossValidator::new(CvStrategy::KFold {
            k: 4,
            shuffle: true,
        });
        for fold in cv.split(17, &mut RandomSource::new(11)).unwrap() {
            assert!(fold.test.windows(2).all(|w| w[0] < w[1]));
            assert!(fold.train.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_invalid_fold_counts() {
        let mut rng = RandomSource::new(0);
        let one = CrossValidator::new(CvStrategy::KFold {
            k: 1,
            shuffle: true,
        });
        assert!(matches!(one.split(5, &mut rng), Err(PipelineError::InvalidConfig(_))));
        let many = CrossValidator::new(CvStrategy::KFold {
            k: 6,
            shuffle: true,
        });
        assert!(matches!(many.split(5, &mut rng), Err(PipelineError::InvalidConfig(_))));
        let loo = CrossValidator::new(CvStrategy::LeaveOneOut);
        assert!(loo.split(1, &mut rng).is_err());
    }
}
