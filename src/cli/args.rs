//! Command-line argument definitions using clap

use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

use crate::pipeline::{CvStrategy, PreprocessConfig};

/// nextpoint - predict next-timepoint connectivity features from the current ones
#[derive(Parser, Debug)]
#[command(name = "nextpoint")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Training features at the current timepoint (CSV or Parquet, leading ID column)
    #[arg(long)]
    pub train_features: PathBuf,

    /// Training labels at the next timepoint (CSV or Parquet, leading ID column)
    #[arg(long)]
    pub train_labels: PathBuf,

    /// Features of the subjects to predict. Without it only cross-validation runs.
    #[arg(long)]
    pub test_features: Option<PathBuf>,

    /// Prediction file path.
    /// Defaults to the test file's directory with a '_predictions.csv' suffix.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Regressor used for outlier rejection, evaluation and the final fit
    #[arg(short, long, value_enum, default_value_t = ModelKind::RidgeCv)]
    pub model: ModelKind,

    /// Number of cross-validation folds
    #[arg(long, default_value = "5", value_parser = validate_folds)]
    pub folds: usize,

    /// Use leave-one-out cross-validation instead of k folds
    #[arg(long, default_value = "false")]
    pub leave_one_out: bool,

    /// Keep samples in file order when building folds
    #[arg(long, default_value = "false")]
    pub no_shuffle: bool,

    /// Seed for fold shuffling
    #[arg(long, default_value = "1")]
    pub seed: u64,

    /// Correlation threshold - drop the later feature of pairs with |r| at or above this value
    #[arg(long, default_value = "0.9", value_parser = validate_unit_interval)]
    pub correlation_threshold: f64,

    /// p-value threshold - drop features whose paired regression p-value exceeds this value
    #[arg(long, default_value = "0.05", value_parser = validate_unit_interval)]
    pub p_value_threshold: f64,

    /// Outlier threshold - drop training samples whose leave-one-out MSE exceeds this value
    #[arg(long, default_value = "0.006", value_parser = validate_non_negative)]
    pub outlier_threshold: f64,

    /// Skip significance-based feature elimination
    #[arg(long, default_value = "false")]
    pub skip_elimination: bool,

    /// Skip leave-one-out outlier rejection
    #[arg(long, default_value = "false")]
    pub skip_outliers: bool,

    /// Skip cross-validation
    #[arg(long, default_value = "false")]
    pub skip_cv: bool,

    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Show per-subject MAE and Pearson r for every fold
    #[arg(long, default_value = "false")]
    pub row_diagnostics: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Regressor choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelKind {
    /// Per-target training mean
    Mean,
    /// Ridge regression with leave-one-out chosen penalty
    RidgeCv,
    /// Bayesian ridge regression
    BayesianRidge,
    /// k-nearest neighbours
    Knn,
    /// AdaBoost.R2 over shallow trees
    AdaBoost,
    /// Average of k-nearest neighbours, AdaBoost and Bayesian ridge
    Ensemble,
}

impl Cli {
    /// Get the output path, deriving it from the test file if not explicitly
    /// provided.
    pub fn output_path(&self) -> Option<PathBuf> {
        let test = self.test_features.as_ref()?;
        Some(
            self.output
                .clone()
                .unwrap_or_else(|| derived_output_path(test)),
        )
    }

    pub fn preprocess_config(&self) -> PreprocessConfig {
        PreprocessConfig {
            correlation_threshold: self.correlation_threshold,
            p_value_threshold: self.p_value_threshold,
            outlier_threshold: self.outlier_threshold,
            eliminate: !self.skip_elimination,
            filter_outliers: !self.skip_outliers,
        }
    }

    /// Cross-validation strategy, or `None` when it is skipped.
    pub fn cv_strategy(&self) -> Option<CvStrategy> {
        if self.skip_cv {
            None
        } else if self.leave_one_out {
            Some(CvStrategy::LeaveOneOut)
        } else {
            Some(CvStrategy::KFold {
                k: self.folds,
                shuffle: !self.no_shuffle,
            })
        }
    }

    /// `env_logger` filter for the requested verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

fn derived_output_path(test: &Path) -> PathBuf {
    let parent = test.parent().unwrap_or_else(|| Path::new("."));
    let stem = test
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("test");
    parent.join(format!("{}_predictions.csv", stem))
}

/// Validator for thresholds in [0, 1]
fn validate_unit_interval(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !(0.0..=1.0).contains(&value) {
        Err(format!("value must be between 0.0 and 1.0, got {}", value))
    } else {
        Ok(value)
    }
}

/// Validator for the outlier threshold
fn validate_non_negative(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !(value >= 0.0) || value.is_infinite() {
        Err(format!("value must be a finite number >= 0, got {}", value))
    } else {
        Ok(value)
    }
}

/// Validator for the fold count
fn validate_folds(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid fold count", s))?;

    if value < 2 {
        Err(format!("at least 2 folds are required, got {}", value))
    } else {
        Ok(value)
    }
}
