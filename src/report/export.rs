//! JSON run report export

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{CorrelatedPair, CvStrategy, PreprocessConfig, Prepared, UnivariateTest};

use super::metrics::MetricsReport;

/// Metadata about the run
#[derive(Debug, Serialize)]
pub struct RunMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    pub nextpoint_version: String,
    pub train_features: String,
    pub train_labels: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_features: Option<String>,
    /// Regressor name
    pub model: String,
}

/// Configuration the run used
#[derive(Debug, Serialize)]
pub struct RunConfig {
    pub correlation_threshold: f64,
    pub p_value_threshold: f64,
    pub outlier_threshold: f64,
    pub eliminate: bool,
    pub filter_outliers: bool,
    /// "k-fold (k = 5, shuffled)", "leave-one-out" or "skipped"
    pub cross_validation: String,
    pub seed: u64,
}

impl RunConfig {
    pub fn new(config: &PreprocessConfig, cv: Option<CvStrategy>, seed: u64) -> Self {
        let cross_validation = match cv {
            Some(CvStrategy::KFold { k, shuffle }) => format!(
                "k-fold (k = {}, {})",
                k,
                if shuffle { "shuffled" } else { "in order" }
            ),
            Some(CvStrategy::LeaveOneOut) => "leave-one-out".to_string(),
            None => "skipped".to_string(),
        };
        Self {
            correlation_threshold: config.correlation_threshold,
            p_value_threshold: config.p_value_threshold,
            outlier_threshold: config.outlier_threshold,
            eliminate: config.eliminate,
            filter_outliers: config.filter_outliers,
            cross_validation,
            seed,
        }
    }
}

/// What the final preprocessing pass decided
#[derive(Debug, Serialize)]
pub struct PreprocessingOutcome {
    pub initial_features: usize,
    pub dropped_correlation: Vec<CorrelatedPair>,
    /// Univariate tests of the features removed for insignificance
    pub dropped_significance: Vec<UnivariateTest>,
    /// Original row ids of the rejected training samples
    pub outlier_rows: Vec<usize>,
    pub final_features: Vec<String>,
    pub training_rows: usize,
}

impl PreprocessingOutcome {
    pub fn from_prepared(initial_features: usize, prepared: &Prepared<'_, '_>) -> Self {
        Self {
            initial_features,
            dropped_correlation: prepared.reduction.dropped.clone(),
            dropped_significance: prepared
                .elimination
                .as_ref()
                .map(|e| e.tests.iter().filter(|t| t.removed).cloned().collect())
                .unwrap_or_default(),
            outlier_rows: prepared.outlier_row_ids(),
            final_features: prepared.x.column_names(),
            training_rows: prepared.x.n_rows(),
        }
    }
}

/// Complete run report
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub metadata: RunMetadata,
    pub config: RunConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preprocessing: Option<PreprocessingOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross_validation: Option<MetricsReport>,
}

/// Parameters for the report metadata
pub struct ExportParams<'a> {
    pub train_features: &'a Path,
    pub train_labels: &'a Path,
    pub test_features: Option<&'a Path>,
    pub model: &'a str,
}

impl RunMetadata {
    pub fn new(params: &ExportParams) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            nextpoint_version: env!("CARGO_PKG_VERSION").to_string(),
            train_features: params.train_features.display().to_string(),
            train_labels: params.train_labels.display().to_string(),
            test_features: params.test_features.map(|p| p.display().to_string()),
            model: params.model.to_string(),
        }
    }
}

/// Write the run report as pretty-printed JSON.
pub fn export_run_report(report: &RunReport, output_path: &Path) -> Result<()> {
    let json =
        serde_json::to_string_pretty(report).context("Failed to serialize run report to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write run report to {}", output_path.display()))?;

    Ok(())
}
