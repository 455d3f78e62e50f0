//! Error types for the forecasting pipeline.
//!
//! Every stage of the pipeline reports failures through [`PipelineError`].
//! All variants are fatal for the call that produced them: nothing is retried
//! and no partial output is written.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading data, preprocessing, fitting or writing.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input file is missing, unreadable or malformed.
    ///
    /// Covers wrong column counts, non-numeric or empty cells, files without
    /// data columns and duplicate column names.
    #[error("Failed to load {}: {reason}", path.display())]
    DataLoad {
        /// File that failed to load
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// Two inputs that must line up do not (names, widths or row counts).
    #[error("Schema mismatch: {0}")]
    Schema(String),

    /// A univariate regression in the backward eliminator has a singular
    /// design (the feature column is identically zero).
    #[error("Singular regression design for feature '{feature}'")]
    SingularMatrix {
        /// Feature whose regression could not be fitted
        feature: String,
    },

    /// Input entering a model is empty or misaligned.
    #[error("Model fit failed: {0}")]
    Fit(String),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A cross-validation fold failed; the run is aborted.
    #[error("Cross-validation fold {fold} failed")]
    Fold {
        /// Zero-based index of the failing fold
        fold: usize,
        /// The error raised inside the fold
        #[source]
        source: Box<PipelineError>,
    },

    /// The prediction file could not be created or written.
    #[error("Failed to write {}: {reason}", path.display())]
    Output {
        /// Output path
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },
}

impl PipelineError {
    /// Wrap an error raised inside cross-validation fold `fold`.
    pub fn in_fold(fold: usize, source: PipelineError) -> Self {
        PipelineError::Fold {
            fold,
            source: Box::new(source),
        }
    }
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, PipelineError>;
