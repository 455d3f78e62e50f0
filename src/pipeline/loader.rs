//! Dataset loader for CSV and Parquet files
//!
//! Every input file carries a leading identifier column (subject id) that is
//! dropped here; all remaining columns must be fully numeric.

use std::path::Path;

use log::info;
use polars::prelude::*;

use super::error::{PipelineError, Result};
use super::frame::Table;

/// Feature and label tables for one run.
#[derive(Debug, Clone)]
pub struct TrainingData {
    /// Current-timepoint features of the training subjects
    pub features: Table,
    /// Next-timepoint targets of the training subjects
    pub labels: Table,
    /// Current-timepoint features of the subjects to predict, if given
    pub test: Option<Table>,
}

/// Load a dataset from a file (CSV or Parquet based on extension) into a
/// numeric [`Table`], dropping the leading identifier column.
pub fn load_table(path: &Path) -> Result<Table> {
    let df = read_frame(path)?;

    if df.width() < 2 {
        return Err(load_error(
            path,
            format!(
                "expected an identifier column followed by data columns, found {} column(s)",
                df.width()
            ),
        ));
    }
    if df.height() == 0 {
        return Err(load_error(path, "file contains no data rows"));
    }

    let mut names = Vec::with_capacity(df.width() - 1);
    let mut columns = Vec::with_capacity(df.width() - 1);

    // First column is the identifier
    for col in df.get_columns().iter().skip(1) {
        let name = col.name().to_string();
        if col.null_count() > 0 {
            return Err(load_error(
                path,
                format!("column '{}' has {} empty cell(s)", name, col.null_count()),
            ));
        }

        let float_col = col
            .cast(&DataType::Float64)
            .map_err(|e| load_error(path, format!("column '{}' is not numeric: {}", name, e)))?;
        let ca = float_col
            .f64()
            .map_err(|e| load_error(path, format!("column '{}' is not numeric: {}", name, e)))?;

        let mut values = Vec::with_capacity(ca.len());
        for (row, value) in ca.iter().enumerate() {
            match value {
                Some(v) => values.push(v),
                // Non-strict casts turn unparseable cells into nulls
                None => {
                    return Err(load_error(
                        path,
                        format!("non-numeric cell in column '{}' at row {}", name, row + 1),
                    ))
                }
            }
        }

        names.push(name);
        columns.push(values);
    }

    let table = Table::new(names, columns).map_err(|e| load_error(path, e.to_string()))?;
    info!(
        "Loaded {}: {} rows x {} columns",
        path.display(),
        table.n_rows(),
        table.n_cols()
    );
    Ok(table)
}

/// Load training features, training labels and optional test features, and
/// check that they line up.
pub fn load_training_data(
    features_path: &Path,
    labels_path: &Path,
    test_path: Option<&Path>,
) -> Result<TrainingData> {
    let features = load_table(features_path)?;
    let labels = load_table(labels_path)?;

    if features.n_rows() != labels.n_rows() {
        return Err(PipelineError::Schema(format!(
            "{} has {} rows but {} has {}",
            features_path.display(),
            features.n_rows(),
            labels_path.display(),
            labels.n_rows()
        )));
    }

    let test = match test_path {
        Some(path) => {
            let test = load_table(path)?;
            if test.names() != features.names() {
                return Err(PipelineError::Schema(format!(
                    "{} columns do not match the training features in {}",
                    path.display(),
                    features_path.display()
                )));
            }
            Some(test)
        }
        None => None,
    };

    Ok(TrainingData {
        features,
        labels,
        test,
    })
}

fn scan(path: &Path) -> Result<LazyFrame> {
    if !path.exists() {
        return Err(load_error(path, "file does not exist"));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        // Infer over every row so a late decimal does not meet an integer column
        "csv" => LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(None)
            .finish()
            .map_err(|e| load_error(path, e.to_string())),
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .map_err(|e| load_error(path, e.to_string())),
        _ => Err(load_error(
            path,
            format!(
                "unsupported file format '{}'. Supported formats: csv, parquet",
                extension
            ),
        )),
    }
}

fn read_frame(path: &Path) -> Result<DataFrame> {
    scan(path)?
        .collect()
        .map_err(|e| load_error(path, e.to_string()))
}

fn load_error(path: &Path, reason: impl Into<String>) -> PipelineError {
    PipelineError::DataLoad {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}
