//! Prediction file writer
//!
//! Predictions are written as two columns, `ID,predicted`: the prediction
//! matrix flattened row-major (all targets of subject 0, then subject 1, ...)
//! with IDs counting from 0.

use std::fs::File;
use std::path::Path;

use log::info;
use polars::prelude::*;

use super::error::{PipelineError, Result};
use super::frame::Table;

/// Write a row-major flattened prediction vector.
pub fn write_predictions(path: &Path, values: &[f64]) -> Result<()> {
    let ids: Vec<u64> = (0..values.len() as u64).collect();
    let mut df = DataFrame::new(vec![
        Series::new("ID".into(), ids).into(),
        Series::new("predicted".into(), values.to_vec()).into(),
    ])
    .map_err(|e| output_error(path, e))?;

    let mut file = File::create(path).map_err(|e| output_error(path, e))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .map_err(|e| output_error(path, e))?;

    info!("Wrote {} predictions to {}", values.len(), path.display());
    Ok(())
}

/// Write a prediction table, flattening it row-major.
pub fn write_prediction_table(path: &Path, predictions: &Table) -> Result<()> {
    write_predictions(path, &predictions.row_major_values())
}

fn output_error(path: &Path, reason: impl std::fmt::Display) -> PipelineError {
    PipelineError::Output {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
