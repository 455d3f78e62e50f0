//! Leave-one-out sample outlier rejection
//!
//! Every training sample is held out once; a model fitted on the rest
//! predicts it, and samples predicted worse than the threshold are removed
//! from the training set. Test rows never pass through here.

use log::{debug, info};
use rayon::prelude::*;

use crate::model::{Predictor, Regressor};
use crate::report::metrics::mean_squared_error;

use super::error::{PipelineError, Result};
use super::frame::TableView;

/// Default per-sample mean squared error above which a sample is an outlier.
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 0.006;

/// Leave-one-out error of one training sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleError {
    /// Position of the sample in the scanned view
    pub position: usize,
    /// Original table row id
    pub row_id: usize,
    pub mse: f64,
}

/// Outcome of a leave-one-out scan.
#[derive(Debug, Clone, Default)]
pub struct OutlierScan {
    /// One entry per sample, in view order
    pub errors: Vec<SampleError>,
    /// View positions of the rejected samples, ascending
    pub outliers: Vec<usize>,
}

impl OutlierScan {
    /// Original table row ids of the rejected samples.
    pub fn outlier_row_ids(&self) -> Vec<usize> {
        self.outliers
            .iter()
            .map(|&p| self.errors[p].row_id)
            .collect()
    }

    /// Drop the rejected rows from a feature/label pair, keeping survivor
    /// order.
    pub fn apply<'a, 'b>(
        &self,
        x: &TableView<'a>,
        y: &TableView<'b>,
    ) -> (TableView<'a>, TableView<'b>) {
        let keep: Vec<usize> = (0..x.n_rows())
            .filter(|p| self.outliers.binary_search(p).is_err())
            .collect();
        (x.select_rows(&keep), y.select_rows(&keep))
    }
}

/// Score every sample of `x`/`y` by leave-one-out prediction error.
///
/// Folds are evaluated in parallel and collected in sample order, so the
/// result is identical to a sequential scan. With fewer than two samples
/// there is nothing to hold out and the scan is empty.
pub fn scan_outliers<R: Regressor>(
    regressor: &R,
    x: &TableView<'_>,
    y: &TableView<'_>,
    threshold: f64,
) -> Result<OutlierScan> {
    if !(threshold >= 0.0) {
        return Err(PipelineError::InvalidConfig(format!(
            "outlier threshold must be non-negative, got {}",
            threshold
        )));
    }
    if x.n_rows() != y.n_rows() {
        return Err(PipelineError::Schema(format!(
            "{} feature rows paired with {} label rows",
            x.n_rows(),
            y.n_rows()
        )));
    }

    let n = x.n_rows();
    if n < 2 {
        return Ok(OutlierScan::default());
    }

    let errors = (0..n)
        .into_par_iter()
        .map(|held_out| {
            let train: Vec<usize> = (0..n).filter(|&i| i != held_out).collect();
            let model = regressor.fit(&x.select_rows(&train), &y.select_rows(&train))?;
            let predicted = model.predict(&x.select_rows(&[held_out]))?;
            let mse = mean_squared_error(&predicted.row_major_values(), &y.row_values(held_out));
            Ok(SampleError {
                position: held_out,
                row_id: x.row_ids()[held_out],
                mse,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let outliers: Vec<usize> = errors
        .iter()
        .filter(|e| e.mse > threshold)
        .map(|e| {
            debug!(
                "Sample {} rejected (leave-one-out mse {:.6} > {})",
                e.row_id, e.mse, threshold
            );
            e.position
        })
        .collect();

    info!(
        "Outlier scan ({}): {} of {} samples rejected",
        regressor.name(),
        outliers.len(),
        n
    );

    Ok(OutlierScan { errors, outliers })
}
