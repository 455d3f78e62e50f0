//! Shared linear algebra for the ridge family
//!
//! Both ridge variants work in the dual: with a centered design `X` (n x p)
//! the Gram matrix `X X^T = Q diag(lambda) Q^T` is small when there are
//! fewer subjects than connectivity features, and every quantity they need
//! (fits, leave-one-out residuals, coefficients) follows from `Q` and
//! `lambda`.

use faer::{Mat, Side};

use crate::pipeline::TableView;

/// Centered (and optionally scaled) training design.
#[derive(Debug, Clone)]
pub(crate) struct Design {
    pub x: Mat<f64>,
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
}

impl Design {
    /// Center every column; with `normalize`, also divide by the L2 norm of
    /// the centered column (columns with zero norm are left unscaled).
    pub fn from_view(view: &TableView<'_>, normalize: bool) -> Self {
        let n = view.n_rows();
        let p = view.n_cols();
        let mut means = Vec::with_capacity(p);
        let mut scales = Vec::with_capacity(p);
        let mut x = Mat::<f64>::zeros(n, p);

        for j in 0..p {
            let values = view.column_values(j);
            let mean = values.iter().sum::<f64>() / n as f64;
            let norm = values
                .iter()
                .map(|v| (v - mean) * (v - mean))
                .sum::<f64>()
                .sqrt();
            let scale = if normalize && norm > 0.0 { norm } else { 1.0 };
            for (i, v) in values.iter().enumerate() {
                x[(i, j)] = (v - mean) / scale;
            }
            means.push(mean);
            scales.push(scale);
        }

        Self { x, means, scales }
    }
}

/// Apply a training centering/scaling to new rows.
pub(crate) fn rescale(view: &TableView<'_>, means: &[f64], scales: &[f64]) -> Mat<f64> {
    Mat::from_fn(view.n_rows(), view.n_cols(), |i, j| {
        (view.get(i, j) - means[j]) / scales[j]
    })
}

/// Eigendecomposition of the row Gram matrix `X X^T`.
#[derive(Debug, Clone)]
pub(crate) struct Spectrum {
    /// Eigenvalues, clamped at zero
    pub values: Vec<f64>,
    /// Orthonormal eigenvectors as columns (n x n)
    pub vectors: Mat<f64>,
}

impl Spectrum {
    pub fn of_rows(x: &Mat<f64>) -> Self {
        let n = x.nrows();
        let gram = x.as_ref() * x.transpose();
        let evd = gram.as_ref().selfadjoint_eigendecomposition(Side::Lower);
        let s = evd.s().column_vector();
        let u = evd.u();

        Self {
            values: (0..n).map(|k| s[k].max(0.0)).collect(),
            vectors: Mat::from_fn(n, n, |i, k| u[(i, k)]),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `Q^T y`
    pub fn project(&self, y: &[f64]) -> Vec<f64> {
        let n = self.len();
        (0..n)
            .map(|k| (0..n).map(|i| self.vectors[(i, k)] * y[i]).sum())
            .collect()
    }

    /// `Q c`
    pub fn combine(&self, c: &[f64]) -> Vec<f64> {
        let n = self.len();
        (0..n)
            .map(|i| (0..n).map(|k| self.vectors[(i, k)] * c[k]).sum())
            .collect()
    }
}

/// `X^T v` for a dense design.
pub(crate) fn transpose_times(x: &Mat<f64>, v: &[f64]) -> Vec<f64> {
    (0..x.ncols())
        .map(|j| (0..x.nrows()).map(|i| x[(i, j)] * v[i]).sum())
        .collect()
}

/// Mean of a series and the series with the mean removed.
pub(crate) fn center(values: &[f64]) -> (f64, Vec<f64>) {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    (mean, values.iter().map(|v| v - mean).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spectrum_reconstructs_gram() {
        let x = Mat::from_fn(4, 3, |i, j| ((i + 1) * (j + 2)) as f64 + (i * j) as f64 * 0.5);
        let spectrum = Spectrum::of_rows(&x);
        let gram = x.as_ref() * x.transpose();

        for i in 0..4 {
            for j in 0..4 {
                let rebuilt: f64 = (0..4)
                    .map(|k| spectrum.vectors[(i, k)] * spectrum.values[k] * spectrum.vectors[(j, k)])
                    .sum();
                assert!((rebuilt - gram[(i, j)]).abs() < 1e-8);
            }
        }
    }

    #[test]
    fn test_project_then_combine_is_identity() {
        let x = Mat::from_fn(3, 2, |i, j| (i as f64 - 1.0) * (j as f64 + 1.0) + j as f64);
        let spectrum = Spectrum::of_rows(&x);
        let y = [0.5, -1.0, 2.0];
        let back = spectrum.combine(&spectrum.project(&y));
        for (a, b) in back.iter().zip(&y) {
            assert!((a - b).abs() < 1e-10);
        }
    }

    #[test]
    fn test_center() {
        let (mean, centered) = center(&[1.0, 2.0, 3.0]);
        assert_eq!(mean, 2.0);
        assert_eq!(centered, vec![-1.0, 0.0, 1.0]);
    }
}
