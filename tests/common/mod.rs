//! Shared test utilities and fixture generators
#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use nextpoint::model::{MeanModel, MeanRegressor, Regressor};
use nextpoint::pipeline::{Result, Table, TableView};
use polars::prelude::*;
use tempfile::TempDir;

/// Build a table from row-major records.
pub fn table(names: &[&str], rows: &[Vec<f64>]) -> Table {
    Table::from_rows(names.iter().map(|s| s.to_string()).collect(), rows).unwrap()
}

/// Table with known correlation patterns over 10 rows
///
/// - `a`: 1..=10
/// - `b`: 2a, perfectly correlated with `a`
/// - `c`: 11 - a, perfectly anti-correlated with `a`
/// - `d`: shuffled noise, weakly correlated with everything
pub fn create_correlation_table() -> Table {
    let a: Vec<f64> = (1..=10).map(f64::from).collect();
    let b: Vec<f64> = a.iter().map(|v| 2.0 * v).collect();
    let c: Vec<f64> = a.iter().map(|v| 11.0 - v).collect();
    let d = vec![5.0, 1.0, 8.0, 2.0, 9.0, 3.0, 7.0, 4.0, 6.0, 0.0];
    Table::new(
        vec!["a".into(), "b".into(), "c".into(), "d".into()],
        vec![a, b, c, d],
    )
    .unwrap()
}

/// Five subjects where the last one's label cannot be predicted from its
/// neighbours: one feature `f`, one label `f` (same name, next timepoint).
pub fn create_outlier_tables() -> (Table, Table) {
    let x = table(
        &["f"],
        &[vec![0.0], vec![1.0], vec![2.0], vec![3.0], vec![10.0]],
    );
    let y = table(
        &["f"],
        &[vec![0.50], vec![0.51], vec![0.52], vec![0.53], vec![0.90]],
    );
    (x, y)
}

/// Deterministic pseudo-random value in [0, 1) for fixture generation.
pub fn pseudo_random(i: usize, j: usize) -> f64 {
    let h = (i as u64)
        .wrapping_mul(6364136223846793005)
        .wrapping_add((j as u64).wrapping_mul(1442695040888963407))
        .wrapping_add(0x9E3779B97F4A7C15);
    let h = (h ^ (h >> 33)).wrapping_mul(0xff51afd7ed558ccd);
    let h = h ^ (h >> 33);
    (h >> 11) as f64 / (1u64 << 53) as f64
}

/// Connectivity-like training data: `n` subjects, `p` features named
/// `e0..`, labels with the same names that follow the features closely.
pub fn create_connectivity_tables(n: usize, p: usize) -> (Table, Table) {
    let names: Vec<String> = (0..p).map(|j| format!("e{}", j)).collect();
    let features: Vec<Vec<f64>> = (0..p)
        .map(|j| (0..n).map(|i| pseudo_random(i, j)).collect())
        .collect();
    let labels: Vec<Vec<f64>> = features
        .iter()
        .enumerate()
        .map(|(j, col)| {
            col.iter()
                .enumerate()
                .map(|(i, v)| 0.9 * v + 0.05 + 0.01 * (pseudo_random(i + 1000, j) - 0.5))
                .collect()
        })
        .collect();
    (
        Table::new(names.clone(), features).unwrap(),
        Table::new(names, labels).unwrap(),
    )
}

/// Write a table to CSV with a leading `ID` column of subject ids.
pub fn write_csv(dir: &Path, file_name: &str, table: &Table) -> PathBuf {
    let path = dir.join(file_name);
    let ids: Vec<String> = (0..table.n_rows()).map(|i| format!("sub-{:03}", i)).collect();

    let mut columns: Vec<Column> = Vec::with_capacity(table.n_cols() + 1);
    columns.push(Column::new("ID".into(), ids));
    for (c, name) in table.names().iter().enumerate() {
        columns.push(Column::new(name.as_str().into(), table.column(c).to_vec()));
    }
    let mut df = DataFrame::new(columns).unwrap();

    let mut file = std::fs::File::create(&path).unwrap();
    CsvWriter::new(&mut file).finish(&mut df).unwrap();
    path
}

/// Write a table to Parquet with a leading `ID` column.
pub fn write_parquet(dir: &Path, file_name: &str, table: &Table) -> PathBuf {
    let path = dir.join(file_name);
    let ids: Vec<i64> = (0..table.n_rows() as i64).collect();

    let mut columns: Vec<Column> = Vec::with_capacity(table.n_cols() + 1);
    columns.push(Column::new("ID".into(), ids));
    for (c, name) in table.names().iter().enumerate() {
        columns.push(Column::new(name.as_str().into(), table.column(c).to_vec()));
    }
    let mut df = DataFrame::new(columns).unwrap();

    let file = std::fs::File::create(&path).unwrap();
    ParquetWriter::new(file).finish(&mut df).unwrap();
    path
}

/// Write raw CSV text.
pub fn write_raw_csv(dir: &Path, file_name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(file_name);
    let mut file = std::fs::File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    path
}

/// Temporary directory holding train features, labels and test features.
pub fn create_temp_dataset(n: usize, p: usize, n_test: usize) -> (TempDir, PathBuf, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let (x, y) = create_connectivity_tables(n + n_test, p);
    let train_rows: Vec<usize> = (0..n).collect();
    let test_rows: Vec<usize> = (n..n + n_test).collect();

    let train_x = to_table(&x.view().select_rows(&train_rows));
    let train_y = to_table(&y.view().select_rows(&train_rows));
    let test_x = to_table(&x.view().select_rows(&test_rows));

    let features = write_csv(temp_dir.path(), "train_t0.csv", &train_x);
    let labels = write_csv(temp_dir.path(), "train_t1.csv", &train_y);
    let test = write_csv(temp_dir.path(), "test_t0.csv", &test_x);
    (temp_dir, features, labels, test)
}

/// Materialise a view as its own table.
pub fn to_table(view: &TableView<'_>) -> Table {
    Table::from_rows(view.column_names(), &view.to_rows()).unwrap()
}

/// Mean regressor that records the original row and column ids of every
/// fit call.
#[derive(Default)]
pub struct RecordingRegressor {
    pub fits: Mutex<Vec<(Vec<usize>, Vec<usize>)>>,
}

impl RecordingRegressor {
    pub fn fitted_rows(&self) -> Vec<Vec<usize>> {
        self.fits.lock().unwrap().iter().map(|(r, _)| r.clone()).collect()
    }

    pub fn fitted_cols(&self) -> Vec<Vec<usize>> {
        self.fits.lock().unwrap().iter().map(|(_, c)| c.clone()).collect()
    }
}

impl Regressor for RecordingRegressor {
    type Model = MeanModel;

    fn name(&self) -> &'static str {
        "recording"
    }

    fn fit(&self, x: &TableView<'_>, y: &TableView<'_>) -> Result<MeanModel> {
        self.fits
            .lock()
            .unwrap()
            .push((x.row_ids().to_vec(), x.col_ids().to_vec()));
        MeanRegressor.fit(x, y)
    }
}

/// Assert two floats agree to `tol`.
pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {} but got {} (tolerance {})",
        expected,
        actual,
        tol
    );
}
