//! Column arena and immutable views
//!
//! A [`Table`] owns the numeric data of one input file, stored column-major.
//! Every later stage works on [`TableView`]s: an ordered selection of table
//! rows and table columns. Folds, pruned feature sets and outlier-free
//! training sets are all views over the same arena, so the arena is never
//! copied or mutated and each view can report exactly which original rows
//! it touches.

use std::collections::HashSet;

use faer::Mat;

use super::error::{PipelineError, Result};

/// Column-major arena of uniquely named numeric columns of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    n_rows: usize,
}

impl Table {
    /// Build a table from named columns.
    ///
    /// Fails with [`PipelineError::Schema`] when the name and column counts
    /// differ, a name repeats, or the columns have different lengths.
    pub fn new(names: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self> {
        if names.len() != columns.len() {
            return Err(PipelineError::Schema(format!(
                "{} column names for {} columns",
                names.len(),
                columns.len()
            )));
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(PipelineError::Schema(format!(
                    "duplicate column name '{}'",
                    name
                )));
            }
        }

        let n_rows = columns.first().map_or(0, Vec::len);
        if let Some((idx, col)) = columns.iter().enumerate().find(|(_, c)| c.len() != n_rows) {
            return Err(PipelineError::Schema(format!(
                "column '{}' has {} rows, expected {}",
                names[idx],
                col.len(),
                n_rows
            )));
        }

        Ok(Self {
            names,
            columns,
            n_rows,
        })
    }

    /// Build a table from row-major records.
    pub fn from_rows(names: Vec<String>, rows: &[Vec<f64>]) -> Result<Self> {
        let n_cols = names.len();
        let mut columns = vec![Vec::with_capacity(rows.len()); n_cols];
        for (r, row) in rows.iter().enumerate() {
            if row.len() != n_cols {
                return Err(PipelineError::Schema(format!(
                    "row {} has {} values, expected {}",
                    r,
                    row.len(),
                    n_cols
                )));
            }
            for (col, &value) in columns.iter_mut().zip(row) {
                col.push(value);
            }
        }
        Self::new(names, columns)
    }

    /// Build a table from a dense matrix, one name per matrix column.
    pub fn from_mat(names: Vec<String>, mat: &Mat<f64>) -> Result<Self> {
        let columns = (0..mat.ncols())
            .map(|j| (0..mat.nrows()).map(|i| mat[(i, j)]).collect())
            .collect();
        Self::new(names, columns)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, idx: usize) -> &[f64] {
        &self.columns[idx]
    }

    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.columns[col][row]
    }

    /// Index of the column called `name`, if any.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// View covering every row and column.
    pub fn view(&self) -> TableView<'_> {
        TableView {
            table: self,
            rows: (0..self.n_rows).collect(),
            cols: (0..self.n_cols()).collect(),
        }
    }

    /// All values flattened row-major.
    pub fn row_major_values(&self) -> Vec<f64> {
        self.view().row_major_values()
    }
}

/// Boolean retention flags over the columns of one [`Table`].
///
/// Always as long as the table's original column count, so masks computed
/// on a training view apply unchanged to the matching test view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMask {
    keep: Vec<bool>,
}

impl ColumnMask {
    /// Mask retaining all `len` columns.
    pub fn all(len: usize) -> Self {
        Self {
            keep: vec![true; len],
        }
    }

    /// Mask retaining exactly the columns a view currently selects.
    pub fn from_view(view: &TableView<'_>) -> Self {
        let mut keep = vec![false; view.table().n_cols()];
        for &c in view.col_ids() {
            keep[c] = true;
        }
        Self { keep }
    }

    pub fn len(&self) -> usize {
        self.keep.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keep.is_empty()
    }

    pub fn is_retained(&self, col: usize) -> bool {
        self.keep.get(col).copied().unwrap_or(false)
    }

    /// Mark table column `col` removed.
    pub fn drop_column(&mut self, col: usize) {
        if let Some(flag) = self.keep.get_mut(col) {
            *flag = false;
        }
    }

    /// Number of retained columns.
    pub fn retained(&self) -> usize {
        self.keep.iter().filter(|&&k| k).count()
    }

    /// Table column indices still retained, ascending.
    pub fn retained_indices(&self) -> Vec<usize> {
        self.keep
            .iter()
            .enumerate()
            .filter_map(|(i, &k)| k.then_some(i))
            .collect()
    }
}

/// Immutable row and column selection over a [`Table`].
#[derive(Debug, Clone)]
pub struct TableView<'a> {
    table: &'a Table,
    rows: Vec<usize>,
    cols: Vec<usize>,
}

impl<'a> TableView<'a> {
    pub fn table(&self) -> &'a Table {
        self.table
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.cols.len()
    }

    /// Original table row ids, in view order.
    pub fn row_ids(&self) -> &[usize] {
        &self.rows
    }

    /// Original table column ids, in view order.
    pub fn col_ids(&self) -> &[usize] {
        &self.cols
    }

    /// Value at view position (`row`, `col`).
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.table.value(self.rows[row], self.cols[col])
    }

    pub fn column_name(&self, col: usize) -> &'a str {
        &self.table.names[self.cols[col]]
    }

    pub fn column_names(&self) -> Vec<String> {
        self.cols
            .iter()
            .map(|&c| self.table.names[c].clone())
            .collect()
    }

    /// Values of view column `col`, in view row order.
    pub fn column_values(&self, col: usize) -> Vec<f64> {
        let data = self.table.column(self.cols[col]);
        self.rows.iter().map(|&r| data[r]).collect()
    }

    /// Values of view row `row`, in view column order.
    pub fn row_values(&self, row: usize) -> Vec<f64> {
        let r = self.rows[row];
        self.cols.iter().map(|&c| self.table.value(r, c)).collect()
    }

    /// All rows as row-major records.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.n_rows()).map(|r| self.row_values(r)).collect()
    }

    /// All values flattened row-major.
    pub fn row_major_values(&self) -> Vec<f64> {
        let mut values = Vec::with_capacity(self.n_rows() * self.n_cols());
        for &r in &self.rows {
            for &c in &self.cols {
                values.push(self.table.value(r, c));
            }
        }
        values
    }

    /// Keep only the rows at the given view positions, in the given order.
    pub fn select_rows(&self, positions: &[usize]) -> TableView<'a> {
        TableView {
            table: self.table,
            rows: positions.iter().map(|&p| self.rows[p]).collect(),
            cols: self.cols.clone(),
        }
    }

    /// Keep only the columns at the given view positions, in the given order.
    pub fn select_cols(&self, positions: &[usize]) -> TableView<'a> {
        TableView {
            table: self.table,
            rows: self.rows.clone(),
            cols: positions.iter().map(|&p| self.cols[p]).collect(),
        }
    }

    /// Same rows, with the given table column ids.
    pub fn with_table_columns(&self, cols: Vec<usize>) -> TableView<'a> {
        TableView {
            table: self.table,
            rows: self.rows.clone(),
            cols,
        }
    }

    /// Keep the view's columns that `mask` retains; order is preserved.
    pub fn project(&self, mask: &ColumnMask) -> TableView<'a> {
        TableView {
            table: self.table,
            rows: self.rows.clone(),
            cols: self
                .cols
                .iter()
                .copied()
                .filter(|&c| mask.is_retained(c))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![
                vec![1.0, 2.0, 3.0],
                vec![4.0, 5.0, 6.0],
                vec![7.0, 8.0, 9.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let err = Table::new(vec!["a".into(), "a".into()], vec![vec![1.0], vec![2.0]]);
        assert!(matches!(err, Err(PipelineError::Schema(_))));
    }

    #[test]
    fn test_rejects_ragged_columns() {
        let err = Table::new(vec!["a".into(), "b".into()], vec![vec![1.0], vec![2.0, 3.0]]);
        assert!(matches!(err, Err(PipelineError::Schema(_))));
    }

    #[test]
    fn test_views_compose_over_original_ids() {
        let table = sample();
        let view = table.view().select_rows(&[2, 0]).select_rows(&[1]);
        assert_eq!(view.row_ids(), &[0]);
        assert_eq!(view.row_values(0), vec![1.0, 4.0, 7.0]);
    }

    #[test]
    fn test_project_uses_table_indices() {
        let table = sample();
        let mut mask = ColumnMask::all(3);
        mask.drop_column(1);
        let view = table.view().select_cols(&[2, 1, 0]).project(&mask);
        assert_eq!(view.col_ids(), &[2, 0]);
        assert_eq!(view.column_names(), vec!["c".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_row_major_flattening() {
        let table = sample();
        assert_eq!(
            table.row_major_values(),
            vec![1.0, 4.0, 7.0, 2.0, 5.0, 8.0, 3.0, 6.0, 9.0]
        );
    }

    #[test]
    fn test_mask_from_view() {
        let table = sample();
        let view = table.view().select_cols(&[2, 0]);
        let mask = ColumnMask::from_view(&view);
        assert_eq!(mask.retained_indices(), vec![0, 2]);
        assert_eq!(mask.len(), 3);
        assert_eq!(view.project(&mask).col_ids(), &[2, 0]);
    }
}
