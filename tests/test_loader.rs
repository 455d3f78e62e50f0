//! Unit tests for dataset loader

use nextpoint::pipeline::{load_table, load_training_data, PipelineError};
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_load_csv_drops_id_column() {
    let temp_dir = TempDir::new().unwrap();
    let path = common::write_raw_csv(
        temp_dir.path(),
        "t0.csv",
        &["ID,e0,e1", "sub-01,0.1,0.2", "sub-02,0.3,0.4"],
    );

    let table = load_table(&path).unwrap();
    assert_eq!(table.n_rows(), 2, "Should have 2 data rows");
    assert_eq!(table.names(), &["e0".to_string(), "e1".to_string()]);
    assert_eq!(table.column(1), &[0.2, 0.4]);
}

#[test]
fn test_load_integer_columns_as_floats() {
    let temp_dir = TempDir::new().unwrap();
    let path = common::write_raw_csv(temp_dir.path(), "ints.csv", &["ID,a", "1,3", "2,4"]);
    let table = load_table(&path).unwrap();
    assert_eq!(table.column(0), &[3.0, 4.0]);
}

#[test]
fn test_late_decimal_after_integer_rows() {
    let temp_dir = TempDir::new().unwrap();
    let mut lines = vec!["ID,e0,e1".to_string()];
    for i in 0..150 {
        let e0 = if i < 120 { "0" } else { "0.25" };
        lines.push(format!("s{},{},{}", i, e0, i));
    }
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    let path = common::write_raw_csv(temp_dir.path(), "late.csv", &lines);

    let table = load_table(&path).unwrap();
    assert_eq!(table.n_rows(), 150);
    assert_eq!(table.column(0)[119], 0.0);
    assert_eq!(table.column(0)[120], 0.25);
    assert_eq!(table.column(1)[149], 149.0);
}

#[test]
fn test_load_parquet_file() {
    let temp_dir = TempDir::new().unwrap();
    let source = common::table(&["x", "y"], &[vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]]);
    let path = common::write_parquet(temp_dir.path(), "t0.parquet", &source);

    let table = load_table(&path).unwrap();
    assert_eq!(table.n_rows(), 3);
    assert_eq!(table.names(), source.names());
    assert_eq!(table.column(1), &[4.0, 5.0, 6.0]);
}

#[test]
fn test_csv_and_parquet_agree() {
    let temp_dir = TempDir::new().unwrap();
    let (x, _) = common::create_connectivity_tables(6, 3);
    let csv = load_table(&common::write_csv(temp_dir.path(), "x.csv", &x)).unwrap();
    let parquet = load_table(&common::write_parquet(temp_dir.path(), "x.parquet", &x)).unwrap();

    assert_eq!(csv.names(), parquet.names());
    for c in 0..csv.n_cols() {
        for (a, b) in csv.column(c).iter().zip(parquet.column(c)) {
            common::assert_close(*a, *b, 1e-12);
        }
    }
}

#[test]
fn test_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let err = load_table(&temp_dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, PipelineError::DataLoad { .. }));
}

#[test]
fn test_unsupported_extension() {
    let temp_dir = TempDir::new().unwrap();
    let path = common::write_raw_csv(temp_dir.path(), "data.txt", &["ID,a", "1,2"]);
    let err = load_table(&path).unwrap_err();
    assert!(err.to_string().contains("unsupported file format"));
}

#[test]
fn test_non_numeric_cell_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = common::write_raw_csv(
        temp_dir.path(),
        "bad.csv",
        &["ID,a,b", "s1,1.0,2.0", "s2,oops,3.0"],
    );
    let err = load_table(&path).unwrap_err();
    assert!(matches!(err, PipelineError::DataLoad { .. }));
}

#[test]
fn test_empty_cell_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = common::write_raw_csv(
        temp_dir.path(),
        "gap.csv",
        &["ID,a,b", "s1,1.0,2.0", "s2,,3.0"],
    );
    let err = load_table(&path).unwrap_err();
    match err {
        PipelineError::DataLoad { reason, .. } => assert!(reason.contains("'a'")),
        other => panic!("expected a load error, got {:?}", other),
    }
}

#[test]
fn test_id_only_file_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = common::write_raw_csv(temp_dir.path(), "ids.csv", &["ID", "s1", "s2"]);
    assert!(matches!(
        load_table(&path),
        Err(PipelineError::DataLoad { .. })
    ));
}

#[test]
fn test_training_data_round_trip() {
    let (temp_dir, features, labels, test) = common::create_temp_dataset(10, 4, 3);
    let data = load_training_data(&features, &labels, Some(&test)).unwrap();

    assert_eq!(data.features.n_rows(), 10);
    assert_eq!(data.labels.n_cols(), 4);
    assert_eq!(data.test.as_ref().map(|t| t.n_rows()), Some(3));
    drop(temp_dir);
}

#[test]
fn test_row_count_mismatch_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let x = common::write_raw_csv(temp_dir.path(), "x.csv", &["ID,a", "1,1", "2,2", "3,3"]);
    let y = common::write_raw_csv(temp_dir.path(), "y.csv", &["ID,a", "1,1", "2,2"]);
    let err = load_training_data(&x, &y, None).unwrap_err();
    assert!(matches!(err, PipelineError::Schema(_)));
}

#[test]
fn test_test_columns_must_match_training() {
    let temp_dir = TempDir::new().unwrap();
    let x = common::write_raw_csv(temp_dir.path(), "x.csv", &["ID,a,b", "1,1,2", "2,2,3"]);
    let y = common::write_raw_csv(temp_dir.path(), "y.csv", &["ID,a,b", "1,1,2", "2,2,3"]);
    let t = common::write_raw_csv(temp_dir.path(), "t.csv", &["ID,b,a", "9,1,2"]);
    let err = load_training_data(&x, &y, Some(&t)).unwrap_err();
    assert!(matches!(err, PipelineError::Schema(_)));
}
