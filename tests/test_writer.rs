//! Tests for the prediction file writer

use nextpoint::pipeline::{write_prediction_table, write_predictions, PipelineError};
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_predictions_flatten_row_major() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("predictions.csv");
    let predictions = common::table(
        &["e0", "e1"],
        &[vec![0.1, 0.2], vec![0.3, 0.4], vec![0.5, 0.6]],
    );

    write_prediction_table(&path, &predictions).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "ID,predicted");
    assert_eq!(lines.len(), 7);

    let expected = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
    for (i, line) in lines[1..].iter().enumerate() {
        let (id, value) = line.split_once(',').unwrap();
        assert_eq!(id.parse::<usize>().unwrap(), i);
        common::assert_close(value.parse::<f64>().unwrap(), expected[i], 1e-12);
    }
}

#[test]
fn test_empty_prediction_vector() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("empty.csv");
    write_predictions(&path, &[]).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().next(), Some("ID,predicted"));
    assert_eq!(text.lines().count(), 1);
}

#[test]
fn test_unwritable_path() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing_dir").join("out.csv");
    let err = write_predictions(&path, &[1.0]).unwrap_err();
    assert!(matches!(err, PipelineError::Output { .. }));
}
