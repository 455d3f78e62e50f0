//! Tests for CLI argument parsing and the end-to-end binary

use assert_cmd::Command;
use clap::Parser;
use nextpoint::cli::{Cli, ModelKind};
use nextpoint::pipeline::CvStrategy;
use predicates::prelude::*;
use std::path::PathBuf;

#[path = "common/mod.rs"]
mod common;

fn parse(extra: &[&str]) -> Cli {
    let mut args = vec![
        "nextpoint",
        "--train-features",
        "train_t0.csv",
        "--train-labels",
        "train_t1.csv",
    ];
    args.extend_from_slice(extra);
    Cli::parse_from(args)
}

#[test]
fn test_cli_default_values() {
    let cli = parse(&[]);

    assert_eq!(cli.correlation_threshold, 0.9, "Default correlation threshold should be 0.9");
    assert_eq!(cli.p_value_threshold, 0.05, "Default p-value threshold should be 0.05");
    assert_eq!(cli.outlier_threshold, 0.006, "Default outlier threshold should be 0.006");
    assert_eq!(cli.model, ModelKind::RidgeCv);
    assert_eq!(cli.seed, 1);
    assert_eq!(
        cli.cv_strategy(),
        Some(CvStrategy::KFold {
            k: 5,
            shuffle: true
        })
    );

    let config = cli.preprocess_config();
    assert!(config.eliminate);
    assert!(config.filter_outliers);
    assert_eq!(cli.log_level(), "warn");
}

#[test]
fn test_cli_stage_switches() {
    let cli = parse(&["--skip-elimination", "--skip-outliers", "--skip-cv"]);
    let config = cli.preprocess_config();
    assert!(!config.eliminate);
    assert!(!config.filter_outliers);
    assert_eq!(cli.cv_strategy(), None);
}

#[test]
fn test_cli_cv_options() {
    let loo = parse(&["--leave-one-out"]);
    assert_eq!(loo.cv_strategy(), Some(CvStrategy::LeaveOneOut));

    let kfold = parse(&["--folds", "10", "--no-shuffle"]);
    assert_eq!(
        kfold.cv_strategy(),
        Some(CvStrategy::KFold {
            k: 10,
            shuffle: false
        })
    );
}

#[test]
fn test_cli_model_names() {
    assert_eq!(parse(&["-m", "mean"]).model, ModelKind::Mean);
    assert_eq!(parse(&["--model", "bayesian-ridge"]).model, ModelKind::BayesianRidge);
    assert_eq!(parse(&["--model", "ada-boost"]).model, ModelKind::AdaBoost);
    assert_eq!(parse(&["--model", "ensemble"]).model, ModelKind::Ensemble);
}

#[test]
fn test_cli_output_path_derivation() {
    let cli = parse(&["--test-features", "/data/test_t0.csv"]);
    assert_eq!(
        cli.output_path(),
        Some(PathBuf::from("/data/test_t0_predictions.csv"))
    );
}

#[test]
fn test_cli_explicit_output_path() {
    let cli = parse(&["--test-features", "test.csv", "-o", "out.csv"]);
    assert_eq!(cli.output_path(), Some(PathBuf::from("out.csv")));
}

#[test]
fn test_cli_no_test_no_output() {
    let cli = parse(&["-o", "out.csv"]);
    assert_eq!(cli.output_path(), None);
}

#[test]
fn test_cli_verbosity() {
    assert_eq!(parse(&["-v"]).log_level(), "info");
    assert_eq!(parse(&["-vv"]).log_level(), "debug");
}

#[test]
fn test_cli_invalid_values_rejected() {
    let base = [
        "nextpoint",
        "--train-features",
        "a.csv",
        "--train-labels",
        "b.csv",
    ];
    for extra in [
        ["--correlation-threshold", "1.5"],
        ["--p-value-threshold", "-0.1"],
        ["--outlier-threshold", "-1"],
        ["--folds", "1"],
        ["--model", "svm"],
    ] {
        let args: Vec<&str> = base.iter().chain(extra.iter()).copied().collect();
        assert!(Cli::try_parse_from(args).is_err(), "{:?} should be rejected", extra);
    }
}

#[test]
fn test_cli_requires_training_files() {
    assert!(Cli::try_parse_from(["nextpoint", "--train-features", "a.csv"]).is_err());
}

#[test]
fn test_binary_writes_predictions() {
    let (temp_dir, features, labels, test) = common::create_temp_dataset(20, 3, 4);
    let output = temp_dir.path().join("predictions.csv");
    let report = temp_dir.path().join("report.json");

    Command::cargo_bin("nextpoint")
        .unwrap()
        .arg("--train-features")
        .arg(&features)
        .arg("--train-labels")
        .arg(&labels)
        .arg("--test-features")
        .arg(&test)
        .arg("--output")
        .arg(&output)
        .arg("--report")
        .arg(&report)
        .args(["--model", "mean", "--skip-outliers", "--folds", "4"])
        .assert()
        .success();

    let text = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "ID,predicted");
    assert_eq!(lines.len(), 1 + 4 * 3);
    assert!(lines.last().unwrap().starts_with("11,"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["metadata"]["model"], "mean");
    assert_eq!(json["cross_validation"]["folds"].as_array().unwrap().len(), 4);
    assert_eq!(json["config"]["seed"], 1);
}

#[test]
fn test_binary_reports_missing_input() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    Command::cargo_bin("nextpoint")
        .unwrap()
        .arg("--train-features")
        .arg(temp_dir.path().join("absent_t0.csv"))
        .arg("--train-labels")
        .arg(temp_dir.path().join("absent_t1.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load input data"));
}
