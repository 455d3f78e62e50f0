//! nextpoint: next-timepoint connectivity prediction CLI
//!
//! Loads current/next timepoint training matrices, cross-validates the
//! preprocessing + regression pipeline, fits it on the full training set and
//! writes predictions for the test subjects.

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;

use nextpoint::cli::{Cli, ModelKind};
use nextpoint::model::{
    AdaBoostRegressor, BayesianRidge, KnnRegressor, MeanRegressor, Predictor, Regressor, RidgeCv,
    VotingEnsemble,
};
use nextpoint::pipeline::{
    load_training_data, write_prediction_table, CrossValidator, LabelPairing, Preprocessor,
    RandomSource,
};
use nextpoint::report::{
    display_metrics, export_run_report, ExportParams, PreprocessingOutcome, RunConfig,
    RunMetadata, RunReport, RunSummary,
};
use nextpoint::utils::{
    create_fold_bar, create_spinner, finish_with_success, print_banner, print_completion,
    print_config, print_count, print_info, print_step_header, print_success, ConfigCard,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(cli.log_level()))
        .format_timestamp(None)
        .init();

    match cli.model {
        ModelKind::Mean => run(&cli, &MeanRegressor),
        ModelKind::RidgeCv => run(&cli, &RidgeCv::default()),
        ModelKind::BayesianRidge => run(&cli, &BayesianRidge::default()),
        ModelKind::Knn => run(&cli, &KnnRegressor::default()),
        ModelKind::AdaBoost => run(&cli, &AdaBoostRegressor::default()),
        ModelKind::Ensemble => run(&cli, &VotingEnsemble::default()),
    }
}

fn run<R: Regressor>(cli: &Cli, regressor: &R) -> Result<()> {
    let output_path = cli.output_path();
    let config = cli.preprocess_config();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&ConfigCard {
        train_features: &cli.train_features,
        train_labels: &cli.train_labels,
        output: output_path.as_deref(),
        model: regressor.name(),
        correlation_threshold: config.correlation_threshold,
        p_value_threshold: config.eliminate.then_some(config.p_value_threshold),
        outlier_threshold: config.filter_outliers.then_some(config.outlier_threshold),
    });

    // Step 1: Load data
    print_step_header(1, "Load Data");
    let spinner = create_spinner("Loading training and test data...");
    let data = load_training_data(
        &cli.train_features,
        &cli.train_labels,
        cli.test_features.as_deref(),
    )
    .context("Failed to load input data")?;
    finish_with_success(&spinner, "Data loaded");

    print_info(&format!(
        "Training: {} subjects, {} features, {} targets",
        data.features.n_rows(),
        data.features.n_cols(),
        data.labels.n_cols()
    ));
    if let Some(test) = &data.test {
        print_info(&format!("Test: {} subjects", test.n_rows()));
    }

    let pairing = if config.eliminate {
        let pairing = LabelPairing::resolve(&data.features, &data.labels)
            .context("Failed to pair feature columns with label columns")?;
        if !pairing.is_by_name() {
            print_info("Feature and label names differ; pairing columns by position");
        }
        Some(pairing)
    } else {
        None
    };
    let preprocessor = Preprocessor::new(config, pairing);

    let mut rng = RandomSource::new(cli.seed);
    let x = data.features.view();
    let y = data.labels.view();

    // Step 2: Cross-validation
    let cv_strategy = cli.cv_strategy();
    let metrics = match cv_strategy {
        Some(strategy) => {
            print_step_header(2, "Cross-Validation");
            let bar = create_fold_bar("Evaluating folds");
            let cv = CrossValidator::new(strategy).with_progress(bar.clone());
            print_info(&format!(
                "{} folds over {} subjects (seed {})",
                cv.n_folds(x.n_rows()),
                x.n_rows(),
                rng.seed()
            ));
            let report = cv
                .evaluate(regressor, &preprocessor, &x, &y, &mut rng)
                .context("Cross-validation failed")?;
            finish_with_success(&bar, "Cross-validation complete");
            display_metrics(&report, cli.row_diagnostics);
            Some(report)
        }
        None => {
            print_info("Cross-validation skipped");
            None
        }
    };

    // Step 3: Preprocess the full training set
    print_step_header(3, "Preprocess Training Set");
    let spinner = create_spinner("Reducing features and rejecting outliers...");
    let prepared = preprocessor
        .fit(regressor, &x, &y)
        .context("Failed to preprocess the training set")?;
    finish_with_success(&spinner, "Preprocessing complete");

    print_count(
        "collinear features",
        prepared.reduction.dropped.len(),
        Some(&format!("(|r| >= {})", config.correlation_threshold)),
    );
    if let Some(elimination) = &prepared.elimination {
        print_count(
            "insignificant features",
            elimination.removed_features().len(),
            Some(&format!("(p > {})", config.p_value_threshold)),
        );
    }
    if config.filter_outliers {
        print_count(
            "outlier samples",
            prepared.outlier_row_ids().len(),
            Some(&format!("(mse > {})", config.outlier_threshold)),
        );
    }

    // Step 4: Fit and predict
    print_step_header(4, "Fit and Predict");
    match (&data.test, &output_path) {
        (Some(test), Some(output)) => {
            let spinner = create_spinner("Fitting final model...");
            let model = regressor
                .fit(&prepared.x, &prepared.y)
                .context("Failed to fit the final model")?;
            let predictions = model
                .predict(&prepared.project(&test.view()))
                .context("Failed to predict the test subjects")?;
            finish_with_success(&spinner, "Model fitted");

            write_prediction_table(output, &predictions)
                .context("Failed to write predictions")?;
            print_success(&format!(
                "Wrote {} predictions to {}",
                predictions.n_rows() * predictions.n_cols(),
                output.display()
            ));
        }
        _ => print_info("No test features given; skipping prediction"),
    }

    let summary = RunSummary::from_prepared(data.features.n_cols(), &prepared);
    summary.display();

    if let Some(report_path) = &cli.report {
        let mut cross_validation = metrics;
        if !cli.row_diagnostics {
            if let Some(report) = cross_validation.as_mut() {
                report.folds.iter_mut().for_each(|f| f.rows.clear());
            }
        }
        let report = RunReport {
            metadata: RunMetadata::new(&ExportParams {
                train_features: &cli.train_features,
                train_labels: &cli.train_labels,
                test_features: cli.test_features.as_deref(),
                model: regressor.name(),
            }),
            config: RunConfig::new(preprocessor.config(), cv_strategy, cli.seed),
            preprocessing: Some(PreprocessingOutcome::from_prepared(
                data.features.n_cols(),
                &prepared,
            )),
            cross_validation,
        };
        export_run_report(&report, report_path)?;
        print_success(&format!("Run report saved to {}", report_path.display()));
    }

    print_completion();

    Ok(())
}
