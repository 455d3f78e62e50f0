//! Terminal summaries: preprocessing outcome and cross-validation metrics

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::Prepared;

use super::metrics::{Aggregate, MetricsReport};

/// Summary of the final training-side preprocessing
#[derive(Debug)]
pub struct RunSummary {
    pub initial_features: usize,
    pub final_features: usize,
    pub dropped_correlation: Vec<String>,
    pub dropped_significance: Vec<String>,
    pub outlier_rows: Vec<usize>,
    pub training_rows: usize,
}

impl RunSummary {
    /// Summarise a fitted preprocessing pass.
    pub fn from_prepared(initial_features: usize, prepared: &Prepared<'_, '_>) -> Self {
        Self {
            initial_features,
            final_features: prepared.x.n_cols(),
            dropped_correlation: prepared.reduction.dropped_features(),
            dropped_significance: prepared
                .elimination
                .as_ref()
                .map(|e| e.removed_features())
                .unwrap_or_default(),
            outlier_rows: prepared.outlier_row_ids(),
            training_rows: prepared.x.n_rows(),
        }
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("PREPROCESSING SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("📁 Initial Features"),
            Cell::new(self.initial_features),
        ]);
        table.add_row(vec![
            Cell::new("🔗 Dropped (Correlation)"),
            count_cell(self.dropped_correlation.len()),
        ]);
        table.add_row(vec![
            Cell::new("📉 Dropped (Significance)"),
            count_cell(self.dropped_significance.len()),
        ]);
        table.add_row(vec![
            Cell::new("🧹 Outlier Rows"),
            count_cell(self.outlier_rows.len()),
        ]);
        table.add_row(vec![
            Cell::new("✅ Final Features"),
            Cell::new(self.final_features)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("🧪 Training Rows"),
            Cell::new(self.training_rows),
        ]);

        // Indent the table
        for line in table.to_string().lines() {
            println!("    {}", line);
        }

        if !self.outlier_rows.is_empty() {
            println!();
            println!(
                "      {} {}:",
                style("Rejected samples").yellow(),
                style(format!("({})", self.outlier_rows.len())).dim()
            );
            let rows: Vec<String> = self.outlier_rows.iter().map(|r| r.to_string()).collect();
            println!("        {} {}", style("•").dim(), rows.join(", "));
        }
    }
}

fn count_cell(count: usize) -> Cell {
    Cell::new(count).fg(if count == 0 { Color::White } else { Color::Red })
}

/// Print per-fold metrics and their mean/std.
pub fn display_metrics(report: &MetricsReport, row_diagnostics: bool) {
    println!();
    println!(
        "    {} {}",
        style("📊").cyan(),
        style("CROSS-VALIDATION").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Fold").add_attribute(Attribute::Bold),
        Cell::new("MSE").add_attribute(Attribute::Bold),
        Cell::new("MAE").add_attribute(Attribute::Bold),
        Cell::new("Pearson r").add_attribute(Attribute::Bold),
        Cell::new("Train").add_attribute(Attribute::Bold),
        Cell::new("Features").add_attribute(Attribute::Bold),
        Cell::new("Outliers").add_attribute(Attribute::Bold),
    ]);

    for fold in &report.folds {
        table.add_row(vec![
            Cell::new(fold.fold),
            number_cell(fold.mse, 6),
            number_cell(fold.mae, 6),
            number_cell(fold.pearson_r, 4),
            Cell::new(fold.train_size).set_alignment(CellAlignment::Right),
            Cell::new(fold.n_features).set_alignment(CellAlignment::Right),
            Cell::new(fold.n_outliers).set_alignment(CellAlignment::Right),
        ]);
    }

    table.add_row(vec![
        Cell::new("mean ± std").add_attribute(Attribute::Bold),
        aggregate_cell(&report.mse, 6),
        aggregate_cell(&report.mae, 6),
        aggregate_cell(&report.pearson_r, 4),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
    ]);

    for line in table.to_string().lines() {
        println!("    {}", line);
    }

    if row_diagnostics {
        display_row_diagnostics(report);
    }
}

fn display_row_diagnostics(report: &MetricsReport) {
    println!();
    println!(
        "    {} {}",
        style("🔎").cyan(),
        style("PER-SUBJECT DIAGNOSTICS").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Fold").add_attribute(Attribute::Bold),
        Cell::new("Row").add_attribute(Attribute::Bold),
        Cell::new("MAE").add_attribute(Attribute::Bold),
        Cell::new("Pearson r").add_attribute(Attribute::Bold),
    ]);
    for fold in &report.folds {
        for row in &fold.rows {
            table.add_row(vec![
                Cell::new(fold.fold),
                Cell::new(row.row_id),
                number_cell(row.mae, 6),
                number_cell(row.pearson_r, 4),
            ]);
        }
    }

    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn number_cell(value: f64, precision: usize) -> Cell {
    let text = if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.*}", precision, value)
    };
    Cell::new(text).set_alignment(CellAlignment::Right)
}

fn aggregate_cell(agg: &Aggregate, precision: usize) -> Cell {
    Cell::new(format!(
        "{:.*} ± {:.*}",
        precision, agg.mean, precision, agg.std
    ))
    .fg(Color::Cyan)
    .add_attribute(Attribute::Bold)
    .set_alignment(CellAlignment::Right)
}
