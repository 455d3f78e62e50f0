//! Terminal styling utilities

use console::{style, Emoji};
use std::path::Path;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static TARGET: Emoji<'_, '_> = Emoji("🎯 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static LINK: Emoji<'_, '_> = Emoji("🔗 ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    let banner = r#"
     _ __   _____  _| |_ _ __   ___ (_)_ __ | |_
    | '_ \ / _ \ \/ / __| '_ \ / _ \| | '_ \| __|
    | | | |  __/>  <| |_| |_) | (_) | | | | | |_
    |_| |_|\___/_/\_\\__| .__/ \___/|_|_| |_|\__|
                        |_|
    "#;

    println!();
    println!("{}", style(banner).cyan().bold());
    println!(
        "    {} {}",
        style("t0 → t1").magenta().bold(),
        style("Next-timepoint connectivity prediction").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Values shown on the configuration card
pub struct ConfigCard<'a> {
    pub train_features: &'a Path,
    pub train_labels: &'a Path,
    pub output: Option<&'a Path>,
    pub model: &'a str,
    pub correlation_threshold: f64,
    pub p_value_threshold: Option<f64>,
    pub outlier_threshold: Option<f64>,
}

/// Print configuration card
pub fn print_config(card: &ConfigCard) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(box_width - 20)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Features: {:<37}│",
        FOLDER,
        truncate_path(card.train_features, 36)
    );
    println!(
        "    │  {} Labels:   {:<37}│",
        TARGET,
        truncate_path(card.train_labels, 36)
    );
    let output = card
        .output
        .map(|p| truncate_path(p, 36))
        .unwrap_or_else(|| "(no test set)".to_string());
    println!("    │  {} Output:   {:<37}│", SAVE, output);
    println!("    ├{}┤", line);
    println!(
        "    │  {} Model:                 {:<24}│",
        CHART,
        style(card.model).yellow()
    );
    println!(
        "    │  {} Correlation threshold: {:<24}│",
        LINK,
        style(format!("{:.2}", card.correlation_threshold)).yellow()
    );
    println!(
        "    │  {} p-value threshold:     {:<24}│",
        CHART,
        style(threshold_text(card.p_value_threshold, 3)).yellow()
    );
    println!(
        "    │  {} Outlier threshold:     {:<24}│",
        CHART,
        style(threshold_text(card.outlier_threshold, 4)).yellow()
    );
    println!("    └{}┘", line);
    println!();
}

fn threshold_text(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "off".to_string(),
    }
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("nextpoint run complete!").green().bold()
    );
    println!();
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, threshold_info: Option<&str>) {
    if let Some(info) = threshold_info {
        println!(
            "      Found {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        );
    } else {
        println!("      Found {} {}", style(count).yellow().bold(), description);
    }
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_tail() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("abcdefghijkl", 8), "...hijkl");
    }
}
