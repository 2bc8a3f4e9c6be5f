//! Terminal summaries of training metrics and classification reports

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::report::{ClassMetrics, ClassificationReport, TrainingMetrics};

fn score_color(value: f64) -> Color {
    if value >= 0.9 {
        Color::Green
    } else if value >= 0.7 {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn print_section_title(icon: &str, title: &str) {
    println!();
    println!("    {} {}", style(icon).cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

/// Print the trainer's metrics table
pub fn display_training_metrics(metrics: &TrainingMetrics) {
    print_section_title("📋", "TRAINING SUMMARY");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Metric").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);

    table.add_row(vec![Cell::new("🧪 Train rows"), Cell::new(metrics.n_train)]);
    table.add_row(vec![Cell::new("🔍 Test rows"), Cell::new(metrics.n_test)]);
    table.add_row(vec![
        Cell::new("🎯 Accuracy"),
        Cell::new(format!("{:.4}", metrics.accuracy))
            .fg(score_color(metrics.accuracy))
            .add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("⚖️  F1 (macro)"),
        Cell::new(format!("{:.4}", metrics.f1_macro))
            .fg(score_color(metrics.f1_macro))
            .add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("🔁 Solver iterations"),
        Cell::new(metrics.n_iter).fg(if metrics.converged {
            Color::White
        } else {
            Color::Yellow
        }),
    ]);

    print_indented(&table);
}

fn metrics_row(name: &str, m: &ClassMetrics) -> Vec<Cell> {
    vec![
        Cell::new(name),
        Cell::new(format!("{:.4}", m.precision)).set_alignment(CellAlignment::Right),
        Cell::new(format!("{:.4}", m.recall)).set_alignment(CellAlignment::Right),
        Cell::new(format!("{:.4}", m.f1_score))
            .fg(score_color(m.f1_score))
            .set_alignment(CellAlignment::Right),
        Cell::new(m.support).set_alignment(CellAlignment::Right),
    ]
}

/// Print the evaluator's per-class report table
pub fn display_classification_report(report: &ClassificationReport) {
    print_section_title("📊", "CLASSIFICATION REPORT");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Class").add_attribute(Attribute::Bold),
        Cell::new("Precision").add_attribute(Attribute::Bold),
        Cell::new("Recall").add_attribute(Attribute::Bold),
        Cell::new("F1-score").add_attribute(Attribute::Bold),
        Cell::new("Support").add_attribute(Attribute::Bold),
    ]);

    for label in &report.labels {
        if let Some(m) = report.per_class.get(label) {
            table.add_row(metrics_row(label, m));
        }
    }
    table.add_row(metrics_row("macro avg", &report.macro_avg));
    table.add_row(metrics_row("weighted avg", &report.weighted_avg));

    print_indented(&table);
    println!();
    println!(
        "      Accuracy: {}",
        style(format!("{:.4}", report.accuracy)).yellow().bold()
    );
}
