//! Terminal tables for command results.

use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use flowml_core::{BalancedSample, FitOutcome};
use flowml_model::{FeatureSchema, is_benign};
use flowml_report::{AverageMetrics, ClassificationReport, PredictionSummary};

pub const NO_ATTACKS_MESSAGE: &str = "No attacks detected in this batch.";

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn percent(part: usize, total: usize) -> String {
    if total == 0 {
        "-".to_string()
    } else {
        format!("{:.1}%", part as f64 * 100.0 / total as f64)
    }
}

fn metric(value: f64) -> String {
    format!("{value:.4}")
}

/// Normal/attack totals for one batch.
pub fn prediction_table(summary: &PredictionSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Traffic"),
        header_cell("Rows"),
        header_cell("Share"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    table.add_row(vec![
        Cell::new("Normal"),
        count_cell(summary.normal, Color::Green),
        Cell::new(percent(summary.normal, summary.total)),
    ]);
    table.add_row(vec![
        Cell::new("Attack"),
        count_cell(summary.attack, Color::Red),
        Cell::new(percent(summary.attack, summary.total)),
    ]);
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(summary.total).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    table
}

/// Per-attack-type counts, or `None` when the batch has no attacks.
pub fn attack_table(summary: &PredictionSummary) -> Option<Table> {
    if !summary.has_attacks() {
        return None;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Attack type"), header_cell("Rows")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for entry in &summary.attack_types {
        table.add_row(vec![
            Cell::new(&entry.label).fg(Color::Red),
            Cell::new(entry.count),
        ]);
    }
    Some(table)
}

pub fn print_prediction_summary(summary: &PredictionSummary) {
    println!("{}", prediction_table(summary));
    match attack_table(summary) {
        Some(table) => {
            println!();
            println!("Attack breakdown:");
            println!("{table}");
        }
        None => println!("{NO_ATTACKS_MESSAGE}"),
    }
}

pub fn feature_table(schema: &FeatureSchema) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("#"), header_cell("Feature column")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (idx, name) in schema.iter().enumerate() {
        table.add_row(vec![Cell::new(idx + 1), Cell::new(name)]);
    }
    table
}

pub fn print_features(schema: &FeatureSchema) {
    println!("Required feature columns: {}", schema.len());
    println!("Schema fingerprint: {}", schema.fingerprint());
    println!("{}", feature_table(schema));
}

pub fn print_fit_outcome(outcome: &FitOutcome, output: &Path) {
    let artifact = &outcome.artifact;
    println!("Artifact: {}", output.display());
    println!("Schema fingerprint: {}", artifact.features().fingerprint());
    println!(
        "Rows used: {} (dropped {})",
        outcome.rows_used, outcome.rows_dropped
    );
    if !outcome.excluded_columns.is_empty() {
        println!(
            "Columns excluded: {}",
            outcome.excluded_columns.join(", ")
        );
    }
    println!("{}", feature_table(artifact.features()));
    let mut classes = Table::new();
    classes.set_header(vec![header_cell("Id"), header_cell("Class")]);
    apply_table_style(&mut classes);
    align_column(&mut classes, 0, CellAlignment::Right);
    for (id, class) in artifact.codec().classes().iter().enumerate() {
        classes.add_row(vec![Cell::new(id), Cell::new(class)]);
    }
    println!("{classes}");
}

fn average_row(name: &str, average: &AverageMetrics) -> Vec<Cell> {
    vec![
        Cell::new(name).add_attribute(Attribute::Bold),
        Cell::new(metric(average.precision)),
        Cell::new(metric(average.recall)),
        Cell::new(metric(average.f1)),
        Cell::new(average.support),
    ]
}

pub fn report_table(report: &ClassificationReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Class"),
        header_cell("Precision"),
        header_cell("Recall"),
        header_cell("F1"),
        header_cell("Support"),
    ]);
    apply_summary_table_style(&mut table);
    for idx in 1..5 {
        align_column(&mut table, idx, CellAlignment::Right);
    }
    for class in &report.classes {
        table.add_row(vec![
            Cell::new(&class.label),
            Cell::new(metric(class.precision)),
            Cell::new(metric(class.recall)),
            Cell::new(metric(class.f1)),
            Cell::new(class.support),
        ]);
    }
    table.add_row(average_row("macro avg", &report.macro_avg));
    table.add_row(average_row("weighted avg", &report.weighted_avg));
    table
}

pub fn print_report(report: &ClassificationReport) {
    println!(
        "Accuracy: {:.2}% ({}/{})",
        report.accuracy * 100.0,
        report.correct,
        report.total
    );
    println!("{}", report_table(report));
}

/// Rows per label in the drawn sample.
pub fn label_count_table(sample: &BalancedSample) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Label"), header_cell("Rows")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (label, count) in sample.label_counts() {
        let color = if is_benign(&label) {
            Color::Green
        } else {
            Color::Red
        };
        table.add_row(vec![Cell::new(label).fg(color), Cell::new(count)]);
    }
    table
}

pub fn print_sample(sample: &BalancedSample, labeled: &Path, features: &Path) {
    println!(
        "Sampled {} benign and {} attack rows",
        sample.benign_count, sample.attack_count
    );
    println!("{}", label_count_table(sample));
    println!("Labeled sample: {}", labeled.display());
    println!("Features only: {}", features.display());
}
