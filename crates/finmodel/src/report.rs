//! Rendering ledgers and chart data for the terminal

use std::fmt::Write;

use clap::ValueEnum;
use finmodel_core::{ChartData, Evaluation, ModelSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    Json,
    #[default]
    Table,
}

/// Format an amount in pounds with thousands separators
pub fn format_amount(value: f64) -> String {
    let abs_value = value.abs();
    let mut pennies = (abs_value * 100.0).round() as i64;
    let pounds = pennies / 100;
    pennies %= 100;

    let digits = pounds.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();

    if value < 0.0 && (pounds > 0 || pennies > 0) {
        format!("-£{grouped}.{pennies:02}")
    } else {
        format!("£{grouped}.{pennies:02}")
    }
}

pub fn render_ledger(ledger: &[Evaluation], format: OutputFormat) -> serde_json::Result<String> {
    if format == OutputFormat::Json {
        return serde_json::to_string_pretty(ledger);
    }

    let name_width = ledger.iter().map(|e| e.name.len()).max().unwrap_or(4).max(4);
    let mut out = String::new();
    let _ = writeln!(out, "{:<10}  {:<name_width$}  {:>16}  source", "date", "item", "value");
    for e in ledger {
        let _ = writeln!(
            out,
            "{:<10}  {:<name_width$}  {:>16}  {}",
            e.date.to_string(),
            e.name,
            format_amount(e.value),
            e.source
        );
    }
    Ok(out)
}

/// Final value of every item, sorted by name
pub fn render_summary(summary: &ModelSummary) -> String {
    let name_width = summary.final_values.keys().map(String::len).max().unwrap_or(4).max(4);
    let mut out = String::new();
    let _ = writeln!(out, "{} evaluations", summary.evaluation_count);
    for (name, value) in &summary.final_values {
        let date = summary
            .last_dates
            .get(name)
            .map(ToString::to_string)
            .unwrap_or_default();
        let _ = writeln!(out, "{name:<name_width$}  {:>16}  {date}", format_amount(*value));
    }
    out
}

pub fn render_chart(chart: &ChartData, format: OutputFormat) -> serde_json::Result<String> {
    if format == OutputFormat::Json {
        return serde_json::to_string_pretty(chart);
    }

    let mut out = String::new();
    let sections = [
        ("Assets", &chart.asset_data),
        ("Debts", &chart.debt_data),
        ("Incomes", &chart.incomes_data),
        ("Expenses", &chart.expenses_data),
        ("Taxes", &chart.tax_data),
    ];
    for (title, series) in sections {
        if series.is_empty() {
            continue;
        }
        let _ = writeln!(out, "== {title} ==");
        let name_width = series.iter().map(|s| s.item.len()).max().unwrap_or(4).max(4);
        let _ = write!(out, "{:<name_width$}", "");
        for label in &chart.labels {
            let _ = write!(out, "  {label:>16}");
        }
        out.push('\n');
        for s in series {
            let _ = write!(out, "{:<name_width$}", s.item);
            for y in s.values() {
                let _ = write!(out, "  {:>16}", format_amount(y));
            }
            out.push('\n');
        }
        out.push('\n');
    }
    Ok(out)
}
