//! Output formatting module

use cabfare_core::booking::BookingSnapshot;
use cabfare_core::{AllowanceField, FareBreakdown};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::scenarios::{ScenarioResult, Verdict};

/// Prints `value` as pretty JSON, or the table from `render`.
pub fn emit<T: Serialize>(
    format: OutputFormat,
    value: &T,
    render: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Table => print!("{}", render(value)),
    }
    Ok(())
}

pub fn render_fare(fare: &FareBreakdown) -> String {
    let mut out = String::new();
    out.push_str(&format!("\nFare Estimate ({})\n", fare.service_type));
    out.push_str(&"=".repeat(60));
    out.push('\n');

    for line in &fare.lines {
        out.push_str(&format!(
            "{:<18} {:<28} {:>12}\n",
            line.kind.label(),
            truncate_str(&line.description, 28),
            line.amount.to_string()
        ));
    }

    out.push_str(&"-".repeat(60));
    out.push('\n');
    out.push_str(&format!("{:<47} {:>12}\n", "Total", fare.total.to_string()));
    out
}

pub fn render_allowance(snapshot: &BookingSnapshot) -> String {
    let model = snapshot.vehicle_model.as_deref().unwrap_or("-");
    let category = if snapshot.category_matched {
        snapshot.vehicle_category.to_string()
    } else {
        format!("{} (default, model not recognised)", snapshot.vehicle_category)
    };
    let mode = match snapshot.allowance {
        AllowanceField::Auto { .. } => "auto",
        AllowanceField::Manual { .. } => "manual",
    };

    let mut out = String::new();
    out.push_str("\nDriver Allowance\n");
    out.push_str("================\n");
    out.push_str(&format!("Vehicle model:   {}\n", model));
    out.push_str(&format!("Category:        {}\n", category));
    out.push_str(&format!("Days:            {}\n", snapshot.days));
    out.push_str(&format!("Allowance:       {} ({})\n", snapshot.allowance.value(), mode));
    out
}

pub fn render_report(results: &[ScenarioResult]) -> String {
    let mut out = String::new();
    out.push_str("\nMarket Comparison\n");
    out.push_str(&"=".repeat(96));
    out.push('\n');
    out.push_str(&format!(
        "{:<44} {:>12} {:>24}  {}\n",
        "Scenario", "Estimate", "Market range", "Verdict"
    ));
    out.push_str(&"-".repeat(96));
    out.push('\n');

    for result in results {
        let range = format!("{} - {}", result.market_low, result.market_high);
        out.push_str(&format!(
            "{:<44} {:>12} {:>24}  {}\n",
            truncate_str(result.name, 44),
            result.estimate.to_string(),
            range,
            result.verdict.label()
        ));
    }

    let within = results
        .iter()
        .filter(|r| r.verdict == Verdict::Within)
        .count();
    out.push_str(&"-".repeat(96));
    out.push('\n');
    out.push_str(&format!("{} of {} estimates within market range\n", within, results.len()));
    out
}

fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}
