//! Terminal rendering of query outcomes.
//!
//! Mirrors what the pipeline produced, section by section: what the query
//! was understood to involve, the filtered rows (when a filter ran), then
//! the narrative. The register is 45 columns wide, far too wide for a
//! terminal, so tables show a fixed set of headline columns.

use risklens_agent::{IntentLabel, IntentSet, QueryOutcome};
use risklens_core::{RiskRegister, Value};

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Headline columns shown in tables, with display widths.
const DISPLAY_COLUMNS: &[(&str, usize)] = &[
    ("RiskIDNumber", 12),
    ("Risk Area", 20),
    ("Contract:Region", 16),
    ("Status", 10),
    ("Risk Owner", 16),
    ("Impact (£) - Expected", 14),
];

/// Cap on rows printed for a filtered subset.
const MAX_TABLE_ROWS: usize = 25;

/// Rows shown in the startup preview.
const PREVIEW_ROWS: usize = 5;

const NO_MATCHES: &str = "There are no risks matching this criteria.";

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Print one query outcome.
pub fn render_outcome(outcome: &QueryOutcome) {
    println!();
    println!("  {}", action_notice(&outcome.intents));

    if let Some(filtered) = &outcome.filtered {
        println!();
        println!("  Filtered Data");
        println!("  -------------");
        if let Some(explanation) = &outcome.filter_explanation {
            println!("  Filter applied: {explanation}");
        }
        println!();
        if filtered.is_empty() {
            println!("  {NO_MATCHES}");
        } else {
            print_table(filtered, MAX_TABLE_ROWS);
        }
    }

    if let Some(narrative) = outcome.narrative() {
        println!();
        println!("  Summary");
        println!("  -------");
        println!("{}", indent(narrative));
    }
    println!();
}

/// Print the loaded register's headline view at startup.
pub fn render_preview(register: &RiskRegister) {
    println!();
    if register.is_empty() {
        println!("  The register is empty.");
    } else {
        print_table(register, PREVIEW_ROWS);
    }
    println!();
}

/// One line telling the user how their question was understood.
fn action_notice(intents: &IntentSet) -> String {
    if intents.is_empty() {
        return "That question didn't map to any register operations.".into();
    }
    let phrases: Vec<&str> = intents.iter().map(action_phrase).collect();
    format!("This query involves {}.", phrases.join(", then "))
}

fn action_phrase(label: IntentLabel) -> &'static str {
    match label {
        IntentLabel::FilterData => "filtering the data",
        IntentLabel::SummariseRisks => "generating a data summary",
        IntentLabel::Other => "generating a final answer",
    }
}

fn print_table(register: &RiskRegister, limit: usize) {
    let header: Vec<String> = DISPLAY_COLUMNS
        .iter()
        .map(|(name, width)| clip(name, *width))
        .collect();
    println!("  {}", header.join("  "));
    println!(
        "  {}",
        DISPLAY_COLUMNS
            .iter()
            .map(|(_, width)| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  ")
    );

    for row in register.rows().iter().take(limit) {
        let line: Vec<String> = DISPLAY_COLUMNS
            .iter()
            .map(|(name, width)| {
                let text = row.cell(name).map(Value::to_string).unwrap_or_default();
                clip(&text, *width)
            })
            .collect();
        println!("  {}", line.join("  "));
    }

    if register.len() > limit {
        println!("  ({} rows, first {limit} shown)", register.len());
    } else {
        println!("  ({} rows)", register.len());
    }
}

/// Pad or truncate to exactly `width` characters.
fn clip(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        let mut out = String::with_capacity(width);
        out.push_str(text);
        for _ in count..width {
            out.push(' ');
        }
        out
    } else {
        let mut out: String = text.chars().take(width.saturating_sub(3)).collect();
        out.push_str("...");
        out
    }
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
