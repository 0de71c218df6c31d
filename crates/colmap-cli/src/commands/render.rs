//! Shared terminal rendering for mapping tables.

use colored::{ColoredString, Colorize};
use colmap::{MappingTable, Origin, SuggestionStatus};

pub fn origin_label(origin: Origin) -> ColoredString {
    match origin {
        Origin::Ai => "ai".magenta(),
        Origin::Lexical => "lexical".blue(),
        Origin::Manual => "manual".green(),
        Origin::Unmapped => "unmapped".red(),
    }
}

pub fn status_label(status: &SuggestionStatus) -> ColoredString {
    match status {
        SuggestionStatus::Complete => "complete".green(),
        SuggestionStatus::Partial => "partial (line fallback)".yellow(),
        SuggestionStatus::Unavailable { reason } => format!("unavailable: {}", reason).red(),
        SuggestionStatus::Disabled => "disabled".dimmed(),
    }
}

/// Print one row per target: target, source, confidence, origin.
pub fn print_mapping(table: &MappingTable) {
    let width = table
        .iter()
        .map(|e| e.target.raw().chars().count())
        .max()
        .unwrap_or(0)
        .max(6);

    println!(
        "  {:width$}  {:24} {:>5}  {}",
        "TARGET".bold(),
        "SOURCE".bold(),
        "CONF".bold(),
        "ORIGIN".bold(),
        width = width
    );
    for entry in table {
        let source = match entry.source_name() {
            Some(s) => s.white(),
            None => "-".dimmed(),
        };
        println!(
            "  {:width$}  {:24} {:>4}%  {}",
            entry.target.raw(),
            source,
            entry.confidence,
            origin_label(entry.origin),
            width = width
        );
    }
}

/// One-line counts by origin.
pub fn print_summary(table: &MappingTable) {
    let summary = table.summary();
    println!(
        "{} targets: {} ai, {} lexical, {} manual, {} unmapped",
        summary.total.to_string().white().bold(),
        summary.ai.to_string().magenta(),
        summary.lexical.to_string().blue(),
        summary.manual.to_string().green(),
        summary.unmapped.to_string().red()
    );
}
