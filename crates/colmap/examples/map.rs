//! Example: Map an uploaded file onto a template with colmap.
//!
//! Usage:
//!   cargo run --example map -- <template_path> <source_path>
//!
//! Example:
//!   cargo run --example map -- template.csv upload.csv

use std::env;
use std::path::Path;

use colmap::{ColumnMapper, MockProvider, Origin, SuggestionStatus};

fn main() -> colmap::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: cargo run --example map -- <template_path> <source_path>");
        eprintln!("\nExample:");
        eprintln!("  cargo run --example map -- template.csv upload.csv");
        std::process::exit(1);
    }

    let template = Path::new(&args[1]);
    let source = Path::new(&args[2]);

    for path in [template, source] {
        if !path.exists() {
            eprintln!("Error: File not found: {}", path.display());
            std::process::exit(1);
        }
    }

    let separator = "=".repeat(80);
    println!("{}", separator);
    println!("colmap: {} -> {}", source.display(), template.display());
    println!("{}", separator);
    println!();

    // Mock LLM pairs identical names only (no local model needed)
    let mapper = ColumnMapper::new().with_llm(MockProvider::new());
    let session = mapper.map(template, source)?;

    if let Some(file) = session.source() {
        println!("## Source");
        println!("  File: {}", file.metadata.file);
        println!("  Format: {}", file.metadata.format);
        println!("  Rows: {}", file.metadata.row_count);
        println!("  Columns: {}", file.metadata.column_count);
        println!();
    }

    let status = match &session.suggestions().status {
        SuggestionStatus::Complete => "complete".to_string(),
        SuggestionStatus::Partial => "partial".to_string(),
        SuggestionStatus::Unavailable { reason } => format!("unavailable ({})", reason),
        SuggestionStatus::Disabled => "disabled".to_string(),
    };
    println!("## AI suggestions: {}", status);
    println!();

    let Some(table) = session.mapping() else {
        return Ok(());
    };

    println!("## Mapping ({} targets)", table.len());
    println!();
    for entry in table {
        let source = entry.source_name().unwrap_or("-");
        println!(
            "  {:25} <- {:25} {:>3}% {}",
            entry.target.raw(),
            source,
            entry.confidence,
            entry.origin
        );
    }
    println!();

    let summary = table.summary();
    println!("## Summary");
    println!("  AI: {}", summary.ai);
    println!("  Lexical: {}", summary.lexical);
    println!("  Unmapped: {}", summary.unmapped);
    println!();

    let unmapped: Vec<_> = table
        .iter()
        .filter(|e| e.origin == Origin::Unmapped)
        .map(|e| e.target.raw())
        .collect();
    if !unmapped.is_empty() {
        println!("  Needs review: {}", unmapped.join(", "));
        println!();
    }

    let converted = session.convert()?;
    println!("## Preview ({} rows)", converted.row_count());
    println!("  {}", converted.headers.join(" | "));
    for row in converted.rows.iter().take(5) {
        println!("  {}", row.join(" | "));
    }
    println!();

    println!("{}", separator);

    Ok(())
}
