//! Status command - show the mapping table and suggestion status.

use std::path::PathBuf;

use colored::Colorize;

use super::open_session;
use super::render::{print_mapping, print_summary, status_label};

pub fn run(session: PathBuf, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (session_file, session) = open_session(&session)?;
    let table = session.mapping().ok_or("session has no mapping")?;
    let summary = table.summary();

    if json_output {
        let status = serde_json::json!({
            "session": session_file,
            "template": session.target().map(|t| &t.metadata.file),
            "source": session.source().map(|s| &s.metadata.file),
            "threshold": session.threshold(),
            "model": session.suggestions().model,
            "suggestions": session.suggestions().status,
            "discarded_suggestions": session.suggestions().discarded.len(),
            "summary": {
                "total": summary.total,
                "ai": summary.ai,
                "lexical": summary.lexical,
                "manual": summary.manual,
                "unmapped": summary.unmapped,
                "empty": summary.empty,
            },
            "mapping": table,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    if let (Some(target), Some(source)) = (session.target(), session.source()) {
        println!(
            "{} {} {} {}",
            "Mapping status for".cyan().bold(),
            source.metadata.file.white(),
            "onto".cyan(),
            target.metadata.file.white()
        );
    }
    println!();

    println!("Threshold: {}", session.threshold().to_string().white());
    let model = session.suggestions().model.as_deref().unwrap_or("-");
    println!(
        "AI suggestions ({}): {}",
        model,
        status_label(&session.suggestions().status)
    );
    let discarded = session.suggestions().discarded.len();
    if discarded > 0 {
        println!(
            "  {} suggestion(s) named unknown columns and were ignored",
            discarded.to_string().yellow()
        );
    }
    println!();

    print_mapping(table);
    println!();
    print_summary(table);

    if summary.empty > 0 {
        println!(
            "{} {} target column(s) will be empty in the converted file",
            "Note:".yellow().bold(),
            summary.empty
        );
    }

    Ok(())
}
