//! Candidates command - fuzzy-match analysis per target column.

use std::path::PathBuf;

use colored::Colorize;

use super::open_session;
use super::render::origin_label;

pub fn run(
    session: PathBuf,
    limit: usize,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (_, session) = open_session(&session)?;
    let reports = session.candidates(limit)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    println!(
        "{} (threshold {})",
        "Lexical candidates".cyan().bold(),
        session.threshold()
    );

    for report in &reports {
        println!();
        let current = report.current.as_deref().unwrap_or("-");
        match report.origin {
            Some(origin) => println!(
                "{} <- {} ({})",
                report.target.white().bold(),
                current,
                origin_label(origin)
            ),
            None => println!("{} <- {}", report.target.white().bold(), current),
        }
        if let Some(ai) = &report.ai_suggestion {
            println!("  AI suggested: {}", ai.magenta());
        }

        if report.candidates.is_empty() {
            println!("  {}", "(no source columns)".dimmed());
        }
        for candidate in &report.candidates {
            let score = if candidate.accepted {
                format!("{:>3}", candidate.score).green()
            } else {
                format!("{:>3}", candidate.score).dimmed()
            };
            let claimed = match &candidate.claimed_by {
                Some(owner) if owner == &report.target => String::new(),
                Some(owner) => format!(" (used by {})", owner),
                None => String::new(),
            };
            println!("  {} {}{}", score, candidate.source, claimed.dimmed());
        }
    }

    Ok(())
}
