//! Set command - assign or clear the source of one target column.

use std::path::PathBuf;

use colored::Colorize;
use colmap::OverrideAction;

use super::open_session;
use super::render::origin_label;

pub fn run(
    session: PathBuf,
    target: String,
    source: Option<String>,
    unassign: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (session_file, mut session) = open_session(&session)?;

    let action = match (source, unassign) {
        (_, true) => OverrideAction::Unassign,
        (Some(source), false) => OverrideAction::Assign(source),
        (None, false) => return Err("give a SOURCE column or --unassign".into()),
    };

    let outcome = session.apply_override(&target, action)?;

    let previous = outcome.previous.source_name().unwrap_or("-");
    let current = session
        .mapping()
        .and_then(|m| m.source_for(&target))
        .map(|c| c.raw().to_string())
        .unwrap_or_else(|| "-".to_string());

    println!(
        "{} {}: {} ({}) -> {} ({})",
        "Set".green().bold(),
        target.white().bold(),
        previous,
        origin_label(outcome.previous.origin),
        current.white(),
        origin_label(colmap::Origin::Manual)
    );

    if let Some(displaced) = &outcome.displaced {
        println!(
            "{} {} lost its source and is now unmapped",
            "Warning:".yellow().bold(),
            displaced.raw().white()
        );
    }

    session.to_file()?.save(&session_file)?;
    println!(
        "{} {}",
        "Saved to".green().bold(),
        session_file.display().to_string().white()
    );

    Ok(())
}
