//! Remap command - resolve the mapping again.

use std::path::PathBuf;

use colored::Colorize;
use colmap::ReplacementPolicy;

use super::render::{print_mapping, print_summary, status_label};
use super::{build_mapper, open_session};
use crate::cli::{LlmArgs, LlmProviderChoice};

pub fn run(
    session: PathBuf,
    threshold: Option<u8>,
    llm: LlmArgs,
    replace_manual: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (session_file, mut session) = open_session(&session)?;

    let threshold = threshold.unwrap_or(session.threshold());
    session.set_threshold(threshold)?;

    let previous_model = session.suggestions().model.clone();
    let mapper = build_mapper(threshold, &llm, previous_model.as_deref())?;

    let policy = if replace_manual {
        ReplacementPolicy::ReplaceAll
    } else {
        ReplacementPolicy::PreserveManual
    };

    println!(
        "{} {} (threshold {}, {})",
        "Remapping".cyan().bold(),
        session_file.display().to_string().white(),
        threshold,
        if replace_manual {
            "replacing manual entries"
        } else {
            "keeping manual entries"
        }
    );

    mapper.rerun(&mut session, policy)?;

    if llm.llm != LlmProviderChoice::None {
        println!(
            "AI suggestions: {}",
            status_label(&session.suggestions().status)
        );
    }
    println!();

    let table = session.mapping().ok_or("mapping was not produced")?;
    print_mapping(table);
    println!();
    print_summary(table);

    session.to_file()?.save(&session_file)?;
    println!();
    println!(
        "{} {}",
        "Saved to".green().bold(),
        session_file.display().to_string().white()
    );

    Ok(())
}
