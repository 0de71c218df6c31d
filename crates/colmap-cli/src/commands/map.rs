//! Map command - map a source file onto a template and save the session.

use std::path::PathBuf;

use colored::Colorize;
use colmap::session_path;

use super::build_mapper;
use super::render::{print_mapping, print_summary, status_label};
use crate::cli::{LlmArgs, LlmProviderChoice};

pub fn run(
    template: PathBuf,
    source: PathBuf,
    output: Option<PathBuf>,
    threshold: u8,
    llm: LlmArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    for path in [&template, &source] {
        if !path.exists() {
            return Err(format!("File not found: {}", path.display()).into());
        }
    }

    println!(
        "{} {} {} {}",
        "Mapping".cyan().bold(),
        source.display().to_string().white(),
        "onto".cyan(),
        template.display().to_string().white()
    );

    let mapper = build_mapper(threshold, &llm, None)?;
    let session = mapper.map(&template, &source)?;

    if llm.llm != LlmProviderChoice::None {
        println!(
            "AI suggestions ({}): {}",
            mapper.config().llm.model,
            status_label(&session.suggestions().status)
        );
    }
    println!();

    let table = session
        .mapping()
        .ok_or("mapping was not produced")?;
    print_mapping(table);
    println!();
    print_summary(table);

    let output_path = output.unwrap_or_else(|| session_path(&source));
    session.to_file()?.save(&output_path)?;

    println!();
    println!(
        "{} {}",
        "Saved to".green().bold(),
        output_path.display().to_string().white()
    );

    let unmapped = table.summary().unmapped;
    if unmapped > 0 {
        println!(
            "Run {} to assign the {} unmapped column(s)",
            format!("colmap set {} <TARGET> <SOURCE>", output_path.display()).cyan(),
            unmapped
        );
    } else {
        println!(
            "Run {} to write the converted file",
            format!("colmap convert {}", output_path.display()).cyan()
        );
    }

    Ok(())
}
