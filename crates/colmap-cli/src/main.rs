//! colmap CLI - map spreadsheet columns onto a template.

mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};
use logging::{LogConfig, init_logging};

fn main() {
    let cli = Cli::parse();

    init_logging(&LogConfig::from_flags(cli.verbose, cli.quiet).with_format(cli.log_format));

    let result = match cli.command {
        Commands::Map {
            template,
            source,
            output,
            threshold,
            llm,
        } => commands::map::run(template, source, output, threshold, llm),

        Commands::Set {
            session,
            target,
            source,
            unassign,
        } => commands::set::run(session, target, source, unassign),

        Commands::Remap {
            session,
            threshold,
            llm,
            replace_manual,
        } => commands::remap::run(session, threshold, llm, replace_manual),

        Commands::Status { session, json } => commands::status::run(session, json),

        Commands::Candidates {
            session,
            limit,
            json,
        } => commands::candidates::run(session, limit, json),

        Commands::Convert {
            session,
            output,
            format,
            preview,
        } => commands::convert::run(session, output, format, preview),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
