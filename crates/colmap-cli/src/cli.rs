//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use colmap::OutputFormat;

use crate::logging::LogFormat;

/// colmap: map spreadsheet columns onto a template
#[derive(Parser)]
#[command(name = "colmap")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format (pretty, compact, json)
    #[arg(long, global = true, default_value = "pretty")]
    pub log_format: LogFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Map a source file onto a template and save a session
    Map {
        /// Template whose header row defines the output columns
        #[arg(value_name = "TEMPLATE")]
        template: PathBuf,

        /// Uploaded data file (CSV, TSV, or a workbook such as xlsx)
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Output path for the session file (default: <source>.colmap.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Lexical acceptance threshold (50-100)
        #[arg(short, long, default_value = "70")]
        threshold: u8,

        #[command(flatten)]
        llm: LlmArgs,
    },

    /// Assign or clear the source of one target column
    Set {
        /// Session file or source data file
        #[arg(value_name = "SESSION")]
        session: PathBuf,

        /// Target column to edit
        #[arg(value_name = "TARGET")]
        target: String,

        /// Source column to assign
        #[arg(value_name = "SOURCE", required_unless_present = "unassign")]
        source: Option<String>,

        /// Leave the target without a source
        #[arg(long, conflicts_with = "source")]
        unassign: bool,
    },

    /// Resolve the mapping again, optionally with fresh AI suggestions
    Remap {
        /// Session file or source data file
        #[arg(value_name = "SESSION")]
        session: PathBuf,

        /// New lexical acceptance threshold (50-100)
        #[arg(short, long)]
        threshold: Option<u8>,

        #[command(flatten)]
        llm: LlmArgs,

        /// Recompute manual entries too
        #[arg(long)]
        replace_manual: bool,
    },

    /// Show the mapping table and suggestion status
    Status {
        /// Session file or source data file
        #[arg(value_name = "SESSION")]
        session: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the best lexical candidates for each target column
    Candidates {
        /// Session file or source data file
        #[arg(value_name = "SESSION")]
        session: PathBuf,

        /// Candidates per target
        #[arg(short = 'n', long, default_value = "3")]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the source rows in template order
    Convert {
        /// Session file or source data file
        #[arg(value_name = "SESSION")]
        session: PathBuf,

        /// Output path (default: <source>.converted.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: csv, tsv, json, xlsx (default: from the output extension, else csv)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Print the first N converted rows instead of writing a file
        #[arg(long, value_name = "N")]
        preview: Option<usize>,
    },
}

/// Model backend options shared by `map` and `remap`.
#[derive(clap::Args, Clone, Debug)]
pub struct LlmArgs {
    /// LLM provider for cross-language suggestions
    #[arg(long, default_value = "none")]
    pub llm: LlmProviderChoice,

    /// Ollama model (llama3.2, llama3.1, llama2, mistral, codellama)
    #[arg(long)]
    pub model: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value = "120")]
    pub timeout: u64,
}

/// LLM provider choice for suggestions
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LlmProviderChoice {
    /// No LLM - lexical matching only
    #[default]
    None,
    /// Ollama local models (requires Ollama running)
    Ollama,
    /// Mock provider for testing
    Mock,
}

impl std::str::FromStr for LlmProviderChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "off" => Ok(LlmProviderChoice::None),
            "ollama" | "local" => Ok(LlmProviderChoice::Ollama),
            "mock" | "test" => Ok(LlmProviderChoice::Mock),
            _ => Err(format!(
                "Unknown provider: {}. Use: none, ollama, or mock.",
                s
            )),
        }
    }
}

impl std::fmt::Display for LlmProviderChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProviderChoice::None => write!(f, "none"),
            LlmProviderChoice::Ollama => write!(f, "ollama"),
            LlmProviderChoice::Mock => write!(f, "mock"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_map() {
        let cli = Cli::try_parse_from([
            "colmap", "-vv", "map", "t.csv", "s.csv", "--llm", "ollama", "--model", "mistral",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Map { llm, threshold, .. } => {
                assert_eq!(llm.llm, LlmProviderChoice::Ollama);
                assert_eq!(llm.model.as_deref(), Some("mistral"));
                assert_eq!(threshold, 70);
            }
            _ => panic!("expected map"),
        }
    }

    #[test]
    fn test_set_requires_source_or_unassign() {
        assert!(Cli::try_parse_from(["colmap", "set", "s.colmap.json", "Name"]).is_err());
        assert!(
            Cli::try_parse_from(["colmap", "set", "s.colmap.json", "Name", "--unassign"]).is_ok()
        );
        assert!(
            Cli::try_parse_from(["colmap", "set", "s.colmap.json", "Name", "名称", "--unassign"])
                .is_err()
        );
    }

    #[test]
    fn test_parse_convert_to_xlsx() {
        let cli = Cli::try_parse_from(["colmap", "convert", "s.colmap.json", "-f", "xlsx"]).unwrap();
        match cli.command {
            Commands::Convert { format, .. } => assert_eq!(format, Some(OutputFormat::Xlsx)),
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn test_provider_choice() {
        assert_eq!("Local".parse::<LlmProviderChoice>().unwrap(), LlmProviderChoice::Ollama);
        assert!("openai".parse::<LlmProviderChoice>().is_err());
    }
}
