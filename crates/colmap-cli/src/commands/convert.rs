//! Convert command - write the source rows in template order.

use std::path::{Path, PathBuf};

use colored::Colorize;
use colmap::OutputFormat;

use super::open_session;

pub fn run(
    session: PathBuf,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
    preview: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (_, session) = open_session(&session)?;
    let converted = session.convert()?;

    if let Some(limit) = preview {
        println!(
            "{} ({} of {} rows)",
            "Preview".cyan().bold(),
            limit.min(converted.row_count()),
            converted.row_count()
        );
        println!("{}", converted.headers.join("\t").bold());
        for row in converted.rows.iter().take(limit) {
            println!("{}", row.join("\t"));
        }
        return Ok(());
    }

    let format = format
        .or_else(|| output.as_deref().and_then(OutputFormat::from_path))
        .unwrap_or_default();

    let output_path = match output {
        Some(path) => path,
        None => {
            let source = session
                .source()
                .ok_or("session has no source file")?;
            default_output(&source.metadata.path, format)
        }
    };

    converted.write(&output_path, format)?;

    let empty = session.mapping().map(|m| m.summary().empty).unwrap_or(0);
    println!(
        "{} {} rows x {} columns to {} ({})",
        "Wrote".green().bold(),
        converted.row_count(),
        converted.column_count(),
        output_path.display().to_string().white(),
        format
    );
    if empty > 0 {
        println!(
            "{} {} column(s) have no source and were left empty",
            "Note:".yellow().bold(),
            empty
        );
    }

    Ok(())
}

/// `<source stem>.converted.<ext>` next to the source.
fn default_output(source: &Path, format: OutputFormat) -> PathBuf {
    let stem = source.file_stem().unwrap_or_default().to_string_lossy();
    source.with_file_name(format!("{}.converted.{}", stem, format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output() {
        assert_eq!(
            default_output(Path::new("in/upload.csv"), OutputFormat::Json),
            PathBuf::from("in/upload.converted.json")
        );
        assert_eq!(
            default_output(Path::new("upload.xlsx"), OutputFormat::Xlsx),
            PathBuf::from("upload.converted.xlsx")
        );
    }
}
