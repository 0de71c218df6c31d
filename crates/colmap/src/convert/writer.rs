//! Writing converted data to disk.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use rust_xlsxwriter::{Format, Workbook};
use tracing::info;

use super::projector::ConversionResult;
use crate::error::{ColmapError, Result};

/// Output file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Csv,
    Tsv,
    Json,
    Xlsx,
}

impl OutputFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        ext.parse().ok()
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
            OutputFormat::Xlsx => "xlsx",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ColmapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "tsv" | "tab" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            "xlsx" | "excel" => Ok(OutputFormat::Xlsx),
            _ => Err(ColmapError::UnsupportedFormat(format!(
                "Unknown output format: {}. Use csv, tsv, json, or xlsx.",
                s
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl ConversionResult {
    /// Write to `path`, creating parent directories.
    pub fn write(&self, path: impl AsRef<Path>, format: OutputFormat) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| ColmapError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let file = File::create(path).map_err(|e| ColmapError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer, format)?;
        writer.flush().map_err(|e| ColmapError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!(path = %path.display(), %format, rows = self.row_count(), "wrote converted file");
        Ok(())
    }

    /// Write to any writer.
    pub fn write_to<W: Write>(&self, writer: W, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Csv => self.write_delimited(writer, b','),
            OutputFormat::Tsv => self.write_delimited(writer, b'\t'),
            OutputFormat::Json => self.write_json(writer),
            OutputFormat::Xlsx => self.write_xlsx(writer),
        }
    }

    fn write_delimited<W: Write>(&self, writer: W, delimiter: u8) -> Result<()> {
        let mut out = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);

        out.write_record(&self.headers)?;
        for row in &self.rows {
            out.write_record(row)?;
        }
        out.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        let objects: Vec<_> = (0..self.row_count())
            .filter_map(|i| self.row_map(i))
            .collect();
        serde_json::to_writer_pretty(writer, &objects)?;
        Ok(())
    }

    /// One sheet with a bold header row. Empty cells are left blank.
    fn write_xlsx<W: Write>(&self, mut writer: W) -> Result<()> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Converted")?;

        for (col, header) in self.headers.iter().enumerate() {
            sheet.write_string_with_format(0, xlsx_col(col)?, header, &bold)?;
        }
        for (idx, row) in self.rows.iter().enumerate() {
            let xlsx_row = u32::try_from(idx + 1).map_err(|_| too_large("rows", idx + 1))?;
            for (col, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    sheet.write_string(xlsx_row, xlsx_col(col)?, value)?;
                }
            }
        }

        let bytes = workbook.save_to_buffer()?;
        writer.write_all(&bytes).map_err(|e| ColmapError::Io {
            path: "<xlsx buffer>".into(),
            source: e,
        })?;
        Ok(())
    }
}

fn xlsx_col(col: usize) -> Result<u16> {
    u16::try_from(col).map_err(|_| too_large("columns", col + 1))
}

fn too_large(what: &str, count: usize) -> ColmapError {
    ColmapError::UnsupportedFormat(format!("{} {} exceed the xlsx sheet limits", count, what))
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    fn result() -> ConversionResult {
        ConversionResult {
            headers: vec!["Zeta".into(), "Alpha".into()],
            rows: vec![vec!["1".into(), "a, b".into()], vec!["2".into(), "".into()]],
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("TSV".parse::<OutputFormat>().unwrap(), OutputFormat::Tsv);
        assert_eq!("xlsx".parse::<OutputFormat>().unwrap(), OutputFormat::Xlsx);
        assert!("xml".parse::<OutputFormat>().is_err());
        assert_eq!(
            OutputFormat::from_path(Path::new("out/data.json")),
            Some(OutputFormat::Json)
        );
        assert_eq!(OutputFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_csv_quotes_fields() {
        let mut buf = Vec::new();
        result().write_to(&mut buf, OutputFormat::Csv).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "Zeta,Alpha\n1,\"a, b\"\n2,\n");
    }

    #[test]
    fn test_json_keeps_target_order() {
        let mut buf = Vec::new();
        result().write_to(&mut buf, OutputFormat::Json).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let zeta = text.find("\"Zeta\"").unwrap();
        let alpha = text.find("\"Alpha\"").unwrap();
        assert!(zeta < alpha);

        let parsed: Vec<Value> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["Alpha"], "a, b");
    }

    #[test]
    fn test_xlsx_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("converted.xlsx");
        result().write(&path, OutputFormat::Xlsx).unwrap();

        let (table, metadata) = crate::input::Parser::new().parse_file(&path).unwrap();
        assert_eq!(metadata.format, "xlsx");
        assert_eq!(table.headers, vec!["Zeta", "Alpha"]);
        assert_eq!(table.rows, vec![vec!["1", "a, b"], vec!["2", ""]]);
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.tsv");
        result().write(&path, OutputFormat::Tsv).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Zeta\tAlpha\n"));
    }
}
