//! CSV/TSV parser with delimiter detection. Workbooks are handed to
//! [`workbook`](super::workbook).

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::debug;

use super::source::{DataTable, SourceMetadata};
use super::workbook;
use crate::error::{ColmapError, Result};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Spreadsheet workbook extensions, read from their first sheet.
const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
    /// Return a table with no columns for a blank file instead of failing.
    pub allow_empty: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
            allow_empty: false,
        }
    }
}

impl ParserConfig {
    /// Force a delimiter instead of auto-detecting one.
    ///
    /// Accepts a single ASCII character, or the escape `\t` for tab.
    pub fn with_delimiter(mut self, delimiter: &str) -> Result<Self> {
        let byte = match delimiter {
            "\\t" | "tab" => b'\t',
            d if d.len() == 1 && d.is_ascii() => d.as_bytes()[0],
            other => return Err(ColmapError::InvalidDelimiter(other.to_string())),
        };
        self.delimiter = Some(byte);
        Ok(self)
    }

    /// Limit the number of data rows read.
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    /// Accept files without any column.
    pub fn with_allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }
}

/// Parses tabular data files.
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the data table and metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(DataTable, SourceMetadata)> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| ColmapError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let metadata = file.metadata().map_err(|e| ColmapError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let size_bytes = metadata.len();

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(|e| ColmapError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let hash = content_hash(&contents);
        let (data_table, format) = match workbook_extension(path) {
            Some(ext) => (
                workbook::read_first_sheet(path, &self.config)?,
                ext.to_string(),
            ),
            None => {
                let (table, delimiter) = self.parse_contents(&contents)?;
                (table, format_name(delimiter).to_string())
            }
        };

        let source_metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            format,
            data_table.row_count(),
            data_table.column_count(),
        );

        debug!(
            file = %source_metadata.file,
            format = %source_metadata.format,
            rows = source_metadata.row_count,
            columns = source_metadata.column_count,
            "parsed tabular file"
        );

        Ok((data_table, source_metadata))
    }

    /// Parse in-memory delimited text.
    pub fn parse_str(&self, text: &str) -> Result<DataTable> {
        self.parse_contents(text.as_bytes()).map(|(table, _)| table)
    }

    fn parse_contents(&self, contents: &[u8]) -> Result<(DataTable, u8)> {
        let contents = contents.strip_prefix(UTF8_BOM).unwrap_or(contents);

        if self.config.allow_empty && contents.iter().all(u8::is_ascii_whitespace) {
            let delimiter = self.config.delimiter.unwrap_or(b',');
            return Ok((DataTable::new(Vec::new(), Vec::new(), delimiter), delimiter));
        }

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(contents)?,
        };

        Ok((self.parse_bytes(contents, delimiter)?, delimiter))
    }

    /// Parse bytes directly.
    fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<DataTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.config.has_header)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let mut records = Vec::new();
        for (row_idx, result) in reader.byte_records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }
            let record = result?;
            records.push(
                record
                    .iter()
                    .map(|field| String::from_utf8_lossy(field).into_owned())
                    .collect::<Vec<_>>(),
            );
        }

        let raw_headers: Vec<String> = if self.config.has_header {
            reader
                .byte_headers()?
                .iter()
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .collect()
        } else {
            match records.first() {
                Some(first) => vec![String::new(); first.len()],
                None => return Err(ColmapError::EmptyData("No data rows found".to_string())),
            }
        };

        if raw_headers.is_empty() || (raw_headers.iter().all(|h| h.is_empty()) && records.is_empty())
        {
            return Err(ColmapError::EmptyData("No header row found".to_string()));
        }

        let headers = disambiguate_headers(raw_headers);
        let expected_cols = headers.len();

        let rows = records
            .into_iter()
            .map(|mut row| {
                row.resize(expected_cols, String::new());
                row
            })
            .collect();

        Ok(DataTable::new(headers, rows, delimiter))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// SHA-256 of file contents, prefixed with the algorithm name.
pub fn content_hash(contents: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    format!("sha256:{:x}", hasher.finalize())
}

/// Lowercased extension when `path` names a spreadsheet workbook.
fn workbook_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    WORKBOOK_EXTENSIONS.iter().copied().find(|known| *known == ext)
}

fn format_name(delimiter: u8) -> &'static str {
    match delimiter {
        b'\t' => "tsv",
        b',' => "csv",
        b';' => "csv-semicolon",
        b'|' => "psv",
        _ => "delimited",
    }
}

/// Give blank headers a positional name and suffix repeated ones (`name`, `name.1`, ...).
pub(super) fn disambiguate_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut headers = Vec::with_capacity(raw.len());

    for (idx, name) in raw.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("column_{}", idx + 1)
        } else {
            name
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}.{}", base, suffix);
            suffix += 1;
        }

        seen.insert(candidate.clone());
        headers.push(candidate);
    }

    headers
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .split(b'\n')
        .take(10)
        .filter_map(|l| l.ok())
        .map(|l| String::from_utf8_lossy(&l).into_owned())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(ColmapError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let variance: f64 = if counts.len() > 1 {
            let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
            counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64
        } else {
            0.0
        };

        // Higher count with lower variance wins; tab breaks ties since it rarely appears in values.
        let score = if consistent {
            first_count * 1000 + if delim == b'\t' { 100 } else { 0 }
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}
