//! Spreadsheet workbooks (xlsx, xls, ods) read through `calamine`.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use tracing::debug;

use super::parser::{ParserConfig, disambiguate_headers};
use super::source::DataTable;
use crate::error::{ColmapError, Result};

/// Read the first sheet of a workbook into a [`DataTable`].
///
/// The first used row is the header row. Cells are rendered as text, so
/// `1.0` reads as `1` and empty cells as `""`.
pub(super) fn read_first_sheet(path: &Path, config: &ParserConfig) -> Result<DataTable> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet = workbook.sheet_names().first().cloned();
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None if config.allow_empty => return Ok(empty_table()),
        None => {
            return Err(ColmapError::EmptyData(format!(
                "'{}' has no sheets",
                path.display()
            )));
        }
    };

    let mut rows = range.rows().map(|row| row.iter().map(cell_text).collect::<Vec<_>>());

    let raw_headers = if config.has_header {
        rows.next().unwrap_or_default()
    } else {
        vec![String::new(); range.width()]
    };

    if raw_headers.is_empty() {
        if config.allow_empty {
            return Ok(empty_table());
        }
        return Err(ColmapError::EmptyData(format!(
            "first sheet of '{}' is empty",
            path.display()
        )));
    }

    let headers = disambiguate_headers(raw_headers);
    let width = headers.len();
    let limit = config.max_rows.unwrap_or(usize::MAX);

    let data: Vec<Vec<String>> = rows
        .take(limit)
        .map(|mut row| {
            row.resize(width, String::new());
            row
        })
        .collect();

    debug!(
        sheet = sheet.as_deref().unwrap_or(""),
        rows = data.len(),
        columns = width,
        "read workbook sheet"
    );

    Ok(DataTable::new(headers, data, b','))
}

fn empty_table() -> DataTable {
    DataTable::new(Vec::new(), Vec::new(), b',')
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}
