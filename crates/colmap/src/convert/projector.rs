//! Projection of source rows onto the target layout.

use indexmap::IndexMap;
use tracing::debug;

use crate::input::DataTable;
use crate::mapping::MappingTable;

/// Source data rewritten in target column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    /// Target column names, in schema order.
    pub headers: Vec<String>,
    /// One value per target column for every source row.
    pub rows: Vec<Vec<String>>,
}

impl ConversionResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Value of `target` in row `row`.
    pub fn get(&self, row: usize, target: &str) -> Option<&str> {
        let col = self.headers.iter().position(|h| h == target)?;
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Row `row` as an ordered target -> value map.
    pub fn row_map(&self, row: usize) -> Option<IndexMap<&str, &str>> {
        let values = self.rows.get(row)?;
        Some(
            self.headers
                .iter()
                .map(String::as_str)
                .zip(values.iter().map(String::as_str))
                .collect(),
        )
    }
}

/// Emit every source row in target order.
///
/// Unmapped targets and missing cells become empty strings, so each output
/// row has exactly one value per target column.
pub fn project(table: &MappingTable, data: &DataTable) -> ConversionResult {
    let headers: Vec<String> = table.iter().map(|e| e.target.raw().to_string()).collect();

    let indices: Vec<Option<usize>> = table
        .iter()
        .map(|e| e.source_name().and_then(|s| data.column_index(s)))
        .collect();

    let rows = data
        .rows
        .iter()
        .map(|row| {
            indices
                .iter()
                .map(|idx| {
                    idx.and_then(|i| row.get(i))
                        .cloned()
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect::<Vec<Vec<String>>>();

    debug!(
        rows = rows.len(),
        columns = headers.len(),
        "projected source rows"
    );

    ConversionResult { headers, rows }
}
