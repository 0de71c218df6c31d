//! Target and source schemas.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::column::ColumnName;
use crate::error::{ColmapError, Result};
use crate::input::DataTable;

/// Read access shared by target and source schemas.
pub trait Columns {
    /// Columns in schema order.
    fn columns(&self) -> &[ColumnName];

    /// Number of columns.
    fn len(&self) -> usize {
        self.columns().len()
    }

    /// Whether the schema has no columns.
    fn is_empty(&self) -> bool {
        self.columns().is_empty()
    }

    /// Iterate columns in schema order.
    fn iter(&self) -> std::slice::Iter<'_, ColumnName> {
        self.columns().iter()
    }

    /// Look up a column by exact raw name.
    fn get(&self, raw: &str) -> Option<&ColumnName> {
        self.columns().iter().find(|c| c.raw() == raw)
    }

    /// Whether a column with this exact raw name exists.
    fn contains(&self, raw: &str) -> bool {
        self.get(raw).is_some()
    }

    /// Position of a column by exact raw name.
    fn position(&self, raw: &str) -> Option<usize> {
        self.columns().iter().position(|c| c.raw() == raw)
    }

    /// Resolve a loosely written name: exact raw match first, then a unique
    /// match on the normalized form.
    fn find(&self, name: &str) -> Option<&ColumnName> {
        if let Some(exact) = self.get(name) {
            return Some(exact);
        }

        let wanted = crate::matching::normalize(name);
        let mut matches = self.columns().iter().filter(|c| c.normalized() == wanted);
        match (matches.next(), matches.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    /// All raw names in schema order.
    fn names(&self) -> Vec<&str> {
        self.columns().iter().map(|c| c.raw()).collect()
    }
}

/// Ordered output layout. Names are distinct even after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct TargetSchema {
    columns: Vec<ColumnName>,
}

impl TargetSchema {
    /// Build a target schema.
    ///
    /// Fails with [`ColmapError::DuplicateColumn`] when two names collide after
    /// normalization, since the template would then be ambiguous.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<ColumnName> = names.into_iter().map(ColumnName::new).collect();

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.normalized()) {
                return Err(ColmapError::DuplicateColumn {
                    schema: "target".to_string(),
                    column: column.raw().to_string(),
                });
            }
        }

        Ok(Self { columns })
    }

    /// Build from the header row of a template file.
    pub fn from_table(table: &DataTable) -> Result<Self> {
        Self::new(table.headers.iter().cloned())
    }
}

impl Columns for TargetSchema {
    fn columns(&self) -> &[ColumnName] {
        &self.columns
    }
}

impl TryFrom<Vec<String>> for TargetSchema {
    type Error = ColmapError;

    fn try_from(names: Vec<String>) -> Result<Self> {
        Self::new(names)
    }
}

impl From<TargetSchema> for Vec<String> {
    fn from(schema: TargetSchema) -> Self {
        schema.columns.into_iter().map(String::from).collect()
    }
}

/// Columns of the uploaded file. Names are distinct by raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct SourceSchema {
    columns: Vec<ColumnName>,
}

impl SourceSchema {
    /// Build a source schema, rejecting exact duplicate names.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<ColumnName> = names.into_iter().map(ColumnName::new).collect();

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.raw()) {
                return Err(ColmapError::DuplicateColumn {
                    schema: "source".to_string(),
                    column: column.raw().to_string(),
                });
            }
        }

        Ok(Self { columns })
    }

    /// Build from the header row of a source file.
    pub fn from_table(table: &DataTable) -> Result<Self> {
        Self::new(table.headers.iter().cloned())
    }
}

impl Columns for SourceSchema {
    fn columns(&self) -> &[ColumnName] {
        &self.columns
    }
}

impl TryFrom<Vec<String>> for SourceSchema {
    type Error = ColmapError;

    fn try_from(names: Vec<String>) -> Result<Self> {
        Self::new(names)
    }
}

impl From<SourceSchema> for Vec<String> {
    fn from(schema: SourceSchema) -> Self {
        schema.columns.into_iter().map(String::from).collect()
    }
}
