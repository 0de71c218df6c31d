//! The mapping table and its invariants.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::entry::{MappingEntry, Origin};
use crate::error::{ColmapError, Result};
use crate::schema::{ColumnName, Columns, SourceSchema, TargetSchema};

/// One entry per target column, in target order. No source is used twice.
///
/// Entries can only be created by the resolver and changed through
/// overrides, so the invariants hold for any table obtained from this crate.
/// Tables read from disk must be checked with [`MappingTable::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingTable {
    entries: Vec<MappingEntry>,
}

/// Counts by origin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingSummary {
    pub total: usize,
    pub ai: usize,
    pub lexical: usize,
    pub manual: usize,
    pub unmapped: usize,
    /// Targets without a source, whatever their origin.
    pub empty: usize,
}

impl MappingTable {
    pub(crate) fn from_entries(entries: Vec<MappingEntry>) -> Self {
        Self { entries }
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [MappingEntry] {
        &mut self.entries
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MappingEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for a target by exact raw name.
    pub fn get(&self, target: &str) -> Option<&MappingEntry> {
        self.entries.iter().find(|e| e.target.raw() == target)
    }

    /// Mapped source for a target.
    pub fn source_for(&self, target: &str) -> Option<&ColumnName> {
        self.get(target).and_then(|e| e.source.as_ref())
    }

    /// Target currently holding `source`.
    pub fn claimant_of(&self, source: &str) -> Option<&ColumnName> {
        self.entries
            .iter()
            .find(|e| e.source_name() == Some(source))
            .map(|e| &e.target)
    }

    /// Source columns no entry uses, in source order.
    pub fn unclaimed_sources<'a>(&self, source: &'a SourceSchema) -> Vec<&'a ColumnName> {
        let claimed: HashSet<&str> = self.entries.iter().filter_map(|e| e.source_name()).collect();
        source
            .iter()
            .filter(|c| !claimed.contains(c.raw()))
            .collect()
    }

    /// Check every invariant against the schemas the table claims to describe.
    pub fn validate(&self, target: &TargetSchema, source: &SourceSchema) -> Result<()> {
        if self.entries.len() != target.len() {
            return Err(ColmapError::InconsistentMapping(format!(
                "{} entries for {} target columns",
                self.entries.len(),
                target.len()
            )));
        }

        let mut claimed = HashSet::new();
        for (entry, expected) in self.entries.iter().zip(target.iter()) {
            if entry.target.raw() != expected.raw() {
                return Err(ColmapError::InconsistentMapping(format!(
                    "expected target '{}', found '{}'",
                    expected, entry.target
                )));
            }

            if entry.confidence > 100 {
                return Err(ColmapError::InconsistentMapping(format!(
                    "confidence {} for '{}' is above 100",
                    entry.confidence, entry.target
                )));
            }

            match (&entry.source, entry.origin) {
                (Some(s), Origin::Unmapped) => {
                    return Err(ColmapError::InconsistentMapping(format!(
                        "'{}' is unmapped but names source '{}'",
                        entry.target, s
                    )));
                }
                (None, Origin::Ai | Origin::Lexical) => {
                    return Err(ColmapError::InconsistentMapping(format!(
                        "'{}' is {} without a source",
                        entry.target, entry.origin
                    )));
                }
                _ => {}
            }

            if let Some(s) = &entry.source {
                if !source.contains(s.raw()) {
                    return Err(ColmapError::InconsistentMapping(format!(
                        "'{}' maps to unknown source '{}'",
                        entry.target, s
                    )));
                }
                if !claimed.insert(s.raw()) {
                    return Err(ColmapError::InconsistentMapping(format!(
                        "source '{}' is mapped more than once",
                        s
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn summary(&self) -> MappingSummary {
        let mut summary = MappingSummary {
            total: self.entries.len(),
            ..Default::default()
        };
        for entry in &self.entries {
            match entry.origin {
                Origin::Ai => summary.ai += 1,
                Origin::Lexical => summary.lexical += 1,
                Origin::Manual => summary.manual += 1,
                Origin::Unmapped => summary.unmapped += 1,
            }
            if entry.source.is_none() {
                summary.empty += 1;
            }
        }
        summary
    }
}

impl<'a> IntoIterator for &'a MappingTable {
    type Item = &'a MappingEntry;
    type IntoIter = std::slice::Iter<'a, MappingEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
