//! Manual overrides on a mapping table.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::entry::{MappingEntry, Origin};
use super::table::MappingTable;
use crate::error::{ColmapError, Result};
use crate::schema::{ColumnName, Columns, SourceSchema};

/// A user edit for one target column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideAction {
    /// Map the target to this source column (raw name).
    Assign(String),
    /// Leave the target without a source.
    Unassign,
}

/// What an override changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideOutcome {
    /// The edited target.
    pub target: ColumnName,
    /// The entry before the edit.
    pub previous: MappingEntry,
    /// Another target that lost its source to this edit.
    pub displaced: Option<ColumnName>,
}

impl MappingTable {
    /// Apply a manual edit.
    ///
    /// The source must exist in `source`, the target must be in the table.
    /// On error the table is left untouched. A source already held by another
    /// target is taken from it, and that target becomes unmapped.
    pub fn apply_override(
        &mut self,
        source: &SourceSchema,
        target: &str,
        action: OverrideAction,
    ) -> Result<OverrideOutcome> {
        let index = self
            .entries()
            .iter()
            .position(|e| e.target.raw() == target)
            .ok_or_else(|| ColmapError::UnknownTargetColumn(target.to_string()))?;

        let new_source = match &action {
            OverrideAction::Assign(name) => Some(
                source
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ColmapError::UnknownSourceColumn(name.clone()))?,
            ),
            OverrideAction::Unassign => None,
        };

        let displaced_index = new_source.as_ref().and_then(|s| {
            self.entries()
                .iter()
                .enumerate()
                .position(|(i, e)| i != index && e.source_name() == Some(s.raw()))
        });

        let entries = self.entries_mut();
        let previous = entries[index].clone();
        let target_name = previous.target.clone();

        let displaced = displaced_index.map(|i| {
            let loser = entries[i].target.clone();
            warn!(column = %loser, source = ?new_source.as_ref().map(|s| s.raw()), "source reassigned, target now unmapped");
            entries[i] = MappingEntry::unmapped(loser.clone());
            loser
        });

        entries[index] = match new_source {
            Some(s) => MappingEntry::manual(target_name.clone(), s),
            None => MappingEntry::manual_unassign(target_name.clone()),
        };

        info!(
            column = %target_name,
            source = ?entries[index].source_name(),
            was = %previous.origin,
            "applied override"
        );

        Ok(OverrideOutcome {
            target: target_name,
            previous,
            displaced,
        })
    }

    /// Whether any entry was set by hand.
    pub fn has_manual_entries(&self) -> bool {
        self.iter().any(|e| e.origin == Origin::Manual)
    }
}

/// Apply an override without touching `table`.
pub fn apply_override(
    table: &MappingTable,
    source: &SourceSchema,
    target: &str,
    action: OverrideAction,
) -> Result<(MappingTable, OverrideOutcome)> {
    let mut edited = table.clone();
    let outcome = edited.apply_override(source, target, action)?;
    Ok((edited, outcome))
}
