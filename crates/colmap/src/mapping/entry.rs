//! One row of the mapping table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::ColumnName;

/// Confidence assigned to accepted AI suggestions.
pub const AI_CONFIDENCE: u8 = 90;

/// Confidence assigned to manual assignments.
pub const MANUAL_CONFIDENCE: u8 = 100;

/// How an entry was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Ai,
    Lexical,
    Manual,
    Unmapped,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Origin::Ai => "ai",
            Origin::Lexical => "lexical",
            Origin::Manual => "manual",
            Origin::Unmapped => "unmapped",
        };
        f.write_str(s)
    }
}

/// The decision for a single target column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub target: ColumnName,
    pub source: Option<ColumnName>,
    pub confidence: u8,
    pub origin: Origin,
}

impl MappingEntry {
    pub fn ai(target: ColumnName, source: ColumnName) -> Self {
        Self {
            target,
            source: Some(source),
            confidence: AI_CONFIDENCE,
            origin: Origin::Ai,
        }
    }

    pub fn lexical(target: ColumnName, source: ColumnName, score: u8) -> Self {
        Self {
            target,
            source: Some(source),
            confidence: score.min(100),
            origin: Origin::Lexical,
        }
    }

    pub fn manual(target: ColumnName, source: ColumnName) -> Self {
        Self {
            target,
            source: Some(source),
            confidence: MANUAL_CONFIDENCE,
            origin: Origin::Manual,
        }
    }

    /// A target the user explicitly left empty.
    pub fn manual_unassign(target: ColumnName) -> Self {
        Self {
            target,
            source: None,
            confidence: 0,
            origin: Origin::Manual,
        }
    }

    pub fn unmapped(target: ColumnName) -> Self {
        Self {
            target,
            source: None,
            confidence: 0,
            origin: Origin::Unmapped,
        }
    }

    /// Raw name of the mapped source, if any.
    pub fn source_name(&self) -> Option<&str> {
        self.source.as_ref().map(|s| s.raw())
    }

    pub fn is_mapped(&self) -> bool {
        self.source.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let ai = MappingEntry::ai("Email".into(), "邮箱".into());
        assert_eq!(ai.confidence, 90);
        assert_eq!(ai.source_name(), Some("邮箱"));

        let unassigned = MappingEntry::manual_unassign("Fax".into());
        assert_eq!(unassigned.origin, Origin::Manual);
        assert!(!unassigned.is_mapped());
    }

    #[test]
    fn test_origin_serializes_lowercase() {
        let json = serde_json::to_string(&Origin::Lexical).unwrap();
        assert_eq!(json, "\"lexical\"");
        assert_eq!(Origin::Unmapped.to_string(), "unmapped");
    }
}
