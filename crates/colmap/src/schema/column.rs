//! Column names as read from a header row.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::matching::normalize;

/// A column header: the raw text plus its cached normalized form.
///
/// Equality and hashing use the raw text, so `"Email"` and `"email "` are
/// different columns even though they normalize the same way.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ColumnName {
    raw: String,
    normalized: String,
}

impl ColumnName {
    /// Wrap a raw header, computing its normalized form.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = normalize(&raw);
        Self { raw, normalized }
    }

    /// The header exactly as it appeared in the file.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The comparison form.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

impl PartialEq for ColumnName {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for ColumnName {}

impl Hash for ColumnName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<String> for ColumnName {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for ColumnName {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<ColumnName> for String {
    fn from(name: ColumnName) -> Self {
        name.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_raw_for_display() {
        let name = ColumnName::new("Name (名称)");
        assert_eq!(name.raw(), "Name (名称)");
        assert_eq!(name.normalized(), "name");
        assert_eq!(name.to_string(), "Name (名称)");
    }

    #[test]
    fn test_equality_uses_raw() {
        assert_ne!(ColumnName::new("Email"), ColumnName::new("email"));
        assert_eq!(ColumnName::new("Email"), ColumnName::from("Email"));
    }

    #[test]
    fn test_serializes_as_raw_string() {
        let name = ColumnName::new("Website ");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"Website \"");

        let back: ColumnName = serde_json::from_str(&json).unwrap();
        assert_eq!(back.normalized(), "website");
    }
}
