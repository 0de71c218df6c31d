//! Greedy resolution of AI and lexical signals into a mapping table.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::entry::{MappingEntry, Origin};
use super::table::MappingTable;
use crate::error::Result;
use crate::llm::AiSuggestions;
use crate::matching::LexicalScorer;
use crate::schema::{Columns, SourceSchema, TargetSchema};

/// What happens to manual entries when resolution runs again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementPolicy {
    /// Keep manual entries whose columns still exist.
    #[default]
    PreserveManual,
    /// Recompute every entry.
    ReplaceAll,
}

/// Builds mapping tables from target and source schemas.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver {
    scorer: LexicalScorer,
}

impl Resolver {
    /// Create a resolver accepting lexical scores at or above `threshold`.
    pub fn new(threshold: u8) -> Result<Self> {
        Ok(Self {
            scorer: LexicalScorer::new(threshold)?,
        })
    }

    pub fn scorer(&self) -> &LexicalScorer {
        &self.scorer
    }

    /// Decide a source for every target column, in target order.
    ///
    /// An unclaimed AI suggestion wins. Otherwise the best unclaimed source
    /// by lexical score is taken if it reaches the threshold, first in source
    /// order on ties. Otherwise the target stays unmapped.
    pub fn resolve(
        &self,
        target: &TargetSchema,
        source: &SourceSchema,
        ai: &AiSuggestions,
    ) -> MappingTable {
        self.run(target, source, ai, HashMap::new())
    }

    /// Resolve again after new suggestions or a new threshold.
    pub fn rerun(
        &self,
        previous: &MappingTable,
        target: &TargetSchema,
        source: &SourceSchema,
        ai: &AiSuggestions,
        policy: ReplacementPolicy,
    ) -> MappingTable {
        let pinned: HashMap<String, MappingEntry> = match policy {
            ReplacementPolicy::ReplaceAll => HashMap::new(),
            ReplacementPolicy::PreserveManual => previous
                .iter()
                .filter(|e| e.origin == Origin::Manual)
                .filter(|e| target.contains(e.target.raw()))
                .filter(|e| e.source_name().is_none_or(|s| source.contains(s)))
                .map(|e| (e.target.raw().to_string(), e.clone()))
                .collect(),
        };

        debug!(pinned = pinned.len(), ?policy, "re-running resolution");
        self.run(target, source, ai, pinned)
    }

    fn run(
        &self,
        target: &TargetSchema,
        source: &SourceSchema,
        ai: &AiSuggestions,
        pinned: HashMap<String, MappingEntry>,
    ) -> MappingTable {
        let mut claimed: HashSet<String> = pinned
            .values()
            .filter_map(|e| e.source_name().map(str::to_string))
            .collect();
        let mut entries = Vec::with_capacity(target.len());

        for t in target.iter() {
            if let Some(entry) = pinned.get(t.raw()) {
                debug!(column = %t, source = ?entry.source_name(), "kept manual entry");
                entries.push(entry.clone());
                continue;
            }

            if let Some(suggested) = ai.source_for(t.raw()).and_then(|s| source.get(s)) {
                if claimed.insert(suggested.raw().to_string()) {
                    debug!(column = %t, source = %suggested, "accepted AI suggestion");
                    entries.push(MappingEntry::ai(t.clone(), suggested.clone()));
                    continue;
                }
                debug!(column = %t, source = %suggested, "AI suggestion already claimed");
            }

            let unclaimed = source.iter().filter(|c| !claimed.contains(c.raw()));
            match self.scorer.best_match(t, unclaimed) {
                Some((s, score)) => {
                    debug!(column = %t, source = %s, score, "accepted lexical match");
                    claimed.insert(s.raw().to_string());
                    entries.push(MappingEntry::lexical(t.clone(), s.clone(), score));
                }
                None => {
                    debug!(column = %t, "no match");
                    entries.push(MappingEntry::unmapped(t.clone()));
                }
            }
        }

        let table = MappingTable::from_entries(entries);
        let summary = table.summary();
        info!(
            targets = summary.total,
            ai = summary.ai,
            lexical = summary.lexical,
            manual = summary.manual,
            unmapped = summary.unmapped,
            threshold = self.scorer.threshold(),
            "resolved mapping"
        );
        table
    }
}

/// Resolve with a freshly validated threshold.
pub fn resolve(
    target: &TargetSchema,
    source: &SourceSchema,
    ai: &AiSuggestions,
    threshold: u8,
) -> Result<MappingTable> {
    Ok(Resolver::new(threshold)?.resolve(target, source, ai))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ColmapError;
    use crate::llm::SuggestionStatus;

    fn ai(target: &TargetSchema, source: &SourceSchema, pairs: &[(&str, &str)]) -> AiSuggestions {
        AiSuggestions::from_pairs(
            "llama3.2",
            SuggestionStatus::Complete,
            target,
            source,
            pairs
                .iter()
                .map(|(t, s)| (t.to_string(), Some(s.to_string()))),
        )
    }

    #[test]
    fn test_ai_first_then_lexical() {
        let target = TargetSchema::new(["Name", "Email", "Phone"]).unwrap();
        let source = SourceSchema::new(["name", "邮箱", "phone number"]).unwrap();
        let suggestions = ai(&target, &source, &[("Email", "邮箱")]);

        let table = resolve(&target, &source, &suggestions, 70).unwrap();
        let name = table.get("Name").unwrap();
        assert_eq!(name.origin, Origin::Lexical);
        assert_eq!(name.confidence, 100);
        assert_eq!(table.get("Email").unwrap().origin, Origin::Ai);
        // "phone" vs "phone number" scores 42
        assert_eq!(table.get("Phone").unwrap().origin, Origin::Unmapped);
        assert!(table.validate(&target, &source).is_ok());
    }

    #[test]
    fn test_claimed_ai_source_falls_back_to_lexical() {
        let target = TargetSchema::new(["Mobile", "Phone"]).unwrap();
        let source = SourceSchema::new(["phone", "phones"]).unwrap();
        let suggestions = ai(&target, &source, &[("Mobile", "phone"), ("Phone", "phone")]);

        let table = resolve(&target, &source, &suggestions, 70).unwrap();
        assert_eq!(table.source_for("Mobile").map(|c| c.raw()), Some("phone"));
        let phone = table.get("Phone").unwrap();
        assert_eq!(phone.origin, Origin::Lexical);
        assert_eq!(phone.source_name(), Some("phones"));
    }

    #[test]
    fn test_tie_goes_to_first_source() {
        let target = TargetSchema::new(["abcd"]).unwrap();
        let source = SourceSchema::new(["abcx", "abcy"]).unwrap();

        let table = resolve(&target, &source, &AiSuggestions::disabled(), 70).unwrap();
        assert_eq!(table.source_for("abcd").map(|c| c.raw()), Some("abcx"));
    }

    #[test]
    fn test_threshold_validated() {
        let target = TargetSchema::new(["a"]).unwrap();
        let source = SourceSchema::new(["a"]).unwrap();
        assert!(matches!(
            resolve(&target, &source, &AiSuggestions::disabled(), 49),
            Err(ColmapError::Config(_))
        ));
    }

    #[test]
    fn test_empty_schemas() {
        let target = TargetSchema::new(["Name"]).unwrap();
        let empty_source = SourceSchema::new(Vec::<String>::new()).unwrap();
        let table = resolve(&target, &empty_source, &AiSuggestions::disabled(), 70).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.summary().unmapped, 1);

        let empty_target = TargetSchema::new(Vec::<String>::new()).unwrap();
        let source = SourceSchema::new(["a"]).unwrap();
        let table = resolve(&empty_target, &source, &AiSuggestions::disabled(), 70).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_rerun_policies() {
        let target = TargetSchema::new(["Name", "Email"]).unwrap();
        let source = SourceSchema::new(["name", "email", "contact"]).unwrap();
        let resolver = Resolver::default();

        let mut table = resolver.resolve(&target, &source, &AiSuggestions::disabled());
        table
            .apply_override(
                &source,
                "Email",
                crate::mapping::OverrideAction::Assign("contact".to_string()),
            )
            .unwrap();

        let kept = resolver.rerun(
            &table,
            &target,
            &source,
            &AiSuggestions::disabled(),
            ReplacementPolicy::PreserveManual,
        );
        assert_eq!(kept.get("Email").unwrap().origin, Origin::Manual);
        assert_eq!(kept.source_for("Email").map(|c| c.raw()), Some("contact"));

        let replaced = resolver.rerun(
            &table,
            &target,
            &source,
            &AiSuggestions::disabled(),
            ReplacementPolicy::ReplaceAll,
        );
        assert_eq!(replaced.get("Email").unwrap().origin, Origin::Lexical);
        assert_eq!(replaced.source_for("Email").map(|c| c.raw()), Some("email"));
    }

    #[test]
    fn test_rerun_drops_manual_entry_for_vanished_source() {
        let target = TargetSchema::new(["Name"]).unwrap();
        let old_source = SourceSchema::new(["full name"]).unwrap();
        let mut table = resolve(&target, &old_source, &AiSuggestions::disabled(), 70).unwrap();
        table
            .apply_override(
                &old_source,
                "Name",
                crate::mapping::OverrideAction::Assign("full name".to_string()),
            )
            .unwrap();

        let new_source = SourceSchema::new(["name"]).unwrap();
        let rerun = Resolver::default().rerun(
            &table,
            &target,
            &new_source,
            &AiSuggestions::disabled(),
            ReplacementPolicy::PreserveManual,
        );
        assert_eq!(rerun.get("Name").unwrap().origin, Origin::Lexical);
    }
}
