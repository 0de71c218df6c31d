//! Fuzzy-match analysis: the best lexical candidates for each target.

use serde::Serialize;

use super::state::Session;
use crate::error::Result;
use crate::mapping::Origin;
use crate::schema::Columns;

/// One scored source column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub source: String,
    pub score: u8,
    /// Score reaches the session threshold.
    pub accepted: bool,
    /// Target currently holding this source, if any.
    pub claimed_by: Option<String>,
}

/// Candidates for one target column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateReport {
    pub target: String,
    pub current: Option<String>,
    pub origin: Option<Origin>,
    pub ai_suggestion: Option<String>,
    pub candidates: Vec<Candidate>,
}

impl Session {
    /// Top `limit` sources by lexical score for every target, claimed or not.
    ///
    /// Works before resolution; `current` and `origin` are then empty.
    pub fn candidates(&self, limit: usize) -> Result<Vec<CandidateReport>> {
        let (target, source) = self.schemas()?;
        let scorer = self.resolver().scorer();
        let mapping = self.mapping();

        let reports = target
            .iter()
            .map(|t| {
                let entry = mapping.and_then(|m| m.get(t.raw()));
                let candidates = scorer
                    .rank(t, source.iter())
                    .into_iter()
                    .take(limit)
                    .map(|signal| Candidate {
                        claimed_by: mapping
                            .and_then(|m| m.claimant_of(&signal.source))
                            .map(|c| c.raw().to_string()),
                        accepted: scorer.accepts(signal.score),
                        score: signal.score,
                        source: signal.source,
                    })
                    .collect();

                CandidateReport {
                    target: t.raw().to_string(),
                    current: entry.and_then(|e| e.source_name()).map(str::to_string),
                    origin: entry.map(|e| e.origin),
                    ai_suggestion: self.suggestions().source_for(t.raw()).map(str::to_string),
                    candidates,
                }
            })
            .collect();

        Ok(reports)
    }
}
