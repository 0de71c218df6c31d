//! Lexical similarity between column names.
//!
//! Scores are an edit-distance ratio on the normalized forms, scaled to
//! `0..=100`:
//!
//! ```text
//! score = round(100 * (1 - levenshtein(a, b) / max(len(a), len(b))))
//! ```
//!
//! Lengths are counted in characters so CJK headers are not penalised for
//! their UTF-8 width.

use serde::{Deserialize, Serialize};

use crate::error::{ColmapError, Result};
use crate::schema::ColumnName;

use super::normalize::normalize;

/// Default acceptance threshold for lexical matches.
pub const DEFAULT_THRESHOLD: u8 = 70;

/// Lowest threshold a user may configure.
pub const MIN_THRESHOLD: u8 = 50;

/// Highest threshold a user may configure.
pub const MAX_THRESHOLD: u8 = 100;

/// A candidate source column with its lexical score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalScore {
    /// Raw source column name.
    pub source: String,
    /// Score in `0..=100`.
    pub score: u8,
}

/// Similarity of two raw column names, in `0..=100`.
///
/// Both inputs are normalized first. Two empty names score 100, exactly one
/// empty name scores 0. The score is symmetric.
pub fn score(a: &str, b: &str) -> u8 {
    score_normalized(&normalize(a), &normalize(b))
}

/// Similarity of two already normalized names.
pub fn score_normalized(a: &str, b: &str) -> u8 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();

    match (len_a, len_b) {
        (0, 0) => 100,
        (0, _) | (_, 0) => 0,
        _ => {
            let distance = strsim::levenshtein(a, b);
            let longest = len_a.max(len_b);
            let ratio = 1.0 - distance as f64 / longest as f64;
            (ratio * 100.0).round().clamp(0.0, 100.0) as u8
        }
    }
}

/// Lexical scorer with a configurable acceptance threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexicalScorer {
    threshold: u8,
}

impl LexicalScorer {
    /// Create a scorer, rejecting thresholds outside `50..=100`.
    pub fn new(threshold: u8) -> Result<Self> {
        validate_threshold(threshold)?;
        Ok(Self { threshold })
    }

    /// The acceptance threshold.
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Whether a score is high enough to be accepted automatically.
    pub fn accepts(&self, score: u8) -> bool {
        score >= self.threshold
    }

    /// Score one target against one source.
    pub fn score(&self, target: &ColumnName, source: &ColumnName) -> u8 {
        score_normalized(target.normalized(), source.normalized())
    }

    /// Score a target against every source, best first.
    ///
    /// Sources with equal scores keep their input order, so ranking is
    /// reproducible.
    pub fn rank<'a>(
        &self,
        target: &ColumnName,
        sources: impl IntoIterator<Item = &'a ColumnName>,
    ) -> Vec<SignalScore> {
        let mut scores: Vec<SignalScore> = sources
            .into_iter()
            .map(|source| SignalScore {
                source: source.raw().to_string(),
                score: self.score(target, source),
            })
            .collect();

        scores.sort_by(|a, b| b.score.cmp(&a.score));
        scores
    }

    /// Best accepted source for a target, first in input order on ties.
    pub fn best_match<'a>(
        &self,
        target: &ColumnName,
        sources: impl IntoIterator<Item = &'a ColumnName>,
    ) -> Option<(&'a ColumnName, u8)> {
        let mut best: Option<(&'a ColumnName, u8)> = None;
        for source in sources {
            let score = self.score(target, source);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((source, score));
            }
        }
        best.filter(|(_, score)| self.accepts(*score))
    }
}

impl Default for LexicalScorer {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Check that a threshold lies in the configurable range.
pub fn validate_threshold(threshold: u8) -> Result<()> {
    if (MIN_THRESHOLD..=MAX_THRESHOLD).contains(&threshold) {
        Ok(())
    } else {
        Err(ColmapError::Config(format!(
            "Lexical threshold {} is outside {}-{}",
            threshold, MIN_THRESHOLD, MAX_THRESHOLD
        )))
    }
}
