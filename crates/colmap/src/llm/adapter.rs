//! Turns model answers into validated per-target suggestions.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::schema::{Columns, SourceSchema, TargetSchema};

use super::parse::{ParseMode, parse_response};
use super::provider::LlmProvider;

/// Outcome of the last suggestion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SuggestionStatus {
    /// The answer parsed as JSON.
    Complete,
    /// Pairs were salvaged from a malformed answer.
    Partial,
    /// The backend failed; matching fell back to lexical scoring.
    Unavailable { reason: String },
    /// No provider is configured.
    Disabled,
}

impl SuggestionStatus {
    /// Whether any suggestions may be present.
    pub fn is_usable(&self) -> bool {
        matches!(self, SuggestionStatus::Complete | SuggestionStatus::Partial)
    }
}

/// Why a suggested pair was thrown away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardReason {
    UnknownTarget,
    UnknownSource,
    DuplicateTarget,
}

/// A pair the model proposed that did not survive validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardedSuggestion {
    pub target: String,
    pub source: Option<String>,
    pub reason: DiscardReason,
}

/// Validated model suggestions for one target/source pairing.
///
/// Keys are raw target names; `None` values record an explicit "no match".
/// Targets the model skipped are absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiSuggestions {
    pub model: Option<String>,
    pub status: SuggestionStatus,
    suggestions: IndexMap<String, Option<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub discarded: Vec<DiscardedSuggestion>,
}

impl AiSuggestions {
    /// No provider configured.
    pub fn disabled() -> Self {
        Self {
            model: None,
            status: SuggestionStatus::Disabled,
            suggestions: IndexMap::new(),
            discarded: Vec::new(),
        }
    }

    /// The backend failed with `reason`.
    pub fn unavailable(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            status: SuggestionStatus::Unavailable {
                reason: reason.into(),
            },
            suggestions: IndexMap::new(),
            discarded: Vec::new(),
        }
    }

    /// Validate raw pairs against both schemas.
    ///
    /// Names resolve by exact raw match first, then by unique normalized
    /// match. Anything else is discarded.
    pub fn from_pairs<I>(
        model: impl Into<String>,
        status: SuggestionStatus,
        target: &TargetSchema,
        source: &SourceSchema,
        pairs: I,
    ) -> Self
    where
        I: IntoIterator<Item = (String, Option<String>)>,
    {
        let mut suggestions = IndexMap::new();
        let mut discarded = Vec::new();

        for (raw_target, raw_source) in pairs {
            let Some(target_col) = target.find(&raw_target) else {
                discarded.push(DiscardedSuggestion {
                    target: raw_target,
                    source: raw_source,
                    reason: DiscardReason::UnknownTarget,
                });
                continue;
            };

            if suggestions.contains_key(target_col.raw()) {
                discarded.push(DiscardedSuggestion {
                    target: raw_target,
                    source: raw_source,
                    reason: DiscardReason::DuplicateTarget,
                });
                continue;
            }

            let resolved = match raw_source {
                None => None,
                Some(name) => match source.find(&name) {
                    Some(col) => Some(col.raw().to_string()),
                    None => {
                        discarded.push(DiscardedSuggestion {
                            target: raw_target,
                            source: Some(name),
                            reason: DiscardReason::UnknownSource,
                        });
                        continue;
                    }
                },
            };

            suggestions.insert(target_col.raw().to_string(), resolved);
        }

        for d in &discarded {
            warn!(column = %d.target, source = ?d.source, reason = ?d.reason, "discarded AI suggestion");
        }

        Self {
            model: Some(model.into()),
            status,
            suggestions,
            discarded,
        }
    }

    /// Suggested source for `target`; `None` when there is no usable suggestion.
    pub fn source_for(&self, target: &str) -> Option<&str> {
        self.suggestions.get(target).and_then(|s| s.as_deref())
    }

    /// Whether the model answered for `target` (including an explicit "no match").
    pub fn has_opinion(&self, target: &str) -> bool {
        self.suggestions.contains_key(target)
    }

    /// Iterate `(target, source)` in the order the model answered.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.suggestions
            .iter()
            .map(|(t, s)| (t.as_str(), s.as_deref()))
    }

    /// Number of targets the model answered for.
    pub fn len(&self) -> usize {
        self.suggestions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }
}

impl Default for AiSuggestions {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Asks a provider for suggestions and validates the answer.
#[derive(Clone)]
pub struct SuggestionAdapter {
    provider: Arc<dyn LlmProvider>,
}

impl SuggestionAdapter {
    pub fn new(provider: impl LlmProvider + 'static) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    pub fn from_arc(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Model identifier configured on the provider.
    pub fn model(&self) -> &str {
        &self.provider.config().model
    }

    /// Request suggestions for every target column.
    ///
    /// Makes a single attempt. Empty schemas return an empty `Complete` result
    /// without contacting the backend.
    pub fn suggest(&self, target: &TargetSchema, source: &SourceSchema) -> Result<AiSuggestions> {
        let model = self.model().to_string();

        if target.is_empty() || source.is_empty() {
            debug!("empty schema, skipping AI request");
            return Ok(AiSuggestions::from_pairs(
                model,
                SuggestionStatus::Complete,
                target,
                source,
                Vec::new(),
            ));
        }

        info!(
            provider = self.provider.name(),
            model = %model,
            targets = target.len(),
            sources = source.len(),
            "requesting AI suggestions"
        );

        let text = self
            .provider
            .suggest_mappings(&target.names(), &source.names())?;
        let parsed = parse_response(&text)?;

        let status = match parsed.mode {
            ParseMode::Json => SuggestionStatus::Complete,
            ParseMode::Lines => {
                warn!("AI answer was not valid JSON, keeping the pairs that could be recovered");
                SuggestionStatus::Partial
            }
        };

        let suggestions = AiSuggestions::from_pairs(model, status, target, source, parsed.pairs);
        debug!(
            accepted = suggestions.len(),
            discarded = suggestions.discarded.len(),
            "AI suggestions validated"
        );
        Ok(suggestions)
    }

    /// Like [`suggest`](Self::suggest) but never fails: errors become
    /// [`SuggestionStatus::Unavailable`].
    pub fn suggest_or_degrade(&self, target: &TargetSchema, source: &SourceSchema) -> AiSuggestions {
        match self.suggest(target, source) {
            Ok(suggestions) => suggestions,
            Err(e) => {
                warn!(error = %e, "AI suggestions unavailable, continuing with lexical matching");
                AiSuggestions::unavailable(self.model(), e.to_string())
            }
        }
    }
}
