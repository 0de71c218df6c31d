//! Mock LLM provider for testing.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Map, Value};

use crate::error::{ColmapError, Result};
use crate::matching::normalize;

use super::provider::{LlmConfig, LlmProvider};

/// How the mock answers.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Pair names that normalize identically, answered as fenced JSON.
    Echo,
    /// Return this text verbatim.
    Canned(String),
    /// Fail as if the backend were down.
    Unreachable,
}

/// Mock LLM provider that returns predictable responses for testing.
pub struct MockProvider {
    config: LlmConfig,
    behavior: MockBehavior,
    calls: AtomicUsize,
}

impl MockProvider {
    /// Create a new mock provider that echoes normalized matches.
    pub fn new() -> Self {
        Self::with_behavior(MockBehavior::Echo)
    }

    /// Create a mock that always returns `response`.
    pub fn canned(response: impl Into<String>) -> Self {
        Self::with_behavior(MockBehavior::Canned(response.into()))
    }

    /// Create a mock whose backend is down.
    pub fn unreachable() -> Self {
        Self::with_behavior(MockBehavior::Unreachable)
    }

    /// Create with a specific behavior.
    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            config: LlmConfig::default(),
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of requests received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn echo(targets: &[&str], sources: &[&str]) -> String {
        let mut used = vec![false; sources.len()];
        let mut answer = Map::new();

        for target in targets {
            let wanted = normalize(target);
            let hit = sources
                .iter()
                .enumerate()
                .find(|(i, source)| !used[*i] && normalize(source) == wanted);

            let value = match hit {
                Some((i, source)) => {
                    used[i] = true;
                    Value::String(source.to_string())
                }
                None => Value::Null,
            };
            answer.insert(target.to_string(), value);
        }

        format!(
            "Here is the mapping:\n```json\n{}\n```",
            Value::Object(answer)
        )
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmProvider for MockProvider {
    fn suggest_mappings(&self, targets: &[&str], sources: &[&str]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            MockBehavior::Echo => Ok(Self::echo(targets, sources)),
            MockBehavior::Canned(text) => Ok(text.clone()),
            MockBehavior::Unreachable => Err(ColmapError::BackendUnreachable(
                "mock backend is offline".to_string(),
            )),
        }
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "mock"
    }
}
