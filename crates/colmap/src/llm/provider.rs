//! LLM provider trait and configuration.

use std::time::Duration;

use crate::error::{ColmapError, Result};

/// Models the tool is allowed to request from the backend.
pub const SUPPORTED_MODELS: &[&str] = &["llama3.2", "llama3.1", "llama2", "mistral", "codellama"];

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "llama3.2";

/// Configuration for LLM providers.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model to use (one of [`SUPPORTED_MODELS`]).
    pub model: String,

    /// Maximum tokens in response.
    pub max_tokens: usize,

    /// Temperature for generation (0.0-1.0).
    pub temperature: f64,

    /// Upper bound on a single request, connection included.
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1024,
            temperature: 0.1,
            // Local models can be slow on first load
            timeout: Duration::from_secs(120),
        }
    }
}

impl LlmConfig {
    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check the model against the allow-list and the numeric settings.
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_MODELS.contains(&self.model.as_str()) {
            return Err(ColmapError::Config(format!(
                "Unsupported model '{}'. Use one of: {}",
                self.model,
                SUPPORTED_MODELS.join(", ")
            )));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ColmapError::Config(format!(
                "Temperature {} is outside 0.0-1.0",
                self.temperature
            )));
        }
        if self.timeout.is_zero() {
            return Err(ColmapError::Config("Timeout must be positive".to_string()));
        }
        Ok(())
    }
}

/// Trait for LLM providers.
///
/// Implementations must be thread-safe (Send + Sync) so one provider can be
/// shared by several sessions.
pub trait LlmProvider: Send + Sync {
    /// Ask the model which source column best matches each target column.
    ///
    /// Returns the model's raw text. Parsing is left to the caller because
    /// models often wrap, truncate, or reformat the requested JSON.
    ///
    /// # Errors
    /// [`ColmapError::BackendUnreachable`] when the backend cannot be reached,
    /// times out, or rejects the request.
    fn suggest_mappings(&self, targets: &[&str], sources: &[&str]) -> Result<String>;

    /// Get the configuration for this provider.
    fn config(&self) -> &LlmConfig;

    /// Get the name of this provider (for logging/debugging).
    fn name(&self) -> &str;
}
