//! Ollama local LLM provider implementation.
//!
//! Ollama runs models locally without API keys.
//! Install from: https://ollama.ai

use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::{ColmapError, Result};

use super::prompts;
use super::provider::{LlmConfig, LlmProvider};

/// Default Ollama host.
const DEFAULT_HOST: &str = "http://localhost:11434";

/// Ollama local LLM provider.
pub struct OllamaProvider {
    client: Client,
    api_url: String,
    config: LlmConfig,
}

impl OllamaProvider {
    /// Create a new Ollama provider with default settings.
    ///
    /// Uses llama3.2 by default. Make sure you've pulled it:
    /// `ollama pull llama3.2`
    pub fn new() -> Result<Self> {
        Self::with_config(LlmConfig::default())
    }

    /// Create with a specific model from the supported list.
    pub fn with_model(model: impl Into<String>) -> Result<Self> {
        Self::with_config(LlmConfig::default().with_model(model))
    }

    /// Create with custom configuration.
    ///
    /// The host is taken from `OLLAMA_HOST` when set.
    pub fn with_config(config: LlmConfig) -> Result<Self> {
        let host = std::env::var("OLLAMA_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        Self::with_host(config, &host)
    }

    /// Create against an explicit host, ignoring `OLLAMA_HOST`.
    pub fn with_host(config: LlmConfig, host: &str) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| ColmapError::Config(format!("Failed to create HTTP client: {}", e)))?;

        // OLLAMA_HOST is often given without a scheme
        let host = host.trim_end_matches('/');
        let api_url = if host.contains("://") {
            format!("{}/api/chat", host)
        } else {
            format!("http://{}/api/chat", host)
        };

        Ok(Self {
            client,
            api_url,
            config,
        })
    }

    /// Endpoint requests are sent to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Build headers for API requests.
    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    /// Send a message to Ollama.
    fn send_message(&self, user_prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.config.model,
            "stream": false,
            "options": {
                "temperature": self.config.temperature,
                "num_predict": self.config.max_tokens
            },
            "messages": [
                {
                    "role": "system",
                    "content": prompts::system_prompt()
                },
                {
                    "role": "user",
                    "content": user_prompt
                }
            ]
        });

        debug!(url = %self.api_url, model = %self.config.model, "sending mapping request");

        let response = self
            .client
            .post(&self.api_url)
            .headers(self.build_headers())
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    ColmapError::BackendUnreachable(
                        "Failed to connect to Ollama. Is it running? Start with: ollama serve"
                            .to_string(),
                    )
                } else if e.is_timeout() {
                    ColmapError::BackendUnreachable(format!(
                        "Ollama did not answer within {}s",
                        self.config.timeout.as_secs()
                    ))
                } else {
                    ColmapError::BackendUnreachable(format!("Ollama request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();

            if error_text.contains("not found") {
                return Err(ColmapError::BackendUnreachable(format!(
                    "Model '{}' not found. Pull it with: ollama pull {}",
                    self.config.model, self.config.model
                )));
            }

            return Err(ColmapError::BackendUnreachable(format!(
                "Ollama error ({}): {}",
                status, error_text
            )));
        }

        let api_response: OllamaResponse = response.json().map_err(|e| {
            ColmapError::MalformedResponse(format!("Failed to parse Ollama response: {}", e))
        })?;

        Ok(api_response.message.content)
    }
}

impl LlmProvider for OllamaProvider {
    fn suggest_mappings(&self, targets: &[&str], sources: &[&str]) -> Result<String> {
        let prompt = prompts::mapping_prompt(targets, sources);
        self.send_message(&prompt)
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Ollama API response structure.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_with_host_builds_chat_url() {
        let provider = OllamaProvider::with_host(LlmConfig::default(), "http://gpu-box:11434/")
            .unwrap();
        assert_eq!(provider.api_url(), "http://gpu-box:11434/api/chat");
        assert_eq!(provider.name(), "ollama");

        let bare = OllamaProvider::with_host(LlmConfig::default(), "0.0.0.0:11434").unwrap();
        assert_eq!(bare.api_url(), "http://0.0.0.0:11434/api/chat");
    }

    #[test]
    fn test_rejects_unsupported_model() {
        let config = LlmConfig::default().with_model("gpt-4o");
        assert!(OllamaProvider::with_host(config, DEFAULT_HOST).is_err());
    }

    #[test]
    fn test_connection_refused_is_unreachable() {
        // Port 9 (discard) is closed on test machines
        let config = LlmConfig::default().with_timeout(Duration::from_secs(2));
        let provider = OllamaProvider::with_host(config, "http://127.0.0.1:9").unwrap();

        let err = provider.suggest_mappings(&["Name"], &["name"]).unwrap_err();
        assert!(matches!(err, ColmapError::BackendUnreachable(_)));
    }
}
