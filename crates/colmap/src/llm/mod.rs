//! AI suggestion boundary.
//!
//! A local model is asked which source column matches each target column.
//! The model is treated as an untrusted hint: answers are parsed leniently,
//! every name is checked against the schemas, and any failure degrades to
//! lexical-only matching. colmap works fully without a model.
//!
//! # Supported Providers
//!
//! - **Ollama** - Local models, no API key needed (requires Ollama installed)
//! - **Mock** - Deterministic offline answers for tests and demos
//!
//! # Example
//!
//! ```no_run
//! use colmap::{ColumnMapper, OllamaProvider};
//!
//! let mapper = ColumnMapper::new().with_llm(OllamaProvider::new().unwrap());
//! let session = mapper.map("template.csv", "upload.csv").unwrap();
//! ```

mod adapter;
mod mock;
mod ollama;
pub mod parse;
mod prompts;
mod provider;

pub use adapter::{
    AiSuggestions, DiscardReason, DiscardedSuggestion, SuggestionAdapter, SuggestionStatus,
};
pub use mock::{MockBehavior, MockProvider};
pub use ollama::OllamaProvider;
pub use parse::{ParseMode, ParsedResponse, parse_response};
pub use provider::{DEFAULT_MODEL, LlmConfig, LlmProvider, SUPPORTED_MODELS};
