//! colmap: map the columns of an uploaded spreadsheet onto a fixed template.
//!
//! Each target column of the template is matched to at most one source
//! column. An optional local language model proposes matches across
//! languages; lexical similarity fills the gaps; the user can override any
//! decision. The source rows are then rewritten in template order.
//!
//! # Core Principles
//!
//! - **Best-effort AI**: model answers are hints, validated against the real
//!   column names and ignored when the backend is down
//! - **Deterministic**: identical inputs always give the same mapping
//! - **One source per target**: no source column is ever used twice
//!
//! # Example
//!
//! ```no_run
//! use colmap::{ColumnMapper, OutputFormat};
//!
//! let mapper = ColumnMapper::new();
//! let session = mapper.map("template.csv", "upload.csv").unwrap();
//!
//! for entry in session.mapping().unwrap() {
//!     println!("{} <- {:?} ({})", entry.target, entry.source_name(), entry.origin);
//! }
//!
//! session.convert().unwrap().write("converted.csv", OutputFormat::Csv).unwrap();
//! ```

pub mod convert;
pub mod error;
pub mod input;
pub mod llm;
pub mod mapping;
pub mod matching;
pub mod schema;
pub mod session;

mod mapper;

pub use crate::mapper::{ColumnMapper, MapperConfig};
pub use convert::{ConversionResult, OutputFormat, project};
pub use error::{ColmapError, Result};
pub use input::{DataTable, Parser, ParserConfig, SourceMetadata};
pub use llm::{
    AiSuggestions, LlmConfig, LlmProvider, MockProvider, OllamaProvider, SuggestionAdapter,
    SuggestionStatus,
};
pub use mapping::{
    MappingEntry, MappingTable, OverrideAction, OverrideOutcome, Origin, ReplacementPolicy,
    Resolver, apply_override, resolve,
};
pub use matching::{LexicalScorer, normalize, score};
pub use schema::{ColumnName, Columns, SourceSchema, TargetSchema};
pub use session::{Session, SessionFile, SourceFile, TargetFile, session_path};
